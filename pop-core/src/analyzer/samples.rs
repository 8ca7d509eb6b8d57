//! Sample Buffer
use std::collections;
use std::sync;

pub type Sample = f32;

type _SampleBuf = sync::Arc<parking_lot::Mutex<collections::VecDeque<Sample>>>;

/// Fixed size ring of mono samples shared between a recorder and the analyzers
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    buf: _SampleBuf,
    rate: usize,
}

impl SampleBuffer {
    pub fn new(size: usize, rate: usize) -> SampleBuffer {
        let buf = collections::VecDeque::from(vec![0.0; size]);

        SampleBuffer {
            buf: sync::Arc::new(parking_lot::Mutex::new(buf)),
            rate,
        }
    }

    /// Return the sample rate of the recorded data
    #[inline]
    pub fn rate(&self) -> usize {
        self.rate
    }

    /// Return the number of samples this buffer holds
    pub fn len(&self) -> usize {
        self.buf.lock().len()
    }

    /// Push new samples, dropping the oldest ones
    pub fn push(&self, new: &[Sample]) {
        let mut lock = self.buf.lock();

        #[cfg(debug_assertions)]
        let debug_size = lock.len();

        for sample in new.iter() {
            lock.pop_front();
            lock.push_back(*sample);
        }

        #[cfg(debug_assertions)]
        assert_eq!(debug_size, lock.len(), "Sample buffer size differs!");
    }

    /// Push interleaved multi-channel frames, averaging each frame down to mono
    pub fn push_interleaved(&self, data: &[Sample], channels: usize) {
        if channels <= 1 {
            self.push(data);
            return;
        }

        let mut lock = self.buf.lock();
        for frame in data.chunks_exact(channels) {
            lock.pop_front();
            lock.push_back(frame.iter().sum::<Sample>() / channels as Sample);
        }
    }

    /// Iterate over the most recent `size * downsample` samples, taking every
    /// `downsample`th one
    ///
    /// Iterates over fewer samples if the buffer is too small.
    pub fn iter<'a>(&'a self, size: usize, downsample: usize) -> SampleIterator<'a> {
        let lock = self.buf.lock();

        SampleIterator {
            index: lock.len().saturating_sub(size * downsample),
            buf: lock,
            downsample,
        }
    }

    /// Copy the most recent samples into `out`
    ///
    /// Returns the number of samples copied.
    pub fn copy_latest(&self, out: &mut [Sample]) -> usize {
        let lock = self.buf.lock();
        let start = lock.len().saturating_sub(out.len());

        let mut num = 0;
        for (o, s) in out.iter_mut().zip(lock.iter().skip(start)) {
            *o = *s;
            num += 1;
        }

        num
    }
}

pub struct SampleIterator<'a> {
    buf: parking_lot::MutexGuard<'a, collections::VecDeque<Sample>>,
    index: usize,
    downsample: usize,
}

impl Iterator for SampleIterator<'_> {
    type Item = Sample;

    fn next(&mut self) -> Option<Self::Item> {
        let res = self.buf.get(self.index).cloned();
        self.index += self.downsample;
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple() {
        let buf = SampleBuffer::new(16, 8000);

        buf.push(&[1.0; 8]);

        assert_eq!(buf.len(), 16);
        assert_eq!(buf.iter(16, 1).filter(|s| *s == 1.0).count(), 8);
    }

    #[test]
    fn test_overflow() {
        let buf = SampleBuffer::new(16, 8000);

        buf.push(&(100..120).map(|i| i as Sample).collect::<Vec<_>>());
        buf.push(&(0..32).map(|i| i as Sample).collect::<Vec<_>>());

        assert_eq!(
            buf.iter(16, 1).collect::<Vec<_>>(),
            (16..32).map(|i| i as Sample).collect::<Vec<_>>(),
        );
    }

    #[test]
    fn test_downsample() {
        let buf = SampleBuffer::new(32, 8000);

        buf.push(&(0..32).map(|i| i as Sample).collect::<Vec<_>>());

        assert_eq!(
            &buf.iter(7, 4).collect::<Vec<_>>(),
            &[4.0, 8.0, 12.0, 16.0, 20.0, 24.0, 28.0]
        );
    }

    #[test]
    fn test_interleaved() {
        let buf = SampleBuffer::new(4, 8000);

        buf.push_interleaved(&[1.0, 0.0, 0.5, 0.5, -1.0, -0.5], 2);

        assert_eq!(buf.iter(4, 1).collect::<Vec<_>>(), &[0.0, 0.5, 0.5, -0.75]);
    }

    #[test]
    fn test_copy_latest() {
        let buf = SampleBuffer::new(8, 8000);
        buf.push(&(0..8).map(|i| i as Sample).collect::<Vec<_>>());

        let mut out = [0.0; 3];
        assert_eq!(buf.copy_latest(&mut out), 3);
        assert_eq!(out, [5.0, 6.0, 7.0]);

        let mut big = [0.0; 12];
        assert_eq!(buf.copy_latest(&mut big), 8);
    }
}
