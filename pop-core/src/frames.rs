use crate::{analyzer, recorder};
use std::{cell, rc, time};

/// A single frame of the presentation loop
pub struct Frame<R: Send> {
    /// Seconds since the loop started
    pub time: f32,
    pub frame: usize,
    info: rc::Rc<cell::RefCell<triple_buffer::Output<R>>>,
}

impl<R: Send> Frame<R> {
    /// Access the most recently published analyzer info
    pub fn lock_info<F, O>(&self, f: F) -> O
    where
        F: FnOnce(&R) -> O,
    {
        f(self.info.borrow_mut().read())
    }
}

pub struct Frames<R, A>
where
    R: Clone + Send + 'static,
    for<'r> A: FnMut(&'r mut R, &analyzer::SampleBuffer) -> &'r mut R + Send + 'static,
{
    info: rc::Rc<cell::RefCell<triple_buffer::Output<R>>>,
    /// Analyzer closure, publishing side and the state the closure keeps updating
    analyzer: Option<(A, triple_buffer::Input<R>, R)>,
    recorder: Box<dyn recorder::Recorder>,
}

impl<R, A> Frames<R, A>
where
    R: Clone + Send + 'static,
    for<'r> A: FnMut(&'r mut R, &analyzer::SampleBuffer) -> &'r mut R + Send + 'static,
{
    pub fn from_vis(vis: crate::Visualizer<R, A>) -> Frames<R, A> {
        let (inp, outp) = triple_buffer::TripleBuffer::new(vis.initial.clone()).split();
        let mut f = Frames {
            info: rc::Rc::new(cell::RefCell::new(outp)),
            analyzer: Some((vis.analyzer, inp, vis.initial)),
            recorder: vis.recorder.unwrap_or_else(recorder::default),
        };

        if let Some(num) = vis.async_analyzer {
            if num != 0 {
                f.detach_analyzer(num);
            }
        }

        f
    }

    /// Move the analyzer onto its own thread, running `num` times per second
    ///
    /// Does nothing if the analyzer was already detached.
    pub fn detach_analyzer(&mut self, num: usize) {
        let (mut analyzer, mut info, mut state) = match self.analyzer.take() {
            Some(a) => a,
            None => return,
        };
        let buffer = self.recorder.sample_buffer().clone();

        let conv_time = time::Duration::new(0, (1_000_000_000 / num.max(1)) as u32);

        std::thread::Builder::new()
            .name("analyzer".into())
            .spawn(move || {
                let mut start = time::Instant::now();
                loop {
                    analyzer(&mut state, &buffer);
                    info.write(state.clone());

                    let now = time::Instant::now();
                    let duration = now - start;
                    log::trace!("Conversion Time: {:?}", duration);
                    start = now;

                    if duration < conv_time {
                        std::thread::sleep(conv_time - duration);
                    }
                }
            })
            .expect("Failed to spawn analyzer thread");
    }

    pub fn iter<'a>(&'a mut self) -> FramesIter<'a, R, A> {
        FramesIter {
            buffer: self.recorder.sample_buffer().clone(),
            visualizer: self,
            start_time: time::Instant::now(),
            frame: 0,
        }
    }
}

pub struct FramesIter<'a, R, A>
where
    R: Clone + Send + 'static,
    for<'r> A: FnMut(&'r mut R, &analyzer::SampleBuffer) -> &'r mut R + Send + 'static,
{
    visualizer: &'a mut Frames<R, A>,
    buffer: analyzer::SampleBuffer,
    start_time: time::Instant,
    frame: usize,
}

impl<'a, R, A> Iterator for FramesIter<'a, R, A>
where
    R: Clone + Send + 'static,
    for<'r> A: FnMut(&'r mut R, &analyzer::SampleBuffer) -> &'r mut R + Send + 'static,
{
    type Item = Frame<R>;

    fn next(&mut self) -> Option<Self::Item> {
        let time = crate::helpers::time(self.start_time);
        if !self.visualizer.recorder.sync(time) {
            return None;
        }

        if let Some((ref mut analyzer, ref mut info, ref mut state)) = self.visualizer.analyzer {
            analyzer(state, &self.buffer);
            info.write(state.clone());
        }

        let frame = self.frame;
        self.frame += 1;

        Some(Frame {
            time,
            frame,
            info: self.visualizer.info.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Info {
        runs: usize,
        level: f32,
    }

    fn silent() -> Box<dyn recorder::Recorder> {
        Box::new(recorder::SilentRecorder::new(64, 8000))
    }

    #[test]
    fn test_sync_frames() {
        let mut frames = crate::Visualizer::new(
            Info {
                runs: 0,
                level: 1.0,
            },
            |info, samples| {
                info.runs += 1;
                info.level = samples.iter(64, 1).map(f32::abs).sum();
                info
            },
        )
        .recorder(silent())
        .frames();

        for frame in frames.iter().take(3) {
            frame.lock_info(|info| {
                assert_eq!(info.runs, frame.frame + 1);
                assert_eq!(info.level, 0.0);
            });
        }
    }

    #[test]
    fn test_state_carries_over() {
        let mut first = true;
        let mut frames = crate::Visualizer::new(0u32, move |info, _| {
            if first {
                *info += 1;
                first = false;
            }
            info
        })
        .recorder(silent())
        .frames();

        let seen = frames
            .iter()
            .take(7)
            .map(|f| f.lock_info(|info| *info))
            .collect::<Vec<_>>();
        assert_eq!(seen, &[1; 7]);
    }

    #[test]
    fn test_frame_numbers() {
        let mut frames = crate::Visualizer::new(0usize, |info, _| info)
            .recorder(silent())
            .frames();

        let numbers = frames.iter().take(4).map(|f| f.frame).collect::<Vec<_>>();
        assert_eq!(numbers, &[0, 1, 2, 3]);
    }

    #[test]
    fn test_async_analyzer() {
        let mut frames = crate::Visualizer::new(false, |info, _| {
            *info = true;
            info
        })
        .recorder(silent())
        .async_analyzer(200)
        .frames();

        std::thread::sleep(std::time::Duration::from_millis(50));

        let frame = frames.iter().next().unwrap();
        assert!(frame.lock_info(|info| *info));
    }
}
