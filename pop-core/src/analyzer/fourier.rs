//! Fourier Analysis
//!
//! Produces [`Snapshot`](../struct.Snapshot.html)s the same way a browser's analyser node
//! does: window the most recent block of samples, transform, smooth the magnitudes over time
//! and convert them to decibels.
use super::Sample;
use crate::analyzer;

/// Window functions
///
/// A window-function in this case takes a size and should return a `Vec` of that length filled
/// with the precomputed window coefficients.
pub mod window {
    /// Blackman Window
    pub fn blackman(size: usize) -> Vec<f32> {
        apodize::blackman_iter(size).map(|f| f as f32).collect()
    }

    /// Hanning Window
    pub fn hanning(size: usize) -> Vec<f32> {
        apodize::hanning_iter(size).map(|f| f as f32).collect()
    }

    /// No window function / Rectangle window
    pub fn none(size: usize) -> Vec<f32> {
        vec![1.0; size]
    }

    /// Nuttall Window
    pub fn nuttall(size: usize) -> Vec<f32> {
        apodize::nuttall_iter(size).map(|f| f as f32).collect()
    }

    /// Get the window function for the specified name
    pub fn from_str(name: &str) -> Option<fn(usize) -> Vec<f32>> {
        match name {
            "blackman" => Some(blackman),
            "hanning" => Some(hanning),
            "none" => Some(none),
            "nuttall" => Some(nuttall),
            _ => None,
        }
    }
}

/// Builder for FourierAnalyzer
#[derive(Debug, Default)]
pub struct FourierBuilder {
    /// Length of the fourier transform
    ///
    /// Must be a power of two between 32 and 32768.  Higher values are slower but more
    /// detailed and catch shorter peaks in the waveform.
    ///
    /// Can also be set from config as `"audio.fourier.size"`.
    pub fft_size: Option<usize>,

    /// Smoothing time constant between 0.0 and 1.0
    ///
    /// 0 means no averaging, which is fast but jittery.  1 means maximum averaging, which is
    /// smooth but slow to respond.
    ///
    /// Can also be set from config as `"audio.fourier.smoothing"`.
    pub smoothing: Option<f32>,

    /// Lower end of the decibel range used for display scaling
    ///
    /// Can also be set from config as `"audio.fourier.min_decibels"`.
    pub min_decibels: Option<f32>,

    /// Upper end of the decibel range used for display scaling
    ///
    /// Can also be set from config as `"audio.fourier.max_decibels"`.
    pub max_decibels: Option<f32>,

    /// Window Function
    ///
    /// A few window functions are defined in the [`window`](window/index.html) module.
    ///
    /// Can also be set from config as `"audio.fourier.window"`.
    pub window: Option<fn(usize) -> Vec<f32>>,

    /// Rate of the captured data
    ///
    /// `FourierAnalyzer` will panic if the `SampleBuffer`'s rate does not match.
    ///
    /// Can also be set from config as `"audio.rate"`.
    pub rate: Option<usize>,
}

impl FourierBuilder {
    /// Create a new FourierBuilder
    pub fn new() -> FourierBuilder {
        Default::default()
    }

    /// Set the length of the transform buffer
    pub fn fft_size(&mut self, size: usize) -> &mut FourierBuilder {
        self.fft_size = Some(size);
        self
    }

    /// Set the smoothing time constant
    pub fn smoothing(&mut self, smoothing: f32) -> &mut FourierBuilder {
        self.smoothing = Some(smoothing);
        self
    }

    /// Set the decibel range
    pub fn decibels(&mut self, min: f32, max: f32) -> &mut FourierBuilder {
        self.min_decibels = Some(min);
        self.max_decibels = Some(max);
        self
    }

    /// Set the window function
    pub fn window(&mut self, f: fn(usize) -> Vec<f32>) -> &mut FourierBuilder {
        self.window = Some(f);
        self
    }

    /// Set the recording rate of the `SampleBuffer`
    pub fn rate(&mut self, rate: usize) -> &mut FourierBuilder {
        self.rate = Some(rate);
        self
    }

    /// Plan the fourier transform and prepare buffers
    pub fn plan(&mut self) -> FourierAnalyzer {
        let fft_size = self
            .fft_size
            .unwrap_or_else(|| crate::CONFIG.get_or("audio.fourier.size", 1024));
        let smoothing = self
            .smoothing
            .unwrap_or_else(|| crate::CONFIG.get_or("audio.fourier.smoothing", 0.8));
        let min_decibels = self
            .min_decibels
            .unwrap_or_else(|| crate::CONFIG.get_or("audio.fourier.min_decibels", -100.0));
        let max_decibels = self
            .max_decibels
            .unwrap_or_else(|| crate::CONFIG.get_or("audio.fourier.max_decibels", -30.0));
        let window = (self.window.unwrap_or_else(|| {
            window::from_str(&crate::CONFIG.get_or("audio.fourier.window", "blackman".to_string()))
                .expect("Selected window type not found!")
        }))(fft_size);
        let rate = self
            .rate
            .unwrap_or_else(|| crate::CONFIG.get_or("audio.rate", 44100));

        assert!(
            fft_size.is_power_of_two() && fft_size >= 32 && fft_size <= 32768,
            "FFT size must be a power of two between 32 and 32768!"
        );
        assert!(
            smoothing >= 0.0 && smoothing <= 1.0,
            "Smoothing must be between 0 and 1!"
        );
        assert!(min_decibels < max_decibels, "Decibel range is empty!");

        FourierAnalyzer::new(fft_size, smoothing, [min_decibels, max_decibels], window, rate)
    }
}

/// Fourier Analyzer
///
/// # Example
/// ```
/// # use pop_core::analyzer::fourier::*;
/// let mut analyzer = FourierBuilder::new()
///     .fft_size(1024)
///     .smoothing(0.8)
///     .decibels(-100.0, -30.0)
///     .window(window::blackman)
///     .rate(44100)
///     .plan();
///
/// let buf = pop_core::analyzer::SampleBuffer::new(4096, 44100);
/// let snapshot = analyzer.analyze(&buf);
/// assert_eq!(snapshot.frequency.len(), 512);
/// assert_eq!(snapshot.waveform.len(), 512);
/// ```
#[derive(Clone)]
pub struct FourierAnalyzer {
    fft_size: usize,
    smoothing: f32,
    decibels: [f32; 2],
    window: Vec<Sample>,
    rate: usize,

    fft: std::sync::Arc<dyn rustfft::Fft<Sample>>,

    input: Vec<Sample>,
    buffer: Vec<rustfft::num_complex::Complex<Sample>>,
    scratch: Vec<rustfft::num_complex::Complex<Sample>>,
    magnitudes: Vec<Sample>,

    snapshot: analyzer::Snapshot,
}

impl std::fmt::Debug for FourierAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "FourierAnalyzer {{ fft_size: {:?}, smoothing: {:?}, rate: {:?} }}",
            self.fft_size, self.smoothing, self.rate,
        )
    }
}

impl FourierAnalyzer {
    fn new(
        fft_size: usize,
        smoothing: f32,
        decibels: [f32; 2],
        window: Vec<f32>,
        rate: usize,
    ) -> FourierAnalyzer {
        use rustfft::num_traits::Zero;

        let fft = rustfft::FftPlanner::new().plan_fft_forward(fft_size);
        let bins = fft_size / 2;
        let layout = analyzer::BinLayout::new(bins, rate as f32 / 2.0);
        let scratch_len = fft.get_inplace_scratch_len();

        let fa = FourierAnalyzer {
            fft_size,
            smoothing,
            decibels,
            window,
            rate,

            fft,

            input: vec![0.0; fft_size],
            buffer: vec![rustfft::num_complex::Complex::zero(); fft_size],
            scratch: vec![rustfft::num_complex::Complex::zero(); scratch_len],
            magnitudes: vec![0.0; bins],

            snapshot: analyzer::Snapshot::silent(layout),
        };

        log::debug!("FourierAnalyzer({:p}):", &fa);
        log::debug!("    FFT Size            = {:8}", fft_size);
        log::debug!("    Bins                = {:8}", bins);
        log::debug!("    Smoothing           = {:8.3}", smoothing);
        log::debug!("    Decibels            = {:8.1} .. {:.1}", decibels[0], decibels[1]);
        log::debug!("    Nyquist Frequency   = {:8.3} Hz", layout.nyquist());

        fa
    }

    /// Return the number of frequency bins
    #[inline]
    pub fn bins(&self) -> usize {
        self.fft_size / 2
    }

    /// Return the mapping between frequencies and bins
    #[inline]
    pub fn bin_layout(&self) -> analyzer::BinLayout {
        self.snapshot.layout
    }

    /// Return the decibel range meant for display scaling
    #[inline]
    pub fn decibels(&self) -> (f32, f32) {
        (self.decibels[0], self.decibels[1])
    }

    /// Analyze a `SampleBuffer`
    ///
    /// Returns the snapshot of this tick.  The frequency part is smoothed with the data from
    /// previous calls.
    pub fn analyze(&mut self, buf: &analyzer::SampleBuffer) -> &analyzer::Snapshot {
        log::trace!("FourierAnalyzer({:p}): Analyzing ...", &self);

        assert_eq!(
            buf.rate(),
            self.rate,
            "Samplerate of buffer does not match!"
        );

        // Zero-padded in front if the recorder holds less than one block
        let copied = buf.copy_latest(&mut self.input);
        if copied < self.fft_size {
            self.input.rotate_right(self.fft_size - copied);
            for s in self.input[..self.fft_size - copied].iter_mut() {
                *s = 0.0;
            }
        }

        let bins = self.bins();
        self.snapshot
            .waveform
            .copy_from_slice(&self.input[self.fft_size - bins..]);

        for ((b, s), w) in self
            .buffer
            .iter_mut()
            .zip(self.input.iter())
            .zip(self.window.iter())
        {
            *b = rustfft::num_complex::Complex::new(s * w, 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        let norm = 1.0 / self.fft_size as f32;
        let smoothing = self.smoothing;
        for ((m, o), db) in self
            .magnitudes
            .iter_mut()
            .zip(self.buffer.iter())
            .zip(self.snapshot.frequency.iter_mut())
        {
            *m = smoothing * *m + (1.0 - smoothing) * o.norm() * norm;
            *db = 20.0 * m.log10();
        }

        &self.snapshot
    }

    /// Return the snapshot of the last call to `analyze`
    pub fn snapshot(&self) -> &analyzer::Snapshot {
        &self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(smoothing: f32) -> FourierAnalyzer {
        FourierBuilder::new()
            .rate(8000)
            .fft_size(256)
            .smoothing(smoothing)
            .decibels(-100.0, -30.0)
            .window(window::from_str("blackman").unwrap())
            .plan()
    }

    #[test]
    fn test_init() {
        let analyzer = plan(0.8);

        assert_eq!(analyzer.bins(), 128);
        assert_eq!(analyzer.bin_layout().nyquist(), 4000.0);
    }

    #[test]
    fn test_silence() {
        let mut analyzer = plan(0.0);
        let buf = analyzer::SampleBuffer::new(1024, 8000);

        let snapshot = analyzer.analyze(&buf);
        assert!(snapshot.frequency.iter().all(|db| *db == f32::NEG_INFINITY));
        assert!(snapshot.waveform.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_sine() {
        let mut analyzer = plan(0.0);
        let buf = analyzer::SampleBuffer::new(1024, 8000);

        // Exactly on bin 32
        let freq = analyzer.bin_layout().bin_to_freq(32);
        buf.push(
            &(0..1024)
                .map(|i| (i as f32 / 8000.0 * freq * 2.0 * std::f32::consts::PI).sin() * 0.5)
                .collect::<Vec<_>>(),
        );

        let snapshot = analyzer.analyze(&buf);
        assert_eq!(snapshot.loudest().map(|(i, _)| i), Some(32));
        assert!(crate::analyzer::threshold::peak(&snapshot.waveform, 0.45));
        assert!(!crate::analyzer::threshold::peak(&snapshot.waveform, 0.5));
    }

    #[test]
    fn test_smoothing() {
        let mut analyzer = plan(0.5);
        let buf = analyzer::SampleBuffer::new(1024, 8000);
        buf.push(&[0.5; 1024]);

        let first = analyzer.analyze(&buf).frequency[0];
        let second = analyzer.analyze(&buf).frequency[0];
        assert_eq!(analyzer.snapshot().frequency[0], second);

        // Halfway there after one tick, three quarters after two
        assert!((second - first - 20.0 * 1.5f32.log10()).abs() < 1e-3);
    }

    #[test]
    fn test_short_buffer() {
        let mut analyzer = plan(0.0);
        let buf = analyzer::SampleBuffer::new(64, 8000);
        buf.push(&[0.25; 64]);

        let snapshot = analyzer.analyze(&buf);
        assert_eq!(snapshot.waveform.len(), 128);
        assert_eq!(snapshot.waveform[127], 0.25);
        assert_eq!(snapshot.waveform[0], 0.0);
    }

    #[test]
    #[should_panic]
    fn test_rate_mismatch() {
        let mut analyzer = plan(0.0);
        let buf = analyzer::SampleBuffer::new(1024, 44100);

        analyzer.analyze(&buf);
    }
}
