//! Interval Meter
use std::collections;
use std::time;

/// Builder for IntervalMeter
#[derive(Debug, Default)]
pub struct IntervalBuilder {
    /// Number of accepted pulse timestamps to keep around
    ///
    /// Larger values smooth [`average`](struct.IntervalMeter.html#method.average) more but
    /// make it respond slower.
    ///
    /// Can also be set from config as `"meter.samples"`.
    pub sample_count: Option<usize>,

    /// Debounce window in milliseconds
    ///
    /// Pulses closer together than this count as one physical event.  Setting this too high
    /// means legit pulses get ignored.
    ///
    /// Can also be set from config as `"meter.min_interval"`.
    pub min_interval: Option<f64>,
}

impl IntervalBuilder {
    pub fn new() -> IntervalBuilder {
        Default::default()
    }

    pub fn sample_count(&mut self, count: usize) -> &mut IntervalBuilder {
        self.sample_count = Some(count);
        self
    }

    pub fn min_interval(&mut self, ms: f64) -> &mut IntervalBuilder {
        self.min_interval = Some(ms);
        self
    }

    pub fn build(&mut self) -> IntervalMeter {
        let sample_count = self
            .sample_count
            .unwrap_or_else(|| crate::CONFIG.get_or("meter.samples", 5));
        let min_interval = self
            .min_interval
            .unwrap_or_else(|| crate::CONFIG.get_or("meter.min_interval", 200.0));

        IntervalMeter::new(sample_count, min_interval)
    }
}

/// Debounced pulse recorder
///
/// Turns a stream of discrete pulses into an interval estimate.  The meter is *cold* until
/// two pulses were accepted, afterwards it is *warm* and [`calculate`](#method.calculate)
/// yields a value.
///
/// # Example
/// ```
/// # use pop_core::analyzer::IntervalBuilder;
/// let mut meter = IntervalBuilder::new()
///     .sample_count(5)
///     .min_interval(200.0)
///     .build();
///
/// assert!(meter.pulse_at(0.0));
/// assert!(!meter.pulse_at(120.0));
/// assert!(meter.pulse_at(500.0));
///
/// assert_eq!(meter.calculate(), Some(500.0));
/// assert_eq!(meter.bpm(), 120.0);
/// ```
#[derive(Debug, Clone)]
pub struct IntervalMeter {
    sample_count: usize,
    min_interval: f64,

    start: time::Instant,
    timestamps: collections::VecDeque<f64>,
    last_pulse: Option<f64>,
    /// Kept apart from `timestamps` so a single retained sample still yields an interval
    interval: Option<f64>,
}

impl IntervalMeter {
    fn new(sample_count: usize, min_interval: f64) -> IntervalMeter {
        assert!(sample_count > 0, "Interval meter needs to keep at least one sample!");
        assert!(min_interval > 0.0, "Debounce window must be positive!");

        log::debug!("IntervalMeter:");
        log::debug!("    Samples      = {:8}", sample_count);
        log::debug!("    Min Interval = {:8.1} ms", min_interval);

        IntervalMeter {
            sample_count,
            min_interval,

            start: time::Instant::now(),
            timestamps: collections::VecDeque::with_capacity(sample_count),
            last_pulse: None,
            interval: None,
        }
    }

    /// Record a pulse happening right now
    ///
    /// Returns false if the pulse was debounced.
    pub fn pulse(&mut self) -> bool {
        let now = crate::helpers::millis(self.start);
        self.pulse_at(now)
    }

    /// Record a pulse at `now` milliseconds since the meter was created
    pub fn pulse_at(&mut self, now: f64) -> bool {
        debug_assert!(now.is_finite(), "Pulse timestamp must be finite!");

        if let Some(last) = self.last_pulse {
            if now - last < self.min_interval {
                return false;
            }
        }

        if self.timestamps.len() == self.sample_count {
            self.timestamps.pop_front();
        }
        self.timestamps.push_back(now);
        self.interval = self.last_pulse.map(|last| now - last);
        self.last_pulse = Some(now);

        log::trace!("Pulse accepted at {:.1} ms", now);
        true
    }

    /// Interval between the two most recent pulses in milliseconds
    pub fn calculate(&self) -> Option<f64> {
        self.interval
    }

    /// Mean interval over all retained pulses in milliseconds
    ///
    /// Same as `calculate` while fewer than two pulses are retained.
    pub fn average(&self) -> Option<f64> {
        let len = self.timestamps.len();
        if len < 2 {
            return self.interval;
        }

        Some((self.timestamps[len - 1] - self.timestamps[0]) / (len - 1) as f64)
    }

    /// Pulses per minute derived from the most recent interval, 0 while cold
    pub fn bpm(&self) -> f64 {
        self.calculate()
            .map_or(0.0, |interval| (60000.0 / interval).trunc())
    }

    /// Return true once at least two pulses were accepted
    pub fn is_warm(&self) -> bool {
        self.interval.is_some()
    }

    /// Return the number of retained pulses
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Return the configured debounce window
    #[inline]
    pub fn min_interval(&self) -> f64 {
        self.min_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meter(sample_count: usize, min_interval: f64) -> IntervalMeter {
        IntervalBuilder::new()
            .sample_count(sample_count)
            .min_interval(min_interval)
            .build()
    }

    #[test]
    fn test_cold() {
        let mut m = meter(5, 200.0);
        assert_eq!(m.calculate(), None);
        assert_eq!(m.bpm(), 0.0);
        assert!(!m.is_warm());

        assert!(m.pulse_at(0.0));
        assert_eq!(m.calculate(), None);
        assert_eq!(m.average(), None);
        assert!(!m.is_warm());
    }

    #[test]
    fn test_interval() {
        let mut m = meter(5, 200.0);

        assert!(m.pulse_at(0.0));
        assert!(m.pulse_at(500.0));
        assert!(m.is_warm());
        assert_eq!(m.calculate(), Some(500.0));
        assert_eq!(m.bpm(), 120.0);
    }

    #[test]
    fn test_debounce() {
        let mut m = meter(5, 200.0);

        assert!(m.pulse_at(0.0));
        assert!(m.pulse_at(500.0));
        assert!(!m.pulse_at(650.0));
        assert_eq!(m.calculate(), Some(500.0));
        assert_eq!(m.len(), 2);
        assert_eq!(m.min_interval(), 200.0);

        // Debounced pulses do not move the window
        assert!(m.pulse_at(700.0));
        assert_eq!(m.calculate(), Some(200.0));
    }

    #[test]
    fn test_backwards_time() {
        let mut m = meter(5, 200.0);

        assert!(m.pulse_at(1000.0));
        assert!(!m.pulse_at(100.0));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_retention() {
        let mut m = meter(5, 200.0);

        for i in 0..10 {
            assert!(m.pulse_at(i as f64 * 300.0 + (i * i) as f64));
        }

        assert_eq!(m.len(), 5);
        // Last two pulses at 2700 + 81 and 2400 + 64
        assert_eq!(m.calculate(), Some(317.0));
    }

    #[test]
    fn test_average() {
        let mut m = meter(5, 200.0);

        m.pulse_at(0.0);
        m.pulse_at(300.0);
        m.pulse_at(700.0);
        assert_eq!(m.average(), Some(350.0));
        assert_eq!(m.calculate(), Some(400.0));
        assert_eq!(m.bpm(), 150.0);
    }

    #[test]
    fn test_single_sample() {
        let mut m = meter(1, 200.0);

        assert!(m.pulse_at(0.0));
        assert!(!m.is_warm());
        assert!(m.pulse_at(500.0));
        assert_eq!(m.len(), 1);
        assert!(m.is_warm());
        assert_eq!(m.calculate(), Some(500.0));
        assert_eq!(m.average(), Some(500.0));
        assert_eq!(m.bpm(), 120.0);

        assert!(m.pulse_at(900.0));
        assert_eq!(m.calculate(), Some(400.0));
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn test_nan_pulse() {
        let mut m = meter(5, 200.0);
        m.pulse_at(0.0);
        m.pulse_at(std::f64::NAN);
    }

    #[test]
    fn test_realtime() {
        let mut m = meter(5, 1.0);

        assert!(m.pulse());
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(m.pulse());
        assert!(m.calculate().unwrap() >= 1.0);
    }

    #[test]
    #[should_panic]
    fn test_zero_window() {
        meter(5, 0.0);
    }
}
