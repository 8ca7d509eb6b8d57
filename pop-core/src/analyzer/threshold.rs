//! Threshold Detectors
//!
//! Stateless checks over a single buffer.  Frequency checks expect decibel magnitudes,
//! `peak` and `sustained` expect time-domain amplitudes.  None of these fail: degenerate
//! input is simply "no detection".
use super::snapshot::{BinMapping, Frequency};

/// Return true if any bin between `low` and `high` is louder than `threshold`
///
/// Both frequencies are mapped through `mapping`; the resulting range is half-open and its
/// upper end is clamped to the buffer.  Note that FFT size and smoothing both have an
/// averaging effect on what ends up in the buffer.
///
/// # Example
/// ```
/// # use pop_core::analyzer::threshold;
/// let freq = [-100.0, -80.0, -60.0, -50.0, -90.0];
/// let mapping = |hz: f32| (hz / 100.0) as usize;
///
/// assert!(threshold::band(100.0, 400.0, &freq, -70.0, &mapping));
/// assert!(!threshold::band(400.0, 500.0, &freq, -70.0, &mapping));
/// ```
pub fn band<M: BinMapping + ?Sized>(
    low: Frequency,
    high: Frequency,
    samples: &[f32],
    threshold: f32,
    mapping: &M,
) -> bool {
    let start = mapping.bin_index(low);
    let end = mapping.bin_index(high).min(samples.len());

    if start >= end {
        return false;
    }

    samples[start..end].iter().any(|&s| s > threshold)
}

/// Return true if the single bin at `index` is louder than `threshold`
pub fn bin(index: usize, samples: &[f32], threshold: f32) -> bool {
    samples.get(index).map_or(false, |&s| s > threshold)
}

/// Return true if the absolute value of any sample exceeds `threshold`
///
/// Catches short bursts; how short depends on the resolution of the buffer.
pub fn peak(samples: &[f32], threshold: f32) -> bool {
    samples.iter().any(|s| s.abs() > threshold)
}

/// Return true if the mean absolute amplitude reaches `threshold`
///
/// Only fires on sustained energy across the whole buffer.  An empty buffer never does.
pub fn sustained(samples: &[f32], threshold: f32) -> bool {
    if samples.is_empty() {
        return false;
    }

    mean_abs(samples) >= threshold
}

/// Mean of the absolute values of `samples`
pub fn mean_abs(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    samples.iter().map(|s| s.abs()).sum::<f32>() / samples.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(hz: Frequency) -> usize {
        hz as usize
    }

    #[test]
    fn test_peak() {
        assert!(peak(&[0.1, -0.95, 0.2], 0.9));
        assert!(!peak(&[0.1, -0.9, 0.9], 0.9));
        assert!(!peak(&[], 0.0));
    }

    #[test]
    fn test_peak_quiet() {
        let quiet = (0..512)
            .map(|i| (i as f32 * 0.1).sin() * 0.5)
            .collect::<Vec<_>>();

        assert!(!peak(&quiet, 0.5));
        assert!(peak(&quiet, 0.49));
    }

    #[test]
    fn test_sustained() {
        assert!(sustained(&[0.3, -0.3, 0.3, -0.3], 0.3));
        assert!(!sustained(&[0.29, -0.29], 0.3));

        // A single spike does not move the mean enough
        let mut spike = vec![0.0; 100];
        spike[50] = 1.0;
        assert!(peak(&spike, 0.9));
        assert!(!sustained(&spike, 0.3));
    }

    #[test]
    fn test_sustained_empty() {
        assert!(!sustained(&[], 0.0));
        assert!(!sustained(&[], -1.0));
        assert_eq!(mean_abs(&[]), 0.0);
    }

    #[test]
    fn test_band() {
        let freq = [-100.0, -90.0, -80.0, -60.0, -50.0, -95.0];

        assert!(band(2.0, 5.0, &freq, -70.0, &identity));
        assert!(!band(0.0, 3.0, &freq, -70.0, &identity));
        // Upper bound is exclusive
        assert!(!band(5.0, 6.0, &freq, -70.0, &identity));
        assert!(band(4.0, 5.0, &freq, -70.0, &identity));
    }

    #[test]
    fn test_band_degenerate() {
        let freq = [-10.0; 8];

        assert!(!band(4.0, 4.0, &freq, -70.0, &identity));
        assert!(!band(6.0, 2.0, &freq, -70.0, &identity));
        assert!(!band(20.0, 40.0, &freq, -70.0, &identity));
        assert!(!band(0.0, 8.0, &[], -70.0, &identity));

        // Partially out of range gets clamped
        assert!(band(6.0, 100.0, &freq, -70.0, &identity));
    }

    #[test]
    fn test_band_layout() {
        use crate::analyzer::BinLayout;

        let layout = BinLayout::new(512, 22050.0);
        let mut freq = vec![-120.0; 512];
        assert!(!band(0.0, 80.0, &freq, -70.0, &layout));

        freq[1] = -65.0;
        assert!(band(0.0, 80.0, &freq, -70.0, &layout));
        assert!(!band(200.0, 2000.0, &freq, -70.0, &layout));
    }

    #[test]
    fn test_bin() {
        let freq = [-80.0, -40.0];

        assert!(bin(1, &freq, -55.0));
        assert!(!bin(0, &freq, -55.0));
        assert!(!bin(2, &freq, -55.0));
    }
}
