//! Analysis Snapshot

/// Type Alias for Frequencies
pub type Frequency = f32;

/// Type Alias for decibel magnitudes
pub type Decibels = f32;

/// Capability to map a frequency onto a bin index
///
/// The relation between bins and frequencies is owned by whoever produced the frequency
/// buffer, so detectors take it as a parameter instead of guessing.  Closures work too:
///
/// ```
/// # use pop_core::analyzer::BinMapping;
/// let mapping = |hz: f32| (hz / 10.0) as usize;
/// assert_eq!(mapping.bin_index(45.0), 4);
/// ```
pub trait BinMapping {
    /// Return the index of the bin containing `hz`
    fn bin_index(&self, hz: Frequency) -> usize;
}

impl<F> BinMapping for F
where
    F: Fn(Frequency) -> usize,
{
    fn bin_index(&self, hz: Frequency) -> usize {
        self(hz)
    }
}

/// Linear bin layout from 0 Hz up to the Nyquist frequency
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinLayout {
    bins: usize,
    nyquist: Frequency,
}

impl BinLayout {
    pub fn new(bins: usize, nyquist: Frequency) -> BinLayout {
        assert!(nyquist > 0.0, "Nyquist frequency must be positive!");

        BinLayout { bins, nyquist }
    }

    /// Return the number of bins
    #[inline]
    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Return the frequency of the highest bin
    #[inline]
    pub fn nyquist(&self) -> Frequency {
        self.nyquist
    }

    /// Return the frequency associated with a bin
    pub fn bin_to_freq(&self, i: usize) -> Frequency {
        i as Frequency / self.bins as Frequency * self.nyquist
    }
}

impl BinMapping for BinLayout {
    fn bin_index(&self, hz: Frequency) -> usize {
        let x = (hz / self.nyquist * self.bins as Frequency).round();

        if x <= 0.0 {
            0
        } else {
            (x as usize).min(self.bins)
        }
    }
}

/// One tick worth of analysis data
///
/// `frequency` holds one decibel value per bin (`-inf` for silent bins), `waveform` holds
/// the most recent time-domain samples, roughly in `[-1, 1]`.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub frequency: Vec<Decibels>,
    pub waveform: Vec<super::Sample>,
    pub layout: BinLayout,
}

impl Snapshot {
    /// Create a silent snapshot for the given layout
    pub fn silent(layout: BinLayout) -> Snapshot {
        Snapshot {
            frequency: vec![Decibels::NEG_INFINITY; layout.bins()],
            waveform: vec![0.0; layout.bins()],
            layout,
        }
    }

    /// Return the loudest bin and its level
    pub fn loudest(&self) -> Option<(usize, Decibels)> {
        self.frequency
            .iter()
            .cloned()
            .enumerate()
            .filter(|(_, v)| !v.is_nan())
            .fold(None, |best, (i, v)| match best {
                Some((_, b)) if b >= v => best,
                _ => Some((i, v)),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_mapping() {
        let layout = BinLayout::new(512, 22050.0);

        assert_eq!(layout.bin_index(0.0), 0);
        assert_eq!(layout.bin_index(22050.0), 512);
        assert_eq!(layout.bin_index(80.0), 2);
        assert_eq!(layout.bin_index(-5.0), 0);
        assert_eq!(layout.bin_index(96000.0), 512);
    }

    #[test]
    fn test_layout_conversion() {
        let layout = BinLayout::new(512, 22050.0);

        for i in 0..512 {
            assert_eq!(i, layout.bin_index(layout.bin_to_freq(i)));
        }
    }

    #[test]
    fn test_loudest() {
        let mut snapshot = Snapshot::silent(BinLayout::new(8, 4000.0));
        assert_eq!(snapshot.loudest(), Some((0, Decibels::NEG_INFINITY)));

        snapshot.frequency[5] = -40.0;
        snapshot.frequency[2] = -60.0;
        assert_eq!(snapshot.loudest(), Some((5, -40.0)));
    }
}
