pub mod detector;
pub mod fourier;
pub mod interval;
pub mod samples;
pub mod snapshot;
pub mod threshold;

pub use self::detector::{Detector, Trigger, Triggers};
pub use self::fourier::{window, FourierAnalyzer, FourierBuilder};
pub use self::interval::{IntervalBuilder, IntervalMeter};
pub use self::samples::{Sample, SampleBuffer};
pub use self::snapshot::{BinLayout, BinMapping, Decibels, Frequency, Snapshot};
