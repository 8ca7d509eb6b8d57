//! Named detectors
//!
//! A [`Triggers`](struct.Triggers.html) table holds the detectors an application cares about.
//! Each tick it is evaluated against the current snapshot and reports which of its entries
//! fired; what to do about it is up to the application.
use crate::analyzer::{self, threshold};

/// What to look for in a snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum Detector {
    /// Any bin between two frequencies (in Hz) louder than `threshold` dB
    Band {
        low: analyzer::Frequency,
        high: analyzer::Frequency,
        threshold: analyzer::Decibels,
    },
    /// A single bin louder than `threshold` dB
    Bin {
        index: usize,
        threshold: analyzer::Decibels,
    },
    /// All of the given bins louder than `threshold` dB at once
    Chord {
        bins: Vec<usize>,
        threshold: analyzer::Decibels,
    },
    /// Any waveform sample above `threshold` in absolute value
    Peak { threshold: analyzer::Sample },
    /// Mean absolute waveform amplitude of at least `threshold`
    Sustained { threshold: analyzer::Sample },
}

impl Detector {
    pub fn detect(&self, snapshot: &analyzer::Snapshot) -> bool {
        match self {
            Detector::Band {
                low,
                high,
                threshold,
            } => threshold::band(*low, *high, &snapshot.frequency, *threshold, &snapshot.layout),
            Detector::Bin { index, threshold } => {
                threshold::bin(*index, &snapshot.frequency, *threshold)
            }
            Detector::Chord { bins, threshold } => {
                !bins.is_empty()
                    && bins
                        .iter()
                        .all(|i| threshold::bin(*i, &snapshot.frequency, *threshold))
            }
            Detector::Peak { threshold } => threshold::peak(&snapshot.waveform, *threshold),
            Detector::Sustained { threshold } => {
                threshold::sustained(&snapshot.waveform, *threshold)
            }
        }
    }
}

/// A named detector
#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    pub name: String,
    pub detector: Detector,

    /// Whether a detection has to pass the interval meter's debounce to fire
    pub gated: bool,
}

impl Trigger {
    pub fn new<S: Into<String>>(name: S, detector: Detector) -> Trigger {
        Trigger {
            name: name.into(),
            detector,
            gated: false,
        }
    }

    /// Route detections through the interval meter
    pub fn gated(mut self) -> Trigger {
        self.gated = true;
        self
    }
}

/// Table of triggers evaluated in order
#[derive(Debug, Clone, Default)]
pub struct Triggers {
    triggers: Vec<Trigger>,
}

impl Triggers {
    pub fn new() -> Triggers {
        Default::default()
    }

    pub fn push(&mut self, trigger: Trigger) -> &mut Triggers {
        log::debug!("Trigger {:?}: {:?}", trigger.name, trigger.detector);

        self.triggers.push(trigger);
        self
    }

    /// Look up a trigger's index by name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.triggers.iter().position(|t| t.name == name)
    }

    pub fn iter<'a>(&'a self) -> std::slice::Iter<'a, Trigger> {
        self.triggers.iter()
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    /// Evaluate all triggers against `snapshot`
    ///
    /// Returns the indices of the triggers that fired.  Gated triggers share `meter`, so
    /// only the first gated detection of a physical event gets through.
    ///
    /// # Example
    /// ```
    /// # use pop_core::analyzer::*;
    /// let mut triggers = Triggers::new();
    /// triggers
    ///     .push(Trigger::new("peak", Detector::Peak { threshold: 0.9 }).gated())
    ///     .push(Trigger::new("loud", Detector::Sustained { threshold: 0.5 }));
    ///
    /// let mut meter = IntervalBuilder::new().sample_count(5).min_interval(200.0).build();
    /// let mut snapshot = Snapshot::silent(BinLayout::new(4, 4000.0));
    /// snapshot.waveform = vec![0.1, -0.95, 0.2, 0.0];
    ///
    /// assert_eq!(triggers.evaluate(&snapshot, &mut meter), vec![0]);
    /// ```
    pub fn evaluate(
        &self,
        snapshot: &analyzer::Snapshot,
        meter: &mut analyzer::IntervalMeter,
    ) -> Vec<usize> {
        self.evaluate_with(snapshot, || meter.pulse())
    }

    /// Like `evaluate`, but with a custom gate instead of the meter's wall clock
    pub fn evaluate_with<G: FnMut() -> bool>(
        &self,
        snapshot: &analyzer::Snapshot,
        mut gate: G,
    ) -> Vec<usize> {
        self.triggers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.detector.detect(snapshot))
            .filter(|(_, t)| !t.gated || gate())
            .map(|(i, t)| {
                log::trace!("Trigger {:?} fired", t.name);
                i
            })
            .collect()
    }
}
