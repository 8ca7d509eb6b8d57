//! Threshold detection for audio-reactive toys.
//!
//! # Example
//! ```rust,no_run
//! use pop_core::analyzer;
//!
//! // The data-type for storing analyzer results
//! #[derive(Debug, Clone)]
//! pub struct AnalyzerResult {
//!     pops: u64,
//!     bpm: f64,
//! }
//!
//! fn main() {
//!     // Initialize the logger.  Take a look at the sources if you want to customize
//!     // the logger.
//!     pop_core::default_log();
//!
//!     // Load the default config source.  You can also do this manually if you have
//!     // special requirements.
//!     pop_core::default_config();
//!
//!     // Initialize some analyzer-tools.  These will be moved into the analyzer closure
//!     // later on.
//!     let mut fourier = analyzer::FourierBuilder::new().fft_size(1024).plan();
//!     let mut meter = analyzer::IntervalBuilder::new().build();
//!     let mut triggers = analyzer::Triggers::new();
//!     triggers.push(
//!         analyzer::Trigger::new(
//!             "bass",
//!             analyzer::Detector::Band { low: 0.0, high: 80.0, threshold: -70.0 },
//!         )
//!         .gated(),
//!     );
//!
//!     let mut frames = pop_core::Visualizer::new(
//!         AnalyzerResult { pops: 0, bpm: 0.0 },
//!         // This closure is the "analyzer".  It runs before every frame to always
//!         // have the latest data available.
//!         move |info, samples| {
//!             let snapshot = fourier.analyze(samples);
//!
//!             info.pops += triggers.evaluate(snapshot, &mut meter).len() as u64;
//!             info.bpm = meter.bpm();
//!             info
//!         },
//!     )
//!     // Build the frame iterator which is the base of your loop later on
//!     .frames();
//!
//!     for frame in frames.iter() {
//!         // Inside this closure you have access to the latest data from the analyzer
//!         frame.lock_info(|info| {
//!             println!("{:5} pops, {:3} bpm", info.pops, info.bpm);
//!         });
//!         std::thread::sleep(std::time::Duration::from_millis(30));
//!     }
//! }
//! ```
pub mod analyzer;
pub mod frames;
pub mod helpers;
pub mod recorder;
pub mod visualizer;

#[doc(inline)]
pub use crate::frames::Frames;
#[doc(inline)]
pub use crate::visualizer::Visualizer;

/// `ezconf` configuration
///
/// Usually you will call [`default_config`](fn.default_config.html) in the beginning
/// which will populate this object, but you can also specify your own custom config
/// sources.
///
/// # Example
/// To make use of this config, use code similar to this:
///
/// ```rust
/// # pop_core::default_config();
/// let threshold = pop_core::CONFIG.get_or(
///     // Toml path to value
///     "balloon.peak",
///     // Default value.  Type gets inferred from this
///     0.9,
/// );
/// ```
pub static CONFIG: ezconf::Config = ezconf::INIT;

/// Initialize config from default sources
///
/// The default sources are:
/// * `./popper.toml`
/// * `./config/popper.toml`
/// * Defaults from code
pub fn default_config() {
    CONFIG
        .init(
            [
                ezconf::Source::File("popper.toml"),
                ezconf::Source::File("config/popper.toml"),
            ]
            .iter(),
        )
        .expect("Can't load config");
}

/// Initialize logger
///
/// By default, enable debug output in debug-builds.
pub fn default_log() {
    #[cfg(not(debug_assertions))]
    env_logger::init();

    #[cfg(debug_assertions)]
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Debug)
        .init();

    color_backtrace::install();
}
