use crate::analyzer;
use crate::recorder;

/// Description of an analysis loop
///
/// `initial` is the info value the presentation side sees before the first analysis, the
/// `analyzer` closure updates it from the latest samples.
#[derive(Debug)]
pub struct Visualizer<R, A>
where
    R: Clone + Send + 'static,
    for<'r> A: FnMut(&'r mut R, &analyzer::SampleBuffer) -> &'r mut R + Send + 'static,
{
    pub initial: R,
    pub analyzer: A,
    pub recorder: Option<Box<dyn recorder::Recorder>>,
    pub async_analyzer: Option<usize>,
}

impl<R, A> Visualizer<R, A>
where
    R: Clone + Send + 'static,
    for<'r> A: FnMut(&'r mut R, &analyzer::SampleBuffer) -> &'r mut R + Send + 'static,
{
    pub fn new(initial: R, analyzer: A) -> Visualizer<R, A> {
        Visualizer {
            initial,
            analyzer,
            recorder: None,
            async_analyzer: None,
        }
    }

    /// Use a specific recorder instead of the configured one
    pub fn recorder(mut self, r: Box<dyn recorder::Recorder>) -> Visualizer<R, A> {
        self.recorder = Some(r);
        self
    }

    /// Run the analyzer on its own thread, `rate` times per second
    ///
    /// A rate of 0 keeps the analyzer in the frame loop.
    pub fn async_analyzer(mut self, rate: usize) -> Visualizer<R, A> {
        self.async_analyzer = Some(rate);
        self
    }

    pub fn frames(self) -> crate::Frames<R, A> {
        crate::Frames::from_vis(self)
    }
}
