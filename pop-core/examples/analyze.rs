use pop_core::analyzer;

#[derive(Debug, Clone)]
pub struct AnalyzerResult {
    level: f32,
    loudest: f32,
}

fn main() {
    pop_core::default_log();
    pop_core::default_config();

    let mut fourier = analyzer::FourierBuilder::new().plan();

    let mut frames = pop_core::Visualizer::new(
        AnalyzerResult {
            level: 0.0,
            loudest: 0.0,
        },
        move |info, samples| {
            let snapshot = fourier.analyze(samples);

            info.level = analyzer::threshold::mean_abs(&snapshot.waveform);
            info.loudest = snapshot
                .loudest()
                .map_or(0.0, |(bin, _)| snapshot.layout.bin_to_freq(bin));
            info
        },
    )
    .frames();

    for frame in frames.iter() {
        frame.lock_info(|info| {
            for _ in 0..(200.0 * info.level) as usize {
                print!("#");
            }
            println!(" {:7.1} Hz", info.loudest);
        });
        std::thread::sleep(std::time::Duration::from_millis(30));
    }
}
