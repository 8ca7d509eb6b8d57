use pop_core::analyzer;
use sfml::{graphics, system};

const BUCKETS: usize = 200;
const WIDTH: u32 = 1600;
const HEIGHT: u32 = 800;

#[derive(Debug, Clone)]
struct AnalyzerResult {
    spectrum: Vec<f32>,
    waveform: Vec<f32>,
    // band, peak, sustained
    hits: [bool; 3],
}

/// Map a decibel value onto 0..1 inside the analyser's display range
fn scale(db: f32, (min, max): (f32, f32)) -> f32 {
    ((db - min) / (max - min)).max(0.0).min(1.0)
}

/// Merge adjacent bins, keeping the loudest of each group
fn fill_buckets(bins: &[f32], out: &mut [f32]) {
    for o in out.iter_mut() {
        *o = 0.0;
    }

    for (i, v) in bins.iter().enumerate() {
        let bucket = i * out.len() / bins.len();
        out[bucket] = out[bucket].max(*v);
    }
}

fn main() {
    use sfml::graphics::{RenderTarget, Shape, Transformable};

    pop_core::default_config();
    pop_core::default_log();

    let context_settings = sfml::window::ContextSettings {
        antialiasing_level: 4,
        ..Default::default()
    };

    let mut window = graphics::RenderWindow::new(
        (WIDTH, HEIGHT),
        "Popper Spectrum Display",
        sfml::window::Style::CLOSE,
        &context_settings,
    );
    window.set_vertical_sync_enabled(true);

    let mut rectangle = graphics::RectangleShape::new();

    // Analyzer {{{
    let mut fourier = analyzer::FourierBuilder::new().plan();
    let range = fourier.decibels();

    let detectors = [
        analyzer::Detector::Band {
            low: pop_core::CONFIG.get_or("spectral.band.low", 0.0),
            high: pop_core::CONFIG.get_or("spectral.band.high", 80.0),
            threshold: pop_core::CONFIG.get_or("spectral.band.threshold", -70.0),
        },
        analyzer::Detector::Peak {
            threshold: pop_core::CONFIG.get_or("spectral.peak", 0.9),
        },
        analyzer::Detector::Sustained {
            threshold: pop_core::CONFIG.get_or("spectral.sustained", 0.3),
        },
    ];

    let mut frames = pop_core::Visualizer::new(
        AnalyzerResult {
            spectrum: vec![0.0; BUCKETS],
            waveform: vec![0.0; fourier.bins()],
            hits: [false; 3],
        },
        move |info, samples| {
            let snapshot = fourier.analyze(samples);

            let scaled = snapshot
                .frequency
                .iter()
                .map(|db| scale(*db, range))
                .collect::<Vec<_>>();
            fill_buckets(&scaled, &mut info.spectrum);
            info.waveform.copy_from_slice(&snapshot.waveform);

            for (hit, detector) in info.hits.iter_mut().zip(detectors.iter()) {
                *hit = detector.detect(snapshot);
            }

            info
        },
    )
    .frames();
    // }}}

    // Hit indicators stay lit until reset
    let mut lit = [false; 3];

    'main: for frame in frames.iter() {
        log::trace!("Frame: {:7}@{:.3}", frame.frame, frame.time);

        while let Some(event) = window.poll_event() {
            use sfml::window::{Event, Key};

            match event {
                Event::Closed => break 'main,
                Event::KeyPressed {
                    code: Key::Escape, ..
                } => break 'main,
                Event::KeyPressed { code: Key::R, .. } => {
                    log::debug!("Resetting hit indicators");
                    lit = [false; 3];
                }
                _ => (),
            }
        }

        window.clear(graphics::Color::BLACK);

        frame.lock_info(|info| {
            let half = HEIGHT as f32 / 2.0;

            // Spectrum in the lower half
            let bar = WIDTH as f32 / BUCKETS as f32;
            for (i, b) in info.spectrum.iter().enumerate() {
                let int = (b * 255.0) as u8;
                rectangle.set_fill_color(graphics::Color::rgb(int, int, 255));
                rectangle.set_size(system::Vector2f::new(bar - 1.0, b * half));
                rectangle.set_position(system::Vector2f::new(i as f32 * bar, HEIGHT as f32 - b * half));
                window.draw(&rectangle);
            }

            // Waveform in the upper half
            let step = WIDTH as f32 / info.waveform.len() as f32;
            rectangle.set_fill_color(graphics::Color::GREEN);
            rectangle.set_size(system::Vector2f::new(step.max(1.0), 2.0));
            for (i, s) in info.waveform.iter().enumerate() {
                rectangle.set_position(system::Vector2f::new(
                    i as f32 * step,
                    half / 2.0 - s * half / 2.0,
                ));
                window.draw(&rectangle);
            }

            for (l, hit) in lit.iter_mut().zip(info.hits.iter()) {
                *l |= *hit;
            }
        });

        // Band, peak and sustained indicators
        for (i, l) in lit.iter().enumerate() {
            let color = if *l {
                graphics::Color::RED
            } else {
                graphics::Color::rgb(40, 40, 40)
            };
            rectangle.set_fill_color(color);
            rectangle.set_size(system::Vector2f::new(30.0, 30.0));
            rectangle.set_position(system::Vector2f::new(10.0 + i as f32 * 40.0, 10.0));
            window.draw(&rectangle);
        }

        window.display();
        std::thread::sleep(std::time::Duration::from_millis(10));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale() {
        assert_eq!(scale(-100.0, (-100.0, -30.0)), 0.0);
        assert_eq!(scale(-30.0, (-100.0, -30.0)), 1.0);
        assert_eq!(scale(-65.0, (-100.0, -30.0)), 0.5);
        assert_eq!(scale(f32::NEG_INFINITY, (-100.0, -30.0)), 0.0);
        assert_eq!(scale(0.0, (-100.0, -30.0)), 1.0);
    }

    #[test]
    fn test_fill_buckets() {
        let bins = (0..8).map(|i| i as f32 / 8.0).collect::<Vec<_>>();
        let mut out = [1.0; 4];

        fill_buckets(&bins, &mut out);
        assert_eq!(out, [0.125, 0.375, 0.625, 0.875]);
    }
}
