mod balloon;
mod reaction;

use pop_core::analyzer;
use sfml::{graphics, system};

use crate::balloon::Balloon;
use crate::reaction::{Action, Reactions};

#[derive(Debug, Clone)]
pub struct VisInfo {
    /// Number of times each trigger fired
    fired: Vec<u64>,
    /// Whether each trigger fired on the latest analysis
    active: Vec<bool>,
    interval: Option<f64>,
    bpm: f64,
}

fn triggers() -> (analyzer::Triggers, Reactions) {
    use analyzer::{Detector, Trigger};

    let key_gain = pop_core::CONFIG.get_or("balloon.key_gain", -45.0);
    let chord_gain = pop_core::CONFIG.get_or("balloon.chord_gain", -55.0);

    let mut triggers = analyzer::Triggers::new();
    let mut reactions = Reactions::new();

    triggers
        .push(
            Trigger::new(
                "low",
                Detector::Bin {
                    index: pop_core::CONFIG.get_or("balloon.bins.low", 17),
                    threshold: key_gain,
                },
            )
            .gated(),
        )
        .push(
            Trigger::new(
                "pop",
                Detector::Bin {
                    index: pop_core::CONFIG.get_or("balloon.bins.pop", 30),
                    threshold: key_gain,
                },
            )
            .gated(),
        )
        .push(
            Trigger::new(
                "high",
                Detector::Bin {
                    index: pop_core::CONFIG.get_or("balloon.bins.high", 23),
                    threshold: key_gain,
                },
            )
            .gated(),
        )
        .push(
            Trigger::new(
                "unlock",
                Detector::Chord {
                    bins: vec![
                        pop_core::CONFIG.get_or("balloon.bins.key_a", 13),
                        pop_core::CONFIG.get_or("balloon.bins.key_b", 17),
                    ],
                    threshold: chord_gain,
                },
            )
            .gated(),
        )
        .push(Trigger::new(
            "bass",
            Detector::Band {
                low: 0.0,
                high: pop_core::CONFIG.get_or("balloon.bass", 80.0),
                threshold: pop_core::CONFIG.get_or("balloon.bass_gain", -70.0),
            },
        ))
        .push(Trigger::new(
            "peak",
            Detector::Peak {
                threshold: pop_core::CONFIG.get_or("balloon.peak", 0.9),
            },
        ))
        .push(Trigger::new(
            "sustained",
            Detector::Sustained {
                threshold: pop_core::CONFIG.get_or("balloon.sustained", 0.3),
            },
        ));

    reactions
        .insert("low", Action::Log)
        .insert("pop", Action::Pop)
        .insert(
            "high",
            Action::PopOrRise {
                limit: 100.0,
                dy: 8.0,
                grow: 3.0,
            },
        )
        .insert("unlock", Action::Unlock)
        .insert("bass", Action::Log)
        .insert(
            "peak",
            Action::Swell {
                factor: 1.2,
                wiggle_ms: 1000.0,
            },
        )
        .insert("sustained", Action::Jitter);

    (triggers, reactions)
}

fn color(c: balloon::Color) -> graphics::Color {
    match c {
        balloon::Color::Green => graphics::Color::rgb(0, 255, 0),
        balloon::Color::Red => graphics::Color::rgb(255, 0, 0),
        balloon::Color::Blue => graphics::Color::rgb(0, 0, 255),
    }
}

fn main() {
    use sfml::graphics::{RenderTarget, Shape, Transformable};

    pop_core::default_config();
    pop_core::default_log();

    // Config {{{
    let window_width: u32 = pop_core::CONFIG.get_or("window.width", 1280);
    let window_height: u32 = pop_core::CONFIG.get_or("window.height", 720);
    let display_interval: f32 = pop_core::CONFIG.get_or("balloon.display_ms", 300.0);
    let fastest: f64 = pop_core::CONFIG.get_or("balloon.fastest_ms", 300.0);
    let drift: f32 = pop_core::CONFIG.get_or("balloon.drift", 10.0);
    // }}}

    let (triggers, reactions) = triggers();
    let names = triggers.iter().map(|t| t.name.clone()).collect::<Vec<_>>();

    // Analyzer {{{
    let mut frames = {
        let mut fourier = analyzer::FourierBuilder::new().plan();
        let mut meter = analyzer::IntervalBuilder::new().build();
        let num = triggers.len();

        pop_core::Visualizer::new(
            VisInfo {
                fired: vec![0; num],
                active: vec![false; num],
                interval: None,
                bpm: 0.0,
            },
            move |info, samples| {
                let snapshot = fourier.analyze(samples);

                for a in info.active.iter_mut() {
                    *a = false;
                }
                for i in triggers.evaluate(snapshot, &mut meter) {
                    info.fired[i] += 1;
                    info.active[i] = true;
                }
                info.interval = meter.calculate();
                info.bpm = meter.bpm();

                info
            },
        )
        .async_analyzer(pop_core::CONFIG.get_or("balloon.analyzer_rate", 0))
        .frames()
    };
    // }}}

    // Window Initialization {{{
    let mut window = graphics::RenderWindow::new(
        (window_width, window_height),
        "Popper - Balloon",
        sfml::window::Style::CLOSE,
        &Default::default(),
    );
    window.set_vertical_sync_enabled(true);
    // }}}

    let mut rng = rand::thread_rng();
    let mut balloon = Balloon::new((window_width as f32 / 2.0, window_height as f32 / 2.0));
    let mut seen = vec![0; names.len()];
    let mut background = [0, 0, 0];
    let mut last_display = 0.0;

    let mut circle = graphics::CircleShape::new(balloon.size, 60);
    let mut backdrop = graphics::RectangleShape::with_size(system::Vector2f::new(
        window_width as f32,
        window_height as f32,
    ));
    backdrop.set_fill_color(graphics::Color::rgba(0, 255, 0, 50));

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
                    log::info!("Reset");
                    balloon = Balloon::new((window_width as f32 / 2.0, window_height as f32 / 2.0));
                }
                _ => (),
            }
        }

        frame.lock_info(|info| {
            for (i, name) in names.iter().enumerate() {
                if info.fired[i] != seen[i] {
                    seen[i] = info.fired[i];
                    reactions.fire(name, &mut balloon, frame.time);
                }
                reactions.level(name, info.active[i], &mut balloon);
            }

            if (frame.time - last_display) * 1000.0 >= display_interval {
                last_display = frame.time;

                log::debug!("Interval: {:?} ms, {} bpm", info.interval, info.bpm);
                balloon.drift(info.bpm, drift);
                background = reaction::background(info.interval, fastest);
            }
        });

        balloon.step(frame.time, &mut rng);

        window.clear(graphics::Color::rgb(background[0], background[1], background[2]));
        if balloon.backdrop {
            window.draw(&backdrop);
        }

        circle.set_radius(balloon.size);
        circle.set_origin(system::Vector2f::new(balloon.size, balloon.size));
        circle.set_position(system::Vector2f::new(balloon.x, balloon.y));
        circle.set_fill_color(color(balloon.color));
        if balloon.unlocked {
            circle.set_outline_thickness(4.0);
            circle.set_outline_color(graphics::Color::YELLOW);
        } else {
            circle.set_outline_thickness(0.0);
        }
        window.draw(&circle);

        window.display();
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
}
