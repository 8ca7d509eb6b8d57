use pop_core::analyzer;

#[derive(Debug, Clone)]
struct VisInfo {
    pulses: u64,
    interval: Option<f64>,
    average: Option<f64>,
    bpm: f64,
}

fn detector() -> analyzer::Detector {
    let kind = pop_core::CONFIG.get_or("meter.detector", "sustained".to_string());

    match &*kind {
        "peak" => analyzer::Detector::Peak {
            threshold: pop_core::CONFIG.get_or("meter.peak", 0.9),
        },
        "sustained" => analyzer::Detector::Sustained {
            threshold: pop_core::CONFIG.get_or("meter.sustained", 0.3),
        },
        "band" => analyzer::Detector::Band {
            low: pop_core::CONFIG.get_or("meter.band.low", 0.0),
            high: pop_core::CONFIG.get_or("meter.band.high", 80.0),
            threshold: pop_core::CONFIG.get_or("meter.band.threshold", -70.0),
        },
        _ => panic!("Unknown detector {:?}!", kind),
    }
}

fn readout(interval: Option<f64>, bpm: f64) -> String {
    match interval {
        Some(ms) => format!("{:5} ms. {:3} bpm.", ms as u64, bpm as u64),
        None => format!("{:>5} ms. {:3} bpm.", "-", 0),
    }
}

fn main() {
    pop_core::default_config();
    pop_core::default_log();

    let mut fourier = analyzer::FourierBuilder::new().plan();
    let mut meter = analyzer::IntervalBuilder::new().build();
    log::info!("Ignoring pulses closer than {} ms", meter.min_interval());

    let mut triggers = analyzer::Triggers::new();
    triggers.push(analyzer::Trigger::new("pulse", detector()).gated());

    let display_ms: f32 = pop_core::CONFIG.get_or("meter.display_ms", 300.0);
    let display_interval = display_ms / 1000.0;

    let mut frames = pop_core::Visualizer::new(
        VisInfo {
            pulses: 0,
            interval: None,
            average: None,
            bpm: 0.0,
        },
        move |info, samples| {
            let snapshot = fourier.analyze(samples);

            if !triggers.evaluate(snapshot, &mut meter).is_empty() {
                info.pulses += 1;
            }
            info.interval = meter.calculate();
            info.average = meter.average();
            info.bpm = meter.bpm();

            info
        },
    )
    .frames();

    let mut last_pulses = 0;
    let mut last_display = 0.0;

    for frame in frames.iter() {
        log::trace!("Frame: {:7}@{:.3}", frame.frame, frame.time);

        frame.lock_info(|info| {
            if info.pulses != last_pulses {
                println!("Pulse@{:.3}: #{}", frame.time, info.pulses);
                last_pulses = info.pulses;
            }

            if frame.time - last_display >= display_interval {
                last_display = frame.time;

                match info.average {
                    Some(avg) => println!("{} (avg {:.0} ms)", readout(info.interval, info.bpm), avg),
                    None => println!("{}", readout(info.interval, info.bpm)),
                }
            }
        });

        std::thread::sleep(std::time::Duration::from_millis(16));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readout() {
        assert_eq!(readout(Some(500.0), 120.0), "  500 ms. 120 bpm.");
        assert_eq!(readout(Some(1234.7), 48.0), " 1234 ms.  48 bpm.");
        assert_eq!(readout(None, 0.0), "    - ms.   0 bpm.");
    }
}
