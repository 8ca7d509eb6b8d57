use std::time;

/// Seconds elapsed since `start`
pub fn time(start: time::Instant) -> f32 {
    let elapsed = time::Instant::now() - start;

    elapsed.as_secs() as f32 + elapsed.subsec_nanos() as f32 * 1e-9
}

/// Milliseconds elapsed since `start`
pub fn millis(start: time::Instant) -> f64 {
    let elapsed = time::Instant::now() - start;

    elapsed.as_secs() as f64 * 1e3 + elapsed.subsec_nanos() as f64 * 1e-6
}
