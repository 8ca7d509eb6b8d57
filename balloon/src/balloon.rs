//! Balloon presentation state
//!
//! Everything here is driven by explicit calls from the frame loop; the balloon never looks at
//! audio data itself.
use rand::Rng;

/// Radius of a fresh balloon
pub const ORIGINAL_SIZE: f32 = 25.0;
/// Radius at which the balloon overflows and starts over
pub const OVERFLOW_SIZE: f32 = 600.0;
/// Seconds a popped balloon stays gone
pub const RESPAWN_DELAY: f32 = 1.0;
/// Shrink factor growth per step while popping
pub const POP_ACCELERATION: f32 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    Green,
    Red,
    Blue,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Idle,
    Popping { speed: f32 },
    Deflated { since: f32 },
}

#[derive(Debug, Clone)]
pub struct Balloon {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: Color,
    pub phase: Phase,

    /// Set once the balloon overflowed
    pub backdrop: bool,
    /// Set once the unlock chord was played
    pub unlocked: bool,

    home: (f32, f32),
    crazy: bool,
    movement: f32,
    wiggle_until: f32,
}

impl Balloon {
    /// Create a balloon resting at `home`
    pub fn new(home: (f32, f32)) -> Balloon {
        Balloon {
            x: home.0,
            y: home.1,
            size: ORIGINAL_SIZE,
            color: Color::Green,
            phase: Phase::Idle,

            backdrop: false,
            unlocked: false,

            home,
            crazy: false,
            movement: 20.0,
            wiggle_until: 0.0,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// Move back to the resting position
    pub fn recenter(&mut self) {
        self.x = self.home.0;
        self.y = self.home.1;
    }

    /// Start popping
    ///
    /// Has no effect unless the balloon is idle.
    pub fn pop(&mut self) {
        if self.is_idle() && self.size > 0.0 {
            log::debug!("Pop at size {:.1}", self.size);

            self.color = Color::Red;
            self.phase = Phase::Popping { speed: 1.0 };
        }
    }

    /// Float upwards by `dy` while growing by `grow`
    pub fn rise(&mut self, dy: f32, grow: f32) {
        if self.is_idle() {
            self.y -= dy;
            self.size += grow;
        }
    }

    /// Grow by `factor` and wiggle for a while, shorter the bigger the balloon already is
    pub fn swell(&mut self, factor: f32, wiggle_ms: f32, now: f32) {
        if self.is_idle() {
            self.color = Color::Blue;
            self.size *= factor;

            let wiggle = (wiggle_ms - self.size * 7.0).max(0.0);
            self.wiggle_until = now + wiggle / 1000.0;
        }
    }

    /// Shake around the resting position while set
    pub fn set_crazy(&mut self, crazy: bool) {
        self.crazy = crazy;
    }

    pub fn is_crazy(&self) -> bool {
        self.crazy
    }

    pub fn is_wiggling(&self, now: f32) -> bool {
        now < self.wiggle_until
    }

    /// Drift sideways with the beat
    ///
    /// Slow beats push right, fast beats push left, implausible ones do nothing.
    pub fn drift(&mut self, bpm: f64, step: f32) {
        if bpm <= 0.0 || bpm > 200.0 {
            return;
        }

        if bpm < 100.0 {
            self.x += step;
        } else {
            self.x -= step;
        }
    }

    /// Advance animations to `now` (seconds)
    pub fn step<G: Rng>(&mut self, now: f32, rng: &mut G) {
        match self.phase {
            Phase::Popping { speed } => {
                self.size -= speed;

                if self.size <= 0.0 {
                    self.size = 0.0;
                    self.color = Color::Green;
                    self.phase = Phase::Deflated { since: now };
                } else {
                    self.phase = Phase::Popping {
                        speed: speed * POP_ACCELERATION,
                    };
                }
            }
            Phase::Deflated { since } => {
                if now - since >= RESPAWN_DELAY {
                    log::debug!("Respawning balloon");

                    self.size = ORIGINAL_SIZE;
                    self.phase = Phase::Idle;
                    self.recenter();
                }
            }
            Phase::Idle => {
                if self.size > OVERFLOW_SIZE {
                    log::info!("Balloon overflowed");

                    self.backdrop = true;
                    self.size = ORIGINAL_SIZE;
                    self.recenter();
                }

                if self.crazy {
                    self.recenter();
                    self.x += rng.gen::<f32>() * self.movement;
                    self.y += rng.gen::<f32>() * self.movement;
                    self.color = Color::Red;
                } else if self.is_wiggling(now) {
                    let distance = rng.gen::<f32>() * 10.0;
                    let dx = rng.gen::<f32>() * distance;
                    let dy = rng.gen::<f32>() * distance;

                    if rng.gen_bool(0.5) {
                        self.x -= dx;
                        self.y -= dy;
                    } else {
                        self.x += dx;
                        self.y += dy;
                    }
                } else {
                    self.color = Color::Green;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> rand::rngs::StdRng {
        rand::rngs::StdRng::seed_from_u64(35)
    }

    #[test]
    fn test_pop_cycle() {
        let mut rng = rng();
        let mut b = Balloon::new((400.0, 300.0));
        b.x = 10.0;

        b.pop();
        assert_eq!(b.color, Color::Red);
        assert_eq!(b.phase, Phase::Popping { speed: 1.0 });

        let mut steps = 0;
        while !matches!(b.phase, Phase::Deflated { .. }) {
            b.step(0.0, &mut rng);
            steps += 1;
            assert!(steps < 100, "Balloon never deflated");
        }
        assert_eq!(b.size, 0.0);
        assert_eq!(b.color, Color::Green);

        // Accelerating: far fewer steps than the original radius
        assert!(steps < 15, "{} steps", steps);

        b.step(0.5, &mut rng);
        assert_eq!(b.size, 0.0);

        b.step(1.0, &mut rng);
        assert!(b.is_idle());
        assert_eq!(b.size, ORIGINAL_SIZE);
        assert_eq!((b.x, b.y), (400.0, 300.0));
    }

    #[test]
    fn test_busy_ignores_input() {
        let mut b = Balloon::new((0.0, 0.0));

        b.pop();
        b.rise(8.0, 3.0);
        b.swell(2.0, 1000.0, 0.0);
        assert_eq!(b.size, ORIGINAL_SIZE);
        assert_eq!(b.y, 0.0);
        assert_eq!(b.color, Color::Red);
    }

    #[test]
    fn test_overflow() {
        let mut rng = rng();
        let mut b = Balloon::new((100.0, 100.0));

        b.rise(50.0, OVERFLOW_SIZE - ORIGINAL_SIZE);
        b.step(0.0, &mut rng);
        assert!(!b.backdrop);

        b.rise(50.0, 1.0);
        b.step(0.0, &mut rng);
        assert!(b.backdrop);
        assert_eq!(b.size, ORIGINAL_SIZE);
        assert_eq!((b.x, b.y), (100.0, 100.0));
    }

    #[test]
    fn test_swell() {
        let mut rng = rng();
        let mut b = Balloon::new((0.0, 0.0));

        b.swell(1.2, 1000.0, 2.0);
        assert!((b.size - 30.0).abs() < 1e-4);
        assert_eq!(b.color, Color::Blue);
        assert!(b.is_wiggling(2.5));
        assert!(!b.is_wiggling(2.8));

        b.step(2.1, &mut rng);
        assert_eq!(b.color, Color::Blue);
        b.step(3.0, &mut rng);
        assert_eq!(b.color, Color::Green);
    }

    #[test]
    fn test_crazy() {
        let mut rng = rng();
        let mut b = Balloon::new((50.0, 50.0));

        b.set_crazy(true);
        for _ in 0..20 {
            b.step(0.0, &mut rng);
            assert_eq!(b.color, Color::Red);
            assert!(b.x >= 50.0 && b.x < 70.0);
            assert!(b.y >= 50.0 && b.y < 70.0);
        }

        b.set_crazy(false);
        b.step(0.0, &mut rng);
        assert_eq!(b.color, Color::Green);
    }

    #[test]
    fn test_drift() {
        let mut b = Balloon::new((0.0, 0.0));

        b.drift(0.0, 10.0);
        b.drift(240.0, 10.0);
        assert_eq!(b.x, 0.0);

        b.drift(80.0, 10.0);
        assert_eq!(b.x, 10.0);

        b.drift(150.0, 10.0);
        b.drift(200.0, 10.0);
        assert_eq!(b.x, -10.0);
    }
}
