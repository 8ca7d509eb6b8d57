//! Reaction policies
//!
//! Maps trigger names to what the balloon should do about them.
use crate::balloon::Balloon;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Just note it in the log
    Log,
    Pop,
    Rise { dy: f32, grow: f32 },
    /// Pop if bigger than `limit`, rise otherwise
    PopOrRise { limit: f32, dy: f32, grow: f32 },
    Swell { factor: f32, wiggle_ms: f32 },
    /// Shake for as long as the trigger is active
    Jitter,
    Unlock,
}

impl Action {
    /// Level actions follow the trigger's current state instead of reacting to single hits
    pub fn is_level(&self) -> bool {
        match self {
            Action::Jitter => true,
            _ => false,
        }
    }

    pub fn apply(&self, name: &str, balloon: &mut Balloon, now: f32) {
        match *self {
            Action::Log => log::info!("{}", name),
            Action::Pop => balloon.pop(),
            Action::Rise { dy, grow } => balloon.rise(dy, grow),
            Action::PopOrRise { limit, dy, grow } => {
                if balloon.size > limit {
                    balloon.pop();
                } else {
                    balloon.rise(dy, grow);
                }
            }
            Action::Swell { factor, wiggle_ms } => balloon.swell(factor, wiggle_ms, now),
            Action::Jitter => balloon.set_crazy(true),
            Action::Unlock => {
                if !balloon.unlocked {
                    log::info!("Unlocked by {:?}", name);
                }
                balloon.unlocked = true;
            }
        }
    }
}

/// Action table keyed by trigger name
#[derive(Debug, Clone, Default)]
pub struct Reactions {
    actions: HashMap<String, Action>,
}

impl Reactions {
    pub fn new() -> Reactions {
        Default::default()
    }

    pub fn insert<S: Into<String>>(&mut self, name: S, action: Action) -> &mut Reactions {
        self.actions.insert(name.into(), action);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Action> {
        self.actions.get(name)
    }

    /// React to trigger `name` firing
    ///
    /// Returns false if there is no reaction for this trigger.
    pub fn fire(&self, name: &str, balloon: &mut Balloon, now: f32) -> bool {
        match self.get(name) {
            Some(action) if !action.is_level() => {
                action.apply(name, balloon, now);
                true
            }
            _ => false,
        }
    }

    /// Update level reactions of trigger `name` with its current state
    pub fn level(&self, name: &str, active: bool, balloon: &mut Balloon) {
        if let Some(Action::Jitter) = self.get(name) {
            balloon.set_crazy(active);
        }
    }
}

/// Background color for the current beat interval
///
/// Short intervals give bright, red-shifted hues; anything slower than `fastest` ms fades
/// towards black.
pub fn background(interval: Option<f64>, fastest: f64) -> [u8; 3] {
    let relative = match interval {
        Some(ms) if ms > 0.0 => (fastest / ms).max(0.0).min(1.0),
        _ => 0.0,
    } as f32;

    hsl_to_rgb(relative * 360.0, 1.0, relative * 0.8)
}

/// Convert a color from HSL (hue in degrees, saturation and lightness in 0..1) to RGB
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [u8; 3] {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = (h / 60.0) % 6.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let channel = |v: f32| ((v + m) * 255.0).round().max(0.0).min(255.0) as u8;
    [channel(r), channel(g), channel(b)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balloon::{Color, ORIGINAL_SIZE};

    fn table() -> Reactions {
        let mut reactions = Reactions::new();
        reactions
            .insert("pop", Action::Pop)
            .insert(
                "high",
                Action::PopOrRise {
                    limit: 100.0,
                    dy: 8.0,
                    grow: 3.0,
                },
            )
            .insert("sustained", Action::Jitter)
            .insert("unlock", Action::Unlock);
        reactions
    }

    #[test]
    fn test_fire() {
        let reactions = table();
        let mut b = Balloon::new((0.0, 0.0));

        assert!(reactions.fire("high", &mut b, 0.0));
        assert_eq!(b.size, ORIGINAL_SIZE + 3.0);
        assert_eq!(b.y, -8.0);

        assert!(!reactions.fire("nothing", &mut b, 0.0));
        assert!(!reactions.fire("sustained", &mut b, 0.0));
        assert!(!b.is_crazy());

        assert!(reactions.fire("pop", &mut b, 0.0));
        assert_eq!(b.color, Color::Red);
    }

    #[test]
    fn test_pop_or_rise() {
        let reactions = table();
        let mut b = Balloon::new((0.0, 0.0));
        b.size = 101.0;

        reactions.fire("high", &mut b, 0.0);
        assert!(!b.is_idle());
        assert_eq!(b.size, 101.0);
    }

    #[test]
    fn test_level() {
        let reactions = table();
        let mut b = Balloon::new((0.0, 0.0));

        reactions.level("sustained", true, &mut b);
        assert!(b.is_crazy());
        reactions.level("pop", false, &mut b);
        assert!(b.is_crazy());
        reactions.level("sustained", false, &mut b);
        assert!(!b.is_crazy());
    }

    #[test]
    fn test_unlock() {
        let reactions = table();
        let mut b = Balloon::new((0.0, 0.0));

        reactions.fire("unlock", &mut b, 0.0);
        reactions.fire("unlock", &mut b, 0.0);
        assert!(b.unlocked);
    }

    #[test]
    fn test_hsl() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), [255, 0, 0]);
        assert_eq!(hsl_to_rgb(120.0, 1.0, 0.5), [0, 255, 0]);
        assert_eq!(hsl_to_rgb(240.0, 1.0, 0.5), [0, 0, 255]);
        assert_eq!(hsl_to_rgb(200.0, 1.0, 0.0), [0, 0, 0]);
        assert_eq!(hsl_to_rgb(360.0, 1.0, 0.8), hsl_to_rgb(0.0, 1.0, 0.8));
    }

    #[test]
    fn test_background() {
        assert_eq!(background(None, 300.0), [0, 0, 0]);
        assert_eq!(background(Some(3000.0), 300.0), hsl_to_rgb(36.0, 1.0, 0.08));
        // Anything faster than the limit is clamped
        assert_eq!(background(Some(150.0), 300.0), background(Some(300.0), 300.0));
    }
}
