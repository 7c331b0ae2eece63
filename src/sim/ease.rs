//! Easing curves and per-tick tweens
//!
//! Tweens here never block or schedule callbacks: the owner advances them
//! once per tick and checks `finished()`.

use serde::{Deserialize, Serialize};

use crate::time_reached;

/// Quadratic ease-out: fast start, decelerating finish
#[inline]
pub fn quad_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * (2.0 - t)
}

/// Interpolation from `from` to `to` over `duration` seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    pub duration: f32,
    pub elapsed: f32,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: f32) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0.0,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt;
    }

    /// Normalized progress in [0, 1]. A zero-length tween is already done.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).min(1.0)
        }
    }

    pub fn finished(&self) -> bool {
        time_reached(self.elapsed, self.duration)
    }

    /// Current value along the quad-out curve
    pub fn value(&self) -> f32 {
        self.from + (self.to - self.from) * quad_out(self.progress())
    }
}
