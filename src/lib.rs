//! Lane Runner - locomotion core for a lane-based endless runner
//!
//! Core modules:
//! - `sim`: Per-tick simulation (motion, hazard response, obstacle spawning)
//! - `settings`: Authored tuning constants, loaded from JSON
//! - `error`: Configuration errors raised at setup

pub mod error;
pub mod settings;
pub mod sim;

pub use error::ConfigError;
pub use settings::{ImpactConfig, MotionConfig, Settings, SpawnConfig};

/// Simulation timing constants
pub mod consts {
    /// Fixed simulation timestep used by the headless driver (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the driver will feed into the accumulator
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Relative slack when comparing summed frame deltas against a duration
    pub const TIME_TOLERANCE: f32 = 1e-4;
}

/// True once `elapsed` has reached `duration`, allowing for the rounding
/// error that builds up when summing many f32 frame deltas
#[inline]
pub fn time_reached(elapsed: f32, duration: f32) -> bool {
    elapsed + duration.abs() * consts::TIME_TOLERANCE >= duration
}

/// Move `current` toward `target` by at most `max_delta`, never overshooting
#[inline]
pub fn approach(current: f32, target: f32, max_delta: f32) -> f32 {
    let max_delta = max_delta.max(0.0);
    let delta = (target - current).clamp(-max_delta, max_delta);
    current + delta
}

/// Replace a malformed frame delta (NaN, infinite, negative) with zero
#[inline]
pub fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt >= 0.0 {
        dt
    } else {
        log::warn!("Ignoring malformed frame delta {dt}");
        0.0
    }
}
