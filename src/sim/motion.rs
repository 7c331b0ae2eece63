//! Forward speed and lateral steering
//!
//! The controller owns the authoritative forward speed. Exactly one writer
//! holds it at a time (see [`SpeedAuthority`]): the acceleration integrator
//! during normal driving, or the active hazard episode while control is
//! suspended.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::approach;
use crate::error::ConfigError;
use crate::settings::MotionConfig;

/// Logical driving actions (already mapped from device keys)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Forward,
    Left,
    Right,
}

/// A logical key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEvent {
    Down(Action),
    Up(Action),
}

/// Who may write the speed fields right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpeedAuthority {
    /// Normal driving: the acceleration integrator
    #[default]
    Integrator,
    /// Control suspended: the active hazard episode
    Episode,
}

/// Vehicle kinematic state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleState {
    /// Forward speed, always in [0, max_speed]
    pub forward_speed: f32,
    /// Speed actually applied along the forward axis
    pub vertical_speed_smoothed: f32,
    /// x = lateral, y = distance travelled forward
    pub position: Vec2,
    pub authority: SpeedAuthority,
    pub moving_forward: bool,
    pub moving_left: bool,
    pub moving_right: bool,
}

impl VehicleState {
    #[inline]
    pub fn lateral_position(&self) -> f32 {
        self.position.x
    }

    #[inline]
    pub fn control_enabled(&self) -> bool {
        self.authority == SpeedAuthority::Integrator
    }
}

#[derive(Debug, Clone)]
pub struct MotionController {
    config: MotionConfig,
    state: VehicleState,
}

impl MotionController {
    pub fn new(config: MotionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            state: VehicleState::default(),
        })
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    #[inline]
    pub fn forward_speed(&self) -> f32 {
        self.state.forward_speed
    }

    #[inline]
    pub fn vertical_speed(&self) -> f32 {
        self.state.vertical_speed_smoothed
    }

    #[inline]
    pub fn max_speed(&self) -> f32 {
        self.config.max_speed
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.state.position
    }

    /// Current forward speed divided by the cap
    #[inline]
    pub fn speed_ratio(&self) -> f32 {
        self.state.forward_speed / self.config.max_speed
    }

    #[inline]
    pub fn authority(&self) -> SpeedAuthority {
        self.state.authority
    }

    #[inline]
    pub fn control_enabled(&self) -> bool {
        self.state.control_enabled()
    }

    /// Place the vehicle (spawn point, tests)
    pub fn set_position(&mut self, position: Vec2) {
        self.state.position = position;
    }

    /// Apply a logical key transition. Latches are idempotent; key-downs
    /// are dropped while control is suspended, key-ups always land.
    pub fn handle_key(&mut self, event: KeyEvent) {
        match event {
            KeyEvent::Down(action) => {
                if !self.control_enabled() {
                    return;
                }
                *self.latch_mut(action) = true;
            }
            KeyEvent::Up(action) => *self.latch_mut(action) = false,
        }
    }

    fn latch_mut(&mut self, action: Action) -> &mut bool {
        match action {
            Action::Forward => &mut self.state.moving_forward,
            Action::Left => &mut self.state.moving_left,
            Action::Right => &mut self.state.moving_right,
        }
    }

    /// Advance the vehicle by one frame
    pub fn tick(&mut self, dt: f32) {
        if self.control_enabled() {
            self.integrate_speed(dt);
            self.smooth_vertical_speed(dt);
        }

        let direction = self.horizontal_direction();
        self.state.position.x += direction * self.config.horizontal_speed * dt;
        self.state.position.y += self.state.vertical_speed_smoothed * dt;
    }

    fn integrate_speed(&mut self, dt: f32) {
        let speed = if self.state.moving_forward {
            self.state.forward_speed + self.config.acceleration * dt
        } else {
            self.state.forward_speed - self.config.deceleration * dt
        };
        self.state.forward_speed = speed.clamp(0.0, self.config.max_speed);
    }

    /// Steering direction in {-1, 0, +1}. Left wins over Right; at the hard
    /// limit only movement back toward center is allowed.
    pub fn horizontal_direction(&self) -> f32 {
        let direction = if self.state.moving_left {
            -1.0
        } else if self.state.moving_right {
            1.0
        } else {
            0.0
        };

        let x = self.state.lateral_position();
        let hard = self.config.horizontal_hard_limit;
        if (x <= -hard && direction < 0.0) || (x >= hard && direction > 0.0) {
            return 0.0;
        }
        direction
    }

    /// Vertical rate the smoothing step is heading for
    pub fn target_vertical_speed(&self) -> f32 {
        let speed = self.state.forward_speed;
        if self.state.lateral_position().abs() > self.config.horizontal_limit {
            speed.min(self.config.slow_vertical_speed)
        } else {
            speed
        }
    }

    fn smooth_vertical_speed(&mut self, dt: f32) {
        let target = self.target_vertical_speed();
        self.state.vertical_speed_smoothed = approach(
            self.state.vertical_speed_smoothed,
            target,
            self.config.slow_down_rate * dt,
        );
    }

    /// Multiply both speed fields by `ratio`, keeping each in [0, max_speed]
    pub fn scale_speed(&mut self, ratio: f32) {
        let max = self.config.max_speed;
        self.state.forward_speed = (self.state.forward_speed * ratio).clamp(0.0, max);
        self.state.vertical_speed_smoothed =
            (self.state.vertical_speed_smoothed * ratio).clamp(0.0, max);
        log::debug!("Speed scaled by {ratio}: {:.2}", self.state.forward_speed);
    }

    /// Hard-set both speed fields
    pub fn set_speed(&mut self, speed: f32) {
        let speed = speed.clamp(0.0, self.config.max_speed);
        self.state.forward_speed = speed;
        self.state.vertical_speed_smoothed = speed;
        log::debug!("Speed set to {speed}");
    }

    /// Hand speed ownership back to the integrator, or take it away.
    /// Disabling drops every latch so stale input cannot resume motion
    /// the moment control returns.
    pub fn set_control_enabled(&mut self, enabled: bool) {
        if enabled {
            self.state.authority = SpeedAuthority::Integrator;
        } else {
            self.state.authority = SpeedAuthority::Episode;
            self.state.moving_forward = false;
            self.state.moving_left = false;
            self.state.moving_right = false;
        }
        log::debug!("Control {}", if enabled { "enabled" } else { "disabled" });
    }
}
