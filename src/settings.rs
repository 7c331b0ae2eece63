//! Authored tuning constants
//!
//! Every number the simulation reads is authored here, never computed.
//! Loaded from JSON (missing fields fall back to defaults) and validated
//! before any component is built.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::{HazardKind, ObstacleTemplate};

/// Forward speed and steering
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Forward speed cap (units/s)
    pub max_speed: f32,
    /// Speed gained per second while Forward is held
    pub acceleration: f32,
    /// Speed lost per second while Forward is released
    pub deceleration: f32,
    /// Lateral speed while steering (units/s)
    pub horizontal_speed: f32,
    /// Soft limit: beyond it the vertical rate is capped
    pub horizontal_limit: f32,
    /// Hard limit: beyond it steering away from center is blocked
    pub horizontal_hard_limit: f32,
    /// Vertical rate cap while past the soft limit
    pub slow_vertical_speed: f32,
    /// How fast the vertical rate ramps toward its target (units/s²)
    pub slow_down_rate: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            max_speed: 16.0,
            acceleration: 10.0,
            deceleration: 9.0,
            horizontal_speed: 8.0,
            horizontal_limit: 3.5,
            horizontal_hard_limit: 7.0,
            slow_vertical_speed: 2.0,
            slow_down_rate: 16.0,
        }
    }
}

/// Hazard response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactConfig {
    /// Spin rate while falling into a hole (degrees/s)
    pub hole_spin_speed: f32,
    /// Length of a hole episode (seconds)
    pub hole_slow_down_duration: f32,
    /// Instant speed multiplier applied on hole entry
    pub hole_entry_penalty: f32,
    /// Fraction of the entry speed left just before the final hard stop
    pub hole_speed_residual: f32,
    /// Instant speed multiplier applied on water contact
    pub water_penalty: f32,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            hole_spin_speed: 180.0,
            hole_slow_down_duration: 2.0,
            hole_entry_penalty: 0.8,
            // 0.95 per frame for two seconds at 60 Hz
            hole_speed_residual: 0.002,
            water_penalty: 0.5,
        }
    }
}

/// Obstacle spawning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Speed ratio (0-1) at or above which spawning runs
    pub threshold: f32,
    /// Seconds between spawns while armed
    pub interval: f32,
    /// Distance ahead of the vehicle where obstacles appear
    pub ahead_distance: f32,
    /// Obstacle templates, drawn uniformly
    pub templates: Vec<ObstacleTemplate>,
    /// Anchor positions (x lateral, z depth), drawn uniformly
    pub anchors: Vec<Vec3>,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            threshold: 0.7,
            interval: 1.5,
            ahead_distance: 20.0,
            templates: vec![
                ObstacleTemplate::new("RoadBlock_Barrier", HazardKind::Barrier),
                ObstacleTemplate::new("RoadBlock_Hole", HazardKind::Hole),
                ObstacleTemplate::new("RoadBlock_Water", HazardKind::Water),
            ],
            anchors: vec![
                Vec3::new(-3.5, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(3.5, 0.0, 0.0),
            ],
        }
    }
}

/// Full simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seed for the spawn RNG
    pub seed: u64,
    pub motion: MotionConfig,
    pub impact: ImpactConfig,
    pub spawn: SpawnConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            motion: MotionConfig::default(),
            impact: ImpactConfig::default(),
            spawn: SpawnConfig::default(),
        }
    }
}

fn finite(field: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::invalid(field, value, "must be finite"))
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if finite(field, value)? > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, value, "must be greater than zero"))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if finite(field, value)? >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, value, "must not be negative"))
    }
}

fn ratio(field: &'static str, value: f32) -> Result<(), ConfigError> {
    let value = finite(field, value)?;
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, value, "must be in (0, 1]"))
    }
}

impl MotionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("max_speed", self.max_speed)?;
        positive("horizontal_hard_limit", self.horizontal_hard_limit)?;
        non_negative("acceleration", self.acceleration)?;
        non_negative("deceleration", self.deceleration)?;
        non_negative("horizontal_speed", self.horizontal_speed)?;
        non_negative("horizontal_limit", self.horizontal_limit)?;
        non_negative("slow_vertical_speed", self.slow_vertical_speed)?;
        non_negative("slow_down_rate", self.slow_down_rate)?;
        Ok(())
    }
}

impl ImpactConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("hole_spin_speed", self.hole_spin_speed)?;
        non_negative("hole_slow_down_duration", self.hole_slow_down_duration)?;
        ratio("hole_entry_penalty", self.hole_entry_penalty)?;
        ratio("hole_speed_residual", self.hole_speed_residual)?;
        ratio("water_penalty", self.water_penalty)?;
        Ok(())
    }
}

impl SpawnConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = finite("spawn.threshold", self.threshold)?;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::invalid(
                "spawn.threshold",
                threshold,
                "must be in [0, 1]",
            ));
        }
        positive("spawn.interval", self.interval)?;
        non_negative("spawn.ahead_distance", self.ahead_distance)?;
        Ok(())
    }
}

impl Settings {
    /// Check every authored bound; any violation is fatal at setup
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.motion.validate()?;
        self.impact.validate()?;
        self.spawn.validate()
    }

    /// Parse and validate settings from a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}
