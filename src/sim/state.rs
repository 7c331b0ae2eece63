//! World state and simulation events
//!
//! The world owns every component and wires them together per call;
//! nothing looks its collaborators up by name.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::{CollisionResponseCoordinator, ObjectRef, Orientation};
use super::motion::{MotionController, VehicleState};
use super::spawn::{ObstacleHandle, SpawnScheduler, SpawnTimer};
use crate::error::ConfigError;
use crate::settings::Settings;

/// Things that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    BarrierHit { object: ObjectRef },
    WaterSplash { object: ObjectRef, speed: f32 },
    HoleEntered { object: ObjectRef },
    HoleRecovered,
    ObstacleSpawned {
        handle: ObstacleHandle,
        template: String,
        position: Vec3,
    },
}

/// Visual model of the vehicle; only its rotation (degrees) matters here
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleModel {
    pub rotation: f32,
}

impl Orientation for VehicleModel {
    fn rotation(&self) -> f32 {
        self.rotation
    }

    fn set_rotation(&mut self, degrees: f32) {
        self.rotation = degrees;
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct World {
    pub motion: MotionController,
    pub collision: CollisionResponseCoordinator,
    pub spawn: SpawnScheduler,
    /// `None` runs the simulation without a model to spin
    pub model: Option<VehicleModel>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Simulated seconds
    pub time_secs: f32,
    /// Events since the last drain
    pub events: Vec<SimEvent>,
}

impl World {
    pub fn new(settings: &Settings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            motion: MotionController::new(settings.motion.clone())?,
            collision: CollisionResponseCoordinator::new(settings.impact.clone())?,
            spawn: SpawnScheduler::new(settings.spawn.clone(), settings.seed)?,
            model: Some(VehicleModel::default()),
            time_ticks: 0,
            time_secs: 0.0,
            events: Vec::new(),
        })
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            time_ticks: self.time_ticks,
            time_secs: self.time_secs,
            vehicle: self.motion.state().clone(),
            model: self.model,
            hole_active: self.collision.is_active(),
            spawn_timer: self.spawn.timer().clone(),
            spawned: self.spawn.spawned().to_vec(),
        }
    }
}

/// Read-only dump of the world for logs and debugging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub time_ticks: u64,
    pub time_secs: f32,
    pub vehicle: VehicleState,
    pub model: Option<VehicleModel>,
    pub hole_active: bool,
    pub spawn_timer: SpawnTimer,
    pub spawned: Vec<ObstacleHandle>,
}
