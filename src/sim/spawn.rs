//! Speed-gated obstacle spawning
//!
//! The scheduler only reads the motion controller. While the speed ratio
//! sits at or above the threshold a repeating timer runs; each expiry
//! places one random obstacle at a random anchor ahead of the vehicle.
//! Dropping below the threshold discards the partial interval.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::HazardKind;
use super::motion::MotionController;
use crate::error::ConfigError;
use crate::settings::SpawnConfig;
use crate::time_reached;

/// An obstacle prefab the spawner knows how to build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleTemplate {
    pub name: String,
    pub hazard: HazardKind,
}

impl ObstacleTemplate {
    pub fn new(name: impl Into<String>, hazard: HazardKind) -> Self {
        Self {
            name: name.into(),
            hazard,
        }
    }
}

/// Opaque reference to a live spawned obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObstacleHandle(pub u64);

/// Builds obstacle instances in the world
pub trait ObstacleSpawner {
    fn spawn_obstacle(&mut self, template: &ObstacleTemplate, position: Vec3) -> ObstacleHandle;
    fn set_active(&mut self, handle: ObstacleHandle, active: bool);
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnedObstacle {
    pub handle: ObstacleHandle,
    pub template: ObstacleTemplate,
    pub position: Vec3,
    pub active: bool,
}

/// Spawner that only records what was asked of it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemorySpawner {
    pub obstacles: Vec<SpawnedObstacle>,
    next_id: u64,
}

impl InMemorySpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: ObstacleHandle) -> Option<&SpawnedObstacle> {
        self.obstacles.iter().find(|o| o.handle == handle)
    }
}

impl ObstacleSpawner for InMemorySpawner {
    fn spawn_obstacle(&mut self, template: &ObstacleTemplate, position: Vec3) -> ObstacleHandle {
        self.next_id += 1;
        let handle = ObstacleHandle(self.next_id);
        self.obstacles.push(SpawnedObstacle {
            handle,
            template: template.clone(),
            position,
            active: false,
        });
        handle
    }

    fn set_active(&mut self, handle: ObstacleHandle, active: bool) {
        if let Some(obstacle) = self.obstacles.iter_mut().find(|o| o.handle == handle) {
            obstacle.active = active;
        }
    }
}

/// Repeating spawn timer, armed by speed ratio
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnTimer {
    pub is_armed: bool,
    pub elapsed_since_last_spawn: f32,
}

/// What a spawn produced, for the caller's event log
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnOutcome {
    pub handle: ObstacleHandle,
    pub template: ObstacleTemplate,
    pub position: Vec3,
}

#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    config: SpawnConfig,
    timer: SpawnTimer,
    rng: Pcg32,
    spawned: Vec<ObstacleHandle>,
}

impl SpawnScheduler {
    pub fn new(config: SpawnConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            timer: SpawnTimer::default(),
            rng: Pcg32::seed_from_u64(seed),
            spawned: Vec::new(),
        })
    }

    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }

    pub fn timer(&self) -> &SpawnTimer {
        &self.timer
    }

    /// Every obstacle this scheduler has spawned, oldest first
    pub fn spawned(&self) -> &[ObstacleHandle] {
        &self.spawned
    }

    /// Advance the timer; spawns at most once per tick
    pub fn tick(
        &mut self,
        dt: f32,
        motion: &MotionController,
        spawner: &mut dyn ObstacleSpawner,
    ) -> Option<SpawnOutcome> {
        if motion.speed_ratio() < self.config.threshold {
            if self.timer.is_armed {
                log::debug!("Spawning disarmed at ratio {:.2}", motion.speed_ratio());
            }
            self.timer = SpawnTimer::default();
            return None;
        }

        if !self.timer.is_armed {
            self.timer.is_armed = true;
            self.timer.elapsed_since_last_spawn = 0.0;
            log::debug!("Spawning armed at ratio {:.2}", motion.speed_ratio());
        }

        self.timer.elapsed_since_last_spawn += dt;
        if !time_reached(self.timer.elapsed_since_last_spawn, self.config.interval) {
            return None;
        }
        self.timer.elapsed_since_last_spawn = 0.0;
        self.spawn(motion, spawner)
    }

    fn spawn(
        &mut self,
        motion: &MotionController,
        spawner: &mut dyn ObstacleSpawner,
    ) -> Option<SpawnOutcome> {
        if self.config.templates.is_empty() || self.config.anchors.is_empty() {
            log::debug!("Spawn skipped: no templates or anchors configured");
            return None;
        }

        let template_index = self.rng.random_range(0..self.config.templates.len());
        let anchor_index = self.rng.random_range(0..self.config.anchors.len());
        let template = &self.config.templates[template_index];
        let anchor = self.config.anchors[anchor_index];

        let position = Vec3::new(
            anchor.x,
            motion.position().y + self.config.ahead_distance,
            anchor.z,
        );
        let handle = spawner.spawn_obstacle(template, position);
        spawner.set_active(handle, true);
        self.spawned.push(handle);

        log::info!(
            "Spawned {} at ({:.1}, {:.1}, {:.1})",
            template.name,
            position.x,
            position.y,
            position.z
        );
        Some(SpawnOutcome {
            handle,
            template: template.clone(),
            position,
        })
    }
}
