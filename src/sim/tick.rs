//! Per-frame simulation tick
//!
//! Order is fixed: Motion, then Collision, then Spawn. Spawn therefore reads
//! the speed already updated this frame.

use serde::{Deserialize, Serialize};

use super::collision::{ContactReport, Orientation};
use super::motion::KeyEvent;
use super::spawn::ObstacleSpawner;
use super::state::{SimEvent, World};
use crate::sanitize_dt;

/// Begin/end contact delivered by the collision layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactEvent {
    Begin(ContactReport),
    End(ContactReport),
}

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Logical key transitions, in arrival order
    pub keys: Vec<KeyEvent>,
    /// Hazard contacts reported since the last tick
    pub contacts: Vec<ContactEvent>,
}

/// Advance the world by one frame
pub fn tick(world: &mut World, spawner: &mut dyn ObstacleSpawner, input: &TickInput, dt: f32) {
    let dt = sanitize_dt(dt);

    world.time_ticks += 1;
    world.time_secs += dt;

    // Motion
    for &key in &input.keys {
        world.motion.handle_key(key);
    }
    world.motion.tick(dt);

    // Collision: advance the running episode first so a hole entered this
    // frame starts from zero elapsed time
    let model = world.model.as_mut().map(|m| m as &mut dyn Orientation);
    if let Some(event) = world.collision.tick(dt, Some(&mut world.motion), model) {
        world.events.push(event);
    }
    for contact in &input.contacts {
        match contact {
            ContactEvent::Begin(report) => {
                let model = world.model.as_mut().map(|m| m as &mut dyn Orientation);
                if let Some(event) =
                    world
                        .collision
                        .on_begin_report(report, Some(&mut world.motion), model)
                {
                    world.events.push(event);
                }
            }
            ContactEvent::End(report) => world.collision.on_end_report(report),
        }
    }

    // Spawn
    if let Some(outcome) = world.spawn.tick(dt, &world.motion, spawner) {
        world.events.push(SimEvent::ObstacleSpawned {
            handle: outcome.handle,
            template: outcome.template.name,
            position: outcome.position,
        });
    }
}
