//! Simulation module
//!
//! All gameplay logic lives here. Components never suspend mid-tick and
//! never block: timed effects are state carried from one tick to the next.
//! - `motion`: forward speed, steering, speed ownership
//! - `collision`: hazard classification and the timed hole episode
//! - `spawn`: speed-gated obstacle scheduling
//! - `tick`: the fixed per-frame order tying them together

pub mod collision;
pub mod ease;
pub mod motion;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{
    CollisionEpisode, CollisionResponseCoordinator, ContactReport, HazardContact, HazardKind,
    ObjectRef, Orientation, ResponseState,
};
pub use ease::{Tween, quad_out};
pub use motion::{Action, KeyEvent, MotionController, SpeedAuthority, VehicleState};
pub use spawn::{
    InMemorySpawner, ObstacleHandle, ObstacleSpawner, ObstacleTemplate, SpawnOutcome,
    SpawnScheduler, SpawnTimer, SpawnedObstacle,
};
pub use state::{SimEvent, Snapshot, VehicleModel, World};
pub use tick::{ContactEvent, TickInput, tick};
