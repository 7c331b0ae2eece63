//! Hazard contact response
//!
//! Hazards are classified on begin-contact. Barrier and Water react once;
//! a Hole takes speed ownership away from the driver, spins the vehicle
//! model and bleeds speed to zero over a fixed duration, then hands
//! control back. End-contact events are observed only: an episode is
//! bounded by time, not by contact.

use serde::{Deserialize, Serialize};

use super::ease::Tween;
use super::motion::MotionController;
use super::state::SimEvent;
use crate::error::ConfigError;
use crate::settings::ImpactConfig;

/// Hazard classification carried by a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HazardKind {
    Barrier,
    Hole,
    Water,
}

impl HazardKind {
    /// Classify a contact tag; unknown tags are not hazards
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Barrier" => Some(HazardKind::Barrier),
            "Hole" => Some(HazardKind::Hole),
            "Water" => Some(HazardKind::Water),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HazardKind::Barrier => "Barrier",
            HazardKind::Hole => "Hole",
            HazardKind::Water => "Water",
        }
    }
}

/// Opaque reference to the struck object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef(pub u64);

/// A contact as the collision layer reports it: the struck object's tag,
/// not yet classified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactReport {
    pub tag: String,
    pub object: ObjectRef,
}

impl ContactReport {
    pub fn new(tag: impl Into<String>, object: ObjectRef) -> Self {
        Self {
            tag: tag.into(),
            object,
        }
    }

    /// Classify the tag; anything that is not a hazard yields `None`
    pub fn classify(&self) -> Option<HazardContact> {
        match HazardKind::from_tag(&self.tag) {
            Some(kind) => Some(HazardContact {
                kind,
                object: self.object,
            }),
            None => {
                log::debug!("Contact with unknown object {:?} ({})", self.object, self.tag);
                None
            }
        }
    }
}

/// A classified hazard contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardContact {
    pub kind: HazardKind,
    pub object: ObjectRef,
}

/// Something whose rotation (degrees) the coordinator can drive
pub trait Orientation {
    fn rotation(&self) -> f32;
    fn set_rotation(&mut self, degrees: f32);
}

/// One running hole episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionEpisode {
    pub kind: HazardKind,
    pub object: ObjectRef,
    /// Model rotation at entry; `None` when there was no model to spin
    pub start_rotation: Option<f32>,
    pub spin: Tween,
}

impl CollisionEpisode {
    pub fn elapsed(&self) -> f32 {
        self.spin.elapsed
    }

    pub fn duration(&self) -> f32 {
        self.spin.duration
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum ResponseState {
    #[default]
    Idle,
    HazardActive(CollisionEpisode),
}

/// Per-tick speed multiplier so that `residual` of the speed is left after
/// `duration` seconds, whatever the tick rate
#[inline]
pub fn decay_factor(residual: f32, dt: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        return residual;
    }
    residual.powf(dt / duration)
}

#[derive(Debug, Clone)]
pub struct CollisionResponseCoordinator {
    config: ImpactConfig,
    state: ResponseState,
}

impl CollisionResponseCoordinator {
    pub fn new(config: ImpactConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            state: ResponseState::Idle,
        })
    }

    pub fn config(&self) -> &ImpactConfig {
        &self.config
    }

    pub fn state(&self) -> &ResponseState {
        &self.state
    }

    pub fn episode(&self) -> Option<&CollisionEpisode> {
        match &self.state {
            ResponseState::HazardActive(episode) => Some(episode),
            ResponseState::Idle => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, ResponseState::HazardActive(_))
    }

    /// React to a hazard volume being entered
    pub fn on_begin_contact(
        &mut self,
        contact: HazardContact,
        motion: Option<&mut MotionController>,
        model: Option<&mut dyn Orientation>,
    ) -> Option<SimEvent> {
        log::debug!("Begin contact with {} {:?}", contact.kind.as_str(), contact.object);
        match contact.kind {
            HazardKind::Barrier => {
                log::info!("Barrier hit {:?}", contact.object);
                Some(SimEvent::BarrierHit {
                    object: contact.object,
                })
            }
            HazardKind::Water => self.hit_water(contact, motion),
            HazardKind::Hole => self.enter_hole(contact, motion, model),
        }
    }

    /// Classify a raw begin-contact and react if it is a hazard
    pub fn on_begin_report(
        &mut self,
        report: &ContactReport,
        motion: Option<&mut MotionController>,
        model: Option<&mut dyn Orientation>,
    ) -> Option<SimEvent> {
        let contact = report.classify()?;
        self.on_begin_contact(contact, motion, model)
    }

    /// End-contact events are logged and otherwise ignored
    pub fn on_end_contact(&mut self, contact: HazardContact) {
        log::debug!("End contact with {} {:?}", contact.kind.as_str(), contact.object);
    }

    pub fn on_end_report(&mut self, report: &ContactReport) {
        if let Some(contact) = report.classify() {
            self.on_end_contact(contact);
        }
    }

    fn hit_water(
        &mut self,
        contact: HazardContact,
        motion: Option<&mut MotionController>,
    ) -> Option<SimEvent> {
        if self.is_active() {
            log::debug!("Water penalty skipped: hole episode owns speed");
            return None;
        }
        let Some(motion) = motion else {
            log::debug!("Water hit with no motion controller attached");
            return None;
        };
        motion.scale_speed(self.config.water_penalty);
        log::info!("Water hit, speed now {:.2}", motion.forward_speed());
        Some(SimEvent::WaterSplash {
            object: contact.object,
            speed: motion.forward_speed(),
        })
    }

    fn enter_hole(
        &mut self,
        contact: HazardContact,
        motion: Option<&mut MotionController>,
        model: Option<&mut dyn Orientation>,
    ) -> Option<SimEvent> {
        if self.is_active() {
            log::debug!("Already in a hole, ignoring {:?}", contact.object);
            return None;
        }

        let start_rotation = model.map(|m| m.rotation());
        if let Some(motion) = motion {
            motion.set_control_enabled(false);
            motion.scale_speed(self.config.hole_entry_penalty);
        }

        let duration = self.config.hole_slow_down_duration;
        let from = start_rotation.unwrap_or(0.0);
        let to = from - self.config.hole_spin_speed * duration;
        self.state = ResponseState::HazardActive(CollisionEpisode {
            kind: HazardKind::Hole,
            object: contact.object,
            start_rotation,
            spin: Tween::new(from, to, duration),
        });

        log::info!("Fell into hole {:?}, spinning for {duration}s", contact.object);
        Some(SimEvent::HoleEntered {
            object: contact.object,
        })
    }

    /// Advance the running episode, if any. Returns `HoleRecovered` on the
    /// tick the episode finishes.
    pub fn tick(
        &mut self,
        dt: f32,
        motion: Option<&mut MotionController>,
        model: Option<&mut dyn Orientation>,
    ) -> Option<SimEvent> {
        let ResponseState::HazardActive(episode) = &mut self.state else {
            return None;
        };

        episode.spin.advance(dt);
        if !episode.spin.finished() {
            if let (Some(model), Some(_)) = (model, episode.start_rotation) {
                model.set_rotation(episode.spin.value());
            }
            if let Some(motion) = motion {
                let factor =
                    decay_factor(self.config.hole_speed_residual, dt, episode.spin.duration);
                motion.scale_speed(factor);
            }
            return None;
        }

        let start_rotation = episode.start_rotation;
        self.state = ResponseState::Idle;

        if let (Some(model), Some(rotation)) = (model, start_rotation) {
            model.set_rotation(rotation);
        }
        if let Some(motion) = motion {
            motion.set_speed(0.0);
            motion.set_control_enabled(true);
        }

        log::info!("Recovered from hole");
        Some(SimEvent::HoleRecovered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MotionConfig;
    use crate::sim::motion::{Action, KeyEvent};
    use crate::sim::state::VehicleModel;

    fn coordinator() -> CollisionResponseCoordinator {
        CollisionResponseCoordinator::new(ImpactConfig::default()).unwrap()
    }

    fn motion_at(speed: f32) -> MotionController {
        let mut motion = MotionController::new(MotionConfig::default()).unwrap();
        motion.set_speed(speed);
        motion
    }

    fn contact(kind: HazardKind) -> HazardContact {
        HazardContact {
            kind,
            object: ObjectRef(7),
        }
    }

    #[test]
    fn test_tag_classification() {
        assert_eq!(HazardKind::from_tag("Hole"), Some(HazardKind::Hole));
        assert_eq!(HazardKind::from_tag("Water"), Some(HazardKind::Water));
        assert_eq!(HazardKind::from_tag("Barrier"), Some(HazardKind::Barrier));
        assert_eq!(HazardKind::from_tag("Tree"), None);
    }

    #[test]
    fn test_decay_factor_is_rate_independent() {
        let residual = 0.002;
        let coarse = decay_factor(residual, 0.5, 2.0).powi(4);
        let fine = decay_factor(residual, 1.0 / 120.0, 2.0).powi(240);
        assert!((coarse - residual).abs() < 1e-5);
        assert!((fine - residual).abs() < 1e-4);
    }

    #[test]
    fn test_water_halves_speed_without_suspending_control() {
        let mut coordinator = coordinator();
        let mut motion = motion_at(10.0);

        let event = coordinator.on_begin_contact(contact(HazardKind::Water), Some(&mut motion), None);
        assert!(matches!(event, Some(SimEvent::WaterSplash { speed, .. }) if speed == 5.0));
        assert_eq!(motion.forward_speed(), 5.0);
        assert!(motion.control_enabled());
        assert!(!coordinator.is_active());
    }

    #[test]
    fn test_barrier_is_momentary() {
        let mut coordinator = coordinator();
        let mut motion = motion_at(10.0);
        let event =
            coordinator.on_begin_contact(contact(HazardKind::Barrier), Some(&mut motion), None);
        assert!(matches!(event, Some(SimEvent::BarrierHit { .. })));
        assert_eq!(motion.forward_speed(), 10.0);
        assert!(!coordinator.is_active());
    }

    #[test]
    fn test_hole_entry_suspends_control() {
        let mut coordinator = coordinator();
        let mut motion = motion_at(10.0);
        let mut model = VehicleModel { rotation: 30.0 };

        let event = coordinator.on_begin_contact(
            contact(HazardKind::Hole),
            Some(&mut motion),
            Some(&mut model),
        );
        assert!(matches!(event, Some(SimEvent::HoleEntered { .. })));
        assert!(!motion.control_enabled());
        assert_eq!(motion.forward_speed(), 8.0);

        let episode = coordinator.episode().unwrap();
        assert_eq!(episode.start_rotation, Some(30.0));
        assert_eq!(episode.duration(), 2.0);
        assert_eq!(episode.spin.to, 30.0 - 360.0);
    }

    #[test]
    fn test_duplicate_hole_is_ignored() {
        let mut coordinator = coordinator();
        let mut motion = motion_at(10.0);
        let mut model = VehicleModel { rotation: 0.0 };

        coordinator.on_begin_contact(contact(HazardKind::Hole), Some(&mut motion), Some(&mut model));
        coordinator.tick(0.5, Some(&mut motion), Some(&mut model));
        let speed = motion.forward_speed();

        let event = coordinator.on_begin_contact(
            contact(HazardKind::Hole),
            Some(&mut motion),
            Some(&mut model),
        );
        assert!(event.is_none());
        assert_eq!(motion.forward_speed(), speed);
        assert_eq!(coordinator.episode().unwrap().elapsed(), 0.5);
    }

    #[test]
    fn test_water_skipped_during_hole_episode() {
        let mut coordinator = coordinator();
        let mut motion = motion_at(10.0);
        coordinator.on_begin_contact(contact(HazardKind::Hole), Some(&mut motion), None);

        let event = coordinator.on_begin_contact(contact(HazardKind::Water), Some(&mut motion), None);
        assert!(event.is_none());
        assert_eq!(motion.forward_speed(), 8.0);
    }

    #[test]
    fn test_hole_episode_runs_to_completion() {
        let mut coordinator = coordinator();
        let mut motion = motion_at(16.0);
        let mut model = VehicleModel { rotation: 12.5 };

        coordinator.on_begin_contact(contact(HazardKind::Hole), Some(&mut motion), Some(&mut model));

        let mut recovered = false;
        let mut previous_speed = motion.forward_speed();
        for _ in 0..7 {
            let event = coordinator.tick(0.25, Some(&mut motion), Some(&mut model));
            assert!(event.is_none());
            assert!(motion.forward_speed() < previous_speed);
            assert!(model.rotation < 12.5);
            assert!(!motion.control_enabled());
            previous_speed = motion.forward_speed();
        }
        if let Some(SimEvent::HoleRecovered) =
            coordinator.tick(0.25, Some(&mut motion), Some(&mut model))
        {
            recovered = true;
        }

        assert!(recovered);
        assert!(!coordinator.is_active());
        assert_eq!(model.rotation, 12.5);
        assert_eq!(motion.forward_speed(), 0.0);
        assert_eq!(motion.vertical_speed(), 0.0);
        assert!(motion.control_enabled());
    }

    fn episode_ticks(dt: f32) -> u32 {
        let mut coordinator = coordinator();
        let mut motion = motion_at(16.0);
        let mut model = VehicleModel { rotation: 5.0 };
        coordinator.on_begin_contact(contact(HazardKind::Hole), Some(&mut motion), Some(&mut model));

        let mut ticks = 0;
        while coordinator.is_active() {
            coordinator.tick(dt, Some(&mut motion), Some(&mut model));
            ticks += 1;
            assert!(ticks <= 1000, "episode never finished at dt {dt}");
        }
        assert_eq!(model.rotation, 5.0);
        assert_eq!(motion.forward_speed(), 0.0);
        assert!(motion.control_enabled());
        ticks
    }

    #[test]
    fn test_hole_episode_length_at_real_frame_rates() {
        assert_eq!(episode_ticks(crate::consts::SIM_DT), 120);
        assert_eq!(episode_ticks(0.1), 20);
        assert_eq!(episode_ticks(1.0 / 30.0), 60);
    }

    #[test]
    fn test_unknown_tag_is_ignored() {
        let mut coordinator = coordinator();
        let mut motion = motion_at(10.0);
        let mut model = VehicleModel { rotation: 0.0 };

        let report = ContactReport::new("Tree", ObjectRef(3));
        assert!(report.classify().is_none());
        let event = coordinator.on_begin_report(&report, Some(&mut motion), Some(&mut model));
        assert!(event.is_none());
        coordinator.on_end_report(&report);

        assert_eq!(motion.forward_speed(), 10.0);
        assert!(motion.control_enabled());
        assert!(!coordinator.is_active());
        assert_eq!(model.rotation, 0.0);
    }

    #[test]
    fn test_report_classifies_known_tags() {
        let mut coordinator = coordinator();
        let mut motion = motion_at(10.0);
        let report = ContactReport::new("Water", ObjectRef(4));
        let event = coordinator.on_begin_report(&report, Some(&mut motion), None);
        assert!(matches!(event, Some(SimEvent::WaterSplash { .. })));
        assert_eq!(motion.forward_speed(), 5.0);
    }

    #[test]
    fn test_spin_follows_ease_out() {
        let mut coordinator = coordinator();
        let mut motion = motion_at(10.0);
        let mut model = VehicleModel { rotation: 0.0 };
        coordinator.on_begin_contact(contact(HazardKind::Hole), Some(&mut motion), Some(&mut model));

        coordinator.tick(1.0, Some(&mut motion), Some(&mut model));
        // Halfway through time, three quarters through the 360 degree spin
        assert_eq!(model.rotation, -270.0);
    }

    #[test]
    fn test_episode_without_collaborators() {
        let mut coordinator = coordinator();
        let event = coordinator.on_begin_contact(contact(HazardKind::Hole), None, None);
        assert!(matches!(event, Some(SimEvent::HoleEntered { .. })));
        assert_eq!(coordinator.episode().unwrap().start_rotation, None);

        assert!(coordinator.tick(1.0, None, None).is_none());
        assert!(matches!(
            coordinator.tick(1.0, None, None),
            Some(SimEvent::HoleRecovered)
        ));
        assert!(!coordinator.is_active());
    }

    #[test]
    fn test_model_attached_mid_episode_is_not_spun() {
        let mut coordinator = coordinator();
        let mut motion = motion_at(10.0);
        coordinator.on_begin_contact(contact(HazardKind::Hole), Some(&mut motion), None);

        let mut model = VehicleModel { rotation: 45.0 };
        coordinator.tick(0.5, Some(&mut motion), Some(&mut model));
        assert_eq!(model.rotation, 45.0);
    }

    #[test]
    fn test_input_resumes_after_recovery() {
        let mut coordinator = coordinator();
        let mut motion = motion_at(10.0);
        motion.handle_key(KeyEvent::Down(Action::Forward));
        coordinator.on_begin_contact(contact(HazardKind::Hole), Some(&mut motion), None);

        motion.handle_key(KeyEvent::Down(Action::Forward));
        assert!(!motion.state().moving_forward);

        coordinator.tick(2.0, Some(&mut motion), None);
        assert!(motion.control_enabled());
        motion.handle_key(KeyEvent::Down(Action::Forward));
        motion.tick(0.5);
        assert_eq!(motion.forward_speed(), 5.0);
    }
}
