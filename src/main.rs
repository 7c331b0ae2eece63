//! Lane Runner headless entry point
//!
//! Loads settings, drives a scripted run through the fixed-step loop and
//! prints the final state.

use lane_runner::Settings;
use lane_runner::consts::*;
use lane_runner::sim::{
    Action, ContactEvent, ContactReport, InMemorySpawner, KeyEvent, ObjectRef, TickInput, World,
    tick,
};

/// Length of the scripted run (seconds)
const RUN_SECS: f32 = 10.0;
/// Simulated render frame rate feeding the accumulator
const FRAME_DT: f32 = 1.0 / 30.0;

/// One scripted input, fired once the run clock reaches `at`
struct Cue {
    at: f32,
    key: Option<KeyEvent>,
    contact: Option<ContactEvent>,
}

impl Cue {
    fn key(at: f32, key: KeyEvent) -> Self {
        Self {
            at,
            key: Some(key),
            contact: None,
        }
    }

    fn contact(at: f32, contact: ContactEvent) -> Self {
        Self {
            at,
            key: None,
            contact: Some(contact),
        }
    }
}

fn script() -> Vec<Cue> {
    let hole = ContactReport::new("Hole", ObjectRef(1));
    let water = ContactReport::new("Water", ObjectRef(2));
    let scenery = ContactReport::new("Lamppost", ObjectRef(3));
    vec![
        Cue::key(0.0, KeyEvent::Down(Action::Forward)),
        Cue::key(2.0, KeyEvent::Down(Action::Right)),
        Cue::key(2.5, KeyEvent::Up(Action::Right)),
        Cue::key(3.0, KeyEvent::Down(Action::Left)),
        Cue::key(3.5, KeyEvent::Up(Action::Left)),
        Cue::contact(3.8, ContactEvent::Begin(scenery.clone())),
        Cue::contact(3.9, ContactEvent::End(scenery)),
        Cue::contact(4.0, ContactEvent::Begin(hole.clone())),
        Cue::contact(4.1, ContactEvent::End(hole)),
        Cue::key(6.5, KeyEvent::Down(Action::Forward)),
        Cue::contact(8.0, ContactEvent::Begin(water.clone())),
        Cue::contact(8.1, ContactEvent::End(water)),
    ]
}

/// Fixed-step driver holding the world and its pending input
struct Game {
    world: World,
    spawner: InMemorySpawner,
    accumulator: f32,
    input: TickInput,
}

impl Game {
    fn new(settings: &Settings) -> Result<Self, lane_runner::ConfigError> {
        Ok(Self {
            world: World::new(settings)?,
            spawner: InMemorySpawner::new(),
            accumulator: 0.0,
            input: TickInput::default(),
        })
    }

    /// Run simulation ticks for one rendered frame
    fn update(&mut self, dt: f32) {
        let dt = dt.min(MAX_FRAME_DT);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = std::mem::take(&mut self.input);
            tick(&mut self.world, &mut self.spawner, &input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }

        for event in self.world.drain_events() {
            log::info!("t={:.2}s {:?}", self.world.time_secs, event);
        }
    }
}

fn run(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let mut game = Game::new(settings)?;
    let mut cues = script().into_iter().peekable();
    let mut clock = 0.0f32;

    while clock < RUN_SECS {
        while let Some(cue) = cues.next_if(|c| c.at <= clock) {
            if let Some(key) = cue.key {
                game.input.keys.push(key);
            }
            if let Some(contact) = cue.contact {
                game.input.contacts.push(contact);
            }
        }
        game.update(FRAME_DT);
        clock += FRAME_DT;
    }

    let vehicle = game.world.motion.state();
    log::info!(
        "Finished at y={:.1} speed={:.2}, {} obstacles spawned",
        vehicle.position.y,
        vehicle.forward_speed,
        game.world.spawn.spawned().len()
    );
    println!("{}", serde_json::to_string_pretty(&game.world.snapshot())?);
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Lane Runner (headless) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => match Settings::load(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("Could not load settings from {path}: {e}");
                std::process::exit(1);
            }
        },
        None => Settings::default(),
    };

    if let Err(e) = run(&settings) {
        log::error!("Run failed: {e}");
        std::process::exit(1);
    }
}
