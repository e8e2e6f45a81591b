// crates/engine_core/src/app.rs

use std::time::Duration;

use engine_ecs::Level;
use tracing::{debug, info, warn};

use crate::input::{InputEvent, InputPoller};

/// Frame driver: feeds device events through the poller and ticks the level.
pub struct App {
    level: Level,
    poller: InputPoller,
    frames: u64,
}

impl App {
    pub fn new(level: Level, poller: InputPoller) -> Self {
        Self { level, poller, frames: 0 }
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn level_mut(&mut self) -> &mut Level {
        &mut self.level
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Creates the level. A level without a player still runs.
    pub fn start(&mut self) {
        if let Err(err) = self.level.create() {
            info!(%err, "starting without a complete level");
        }
    }

    pub fn handle_event(&mut self, event: &InputEvent) {
        debug!(?event, "input");
        self.poller.handle_event(event);
    }

    /// One frame timed by the level's clock.
    pub fn frame(&mut self) {
        self.poller.synchronize();
        self.level.update();
        self.frames += 1;
    }

    /// One frame of fixed length, for scripted or headless sessions.
    pub fn step(&mut self, dt: f32) {
        self.poller.synchronize();
        self.level.advance(dt);
        self.frames += 1;
    }

    /// Steps `dt` frames until `duration` of game time has passed. A `dt`
    /// too small to move the clock runs nothing.
    pub fn run_for(&mut self, duration: Duration, dt: f32) {
        if Duration::try_from_secs_f32(dt).map_or(true, |step| step.is_zero()) {
            warn!(dt, "frame step does not advance the clock");
            return;
        }
        let end = self.level.now() + duration;
        while self.level.now() < end {
            self.step(dt);
        }
    }
}
