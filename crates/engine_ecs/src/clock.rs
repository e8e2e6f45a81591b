// crates/engine_ecs/src/clock.rs

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::debug;

pub trait TimeSource {
    fn now(&self) -> Duration;
}

/// Wall clock, measured from construction.
pub struct SystemTime {
    start: Instant,
}

impl SystemTime {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for SystemTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTime {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Hand-driven clock. Clones share the same time, so a test can keep one
/// handle and give the other to a level.
#[derive(Clone, Default)]
pub struct ManualTime(Rc<Cell<Duration>>);

impl ManualTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }

    pub fn set(&self, now: Duration) {
        self.0.set(now);
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> Duration {
        self.0.get()
    }
}

/// Frame timer: hands out the elapsed time since the previous tick.
pub struct FrameClock {
    source: Box<dyn TimeSource>,
    prev: Duration,
    max_dt: f32,
}

impl FrameClock {
    /// Clamps to 0.25s to avoid giant spikes when the tab was suspended,
    /// the window dragged, a breakpoint hit, etc.
    pub const DEFAULT_MAX_DT: f32 = 0.25;

    pub fn new(source: impl TimeSource + 'static) -> Self {
        let prev = source.now();
        Self {
            source: Box::new(source),
            prev,
            max_dt: Self::DEFAULT_MAX_DT,
        }
    }

    pub fn system() -> Self {
        Self::new(SystemTime::new())
    }

    pub fn with_max_dt(mut self, max_dt: f32) -> Self {
        self.max_dt = max_dt.max(0.0);
        self
    }

    pub fn max_dt(&self) -> f32 {
        self.max_dt
    }

    /// Update the frame timer and return the clamped frame delta.
    pub fn tick(&mut self) -> f32 {
        let now = self.source.now();
        let frame_dt = now.saturating_sub(self.prev).as_secs_f32();
        self.prev = now;

        if frame_dt > self.max_dt {
            debug!(frame_dt, max_dt = self.max_dt, "clamping frame delta");
        }
        frame_dt.min(self.max_dt)
    }
}
