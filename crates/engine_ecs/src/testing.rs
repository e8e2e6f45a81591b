// crates/engine_ecs/src/testing.rs
//! Null collaborators for unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use engine_shared::{AudioOut, RenderHandle, RenderWorld, Services, TextSink, Transform, Visual};

use crate::clock::{FrameClock, ManualTime};
use crate::level::Level;

#[derive(Default)]
pub struct NullWorld {
    pub next: u64,
    pub attached: Vec<RenderHandle>,
}

impl RenderWorld for NullWorld {
    fn attach(&mut self, _visual: Visual) -> RenderHandle {
        self.next += 1;
        let handle = RenderHandle::new(self.next);
        self.attached.push(handle);
        handle
    }

    fn detach(&mut self, handle: RenderHandle) {
        self.attached.retain(|h| *h != handle);
    }

    fn set_transform(&mut self, _handle: RenderHandle, _transform: &Transform) {}

    fn set_visible(&mut self, _handle: RenderHandle, _visible: bool) {}
}

pub struct Silent;

impl TextSink for Silent {
    fn set_text(&mut self, _id: &str, _text: &str) {}
}

impl AudioOut for Silent {
    fn play(&mut self, _sound: &str, _volume: f32) {}
}

pub fn services_with(world: Rc<RefCell<NullWorld>>) -> Services {
    Services::new(world, Rc::new(RefCell::new(Silent)), Rc::new(RefCell::new(Silent)))
}

pub fn level() -> Level {
    let world = Rc::new(RefCell::new(NullWorld::default()));
    Level::with_clock(services_with(world), FrameClock::new(ManualTime::new()))
}

/// Shared, clonable event log.
#[derive(Clone, Default)]
pub struct Recorder(Rc<RefCell<Vec<String>>>);

impl Recorder {
    pub fn push(&self, entry: String) {
        self.0.borrow_mut().push(entry);
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}
