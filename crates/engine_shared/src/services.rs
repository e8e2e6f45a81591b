// crates/engine_shared/src/services.rs
use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;

use crate::math::Transform;

// ==================================================================================
// 1. RENDER WORLD
// ==================================================================================

/// Opaque membership token returned by [`RenderWorld::attach`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderHandle(u64);

impl RenderHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// What a component asks the renderer to show. The renderer owns the actual
/// meshes, materials and lights.
#[derive(Clone, Debug, PartialEq)]
pub enum Visual {
    Cuboid { size: Vec3, color: u32 },
    Model { asset: String },
    Sprite { texture: String, scale: f32 },
    PointLight { intensity: f32, range: f32 },
    Arrow,
}

pub trait RenderWorld {
    fn attach(&mut self, visual: Visual) -> RenderHandle;
    fn detach(&mut self, handle: RenderHandle);
    fn set_transform(&mut self, handle: RenderHandle, transform: &Transform);
    fn set_visible(&mut self, handle: RenderHandle, visible: bool);
    fn set_camera(&mut self, _transform: &Transform) {}
}

// ==================================================================================
// 2. TEXT + AUDIO SINKS
// ==================================================================================

/// Ids of the HUD text slots written by gameplay.
pub mod text_ids {
    pub const SCORE: &str = "score_text";
    pub const ROUND: &str = "round_text";
    pub const INFO: &str = "info_text";
}

pub trait TextSink {
    fn set_text(&mut self, id: &str, text: &str);
}

pub trait AudioOut {
    fn play(&mut self, sound: &str, volume: f32);
}

pub type SharedRenderWorld = Rc<RefCell<dyn RenderWorld>>;
pub type SharedTextSink = Rc<RefCell<dyn TextSink>>;
pub type SharedAudio = Rc<RefCell<dyn AudioOut>>;

// ==================================================================================
// 3. SERVICE BUNDLE
// ==================================================================================

/// External collaborators handed to a level at construction.
#[derive(Clone)]
pub struct Services {
    pub render: SharedRenderWorld,
    pub text: SharedTextSink,
    pub audio: SharedAudio,
}

impl Services {
    pub fn new(render: SharedRenderWorld, text: SharedTextSink, audio: SharedAudio) -> Self {
        Self { render, text, audio }
    }

    pub fn set_text(&self, id: &str, text: &str) {
        self.text.borrow_mut().set_text(id, text);
    }

    pub fn play(&self, sound: &str, volume: f32) {
        self.audio.borrow_mut().play(sound, volume);
    }
}
