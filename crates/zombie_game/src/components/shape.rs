// crates/zombie_game/src/components/shape.rs

use engine_ecs::{Component, ComponentCtx, Renderable};
use engine_shared::glam::Vec3;
use engine_shared::{RenderHandle, Visual};

use super::any_plumbing;

/// Solid box synced to its object every frame.
#[derive(Debug, Clone)]
pub struct BasicShape {
    size: Vec3,
    color: u32,
    handle: Option<RenderHandle>,
}

impl BasicShape {
    pub fn cuboid(size: Vec3, color: u32) -> Self {
        Self { size, color, handle: None }
    }

    pub fn size(&self) -> Vec3 {
        self.size
    }
}

impl Component for BasicShape {
    fn create(&mut self, cx: &mut ComponentCtx<'_>) {
        self.handle = cx.attach(Visual::Cuboid { size: self.size, color: self.color });
        if let Some(handle) = self.handle {
            cx.sync(handle, &cx.world_transform());
        }
    }

    fn remove(&mut self, cx: &mut ComponentCtx<'_>) {
        if let Some(handle) = self.handle.take() {
            cx.detach(handle);
        }
    }

    fn update(&mut self, cx: &mut ComponentCtx<'_>, _dt: f32) {
        if let Some(handle) = self.handle {
            cx.sync(handle, &cx.world_transform());
        }
    }

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(Self { handle: None, ..self.clone() })
    }

    any_plumbing!();

    fn as_renderable(&self) -> Option<&dyn Renderable> {
        Some(self)
    }
}

impl Renderable for BasicShape {
    fn render_handle(&self) -> Option<RenderHandle> {
        self.handle
    }

    fn hit_radius(&self) -> f32 {
        self.size.max_element() / 2.0
    }
}
