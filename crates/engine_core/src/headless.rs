// crates/engine_core/src/headless.rs
//! Window-less collaborators: they record what gameplay asks for so a
//! session can run (and be inspected) without a GPU.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use engine_shared::{AudioOut, RenderHandle, RenderWorld, Services, TextSink, Transform, Visual};
use tracing::trace;

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessNode {
    pub visual: Visual,
    pub transform: Transform,
    pub visible: bool,
}

#[derive(Debug, Default)]
pub struct HeadlessRenderWorld {
    next_handle: u64,
    nodes: BTreeMap<RenderHandle, HeadlessNode>,
    camera: Option<Transform>,
}

impl HeadlessRenderWorld {
    pub fn node(&self, handle: RenderHandle) -> Option<&HeadlessNode> {
        self.nodes.get(&handle)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn count_where(&self, pred: impl Fn(&Visual) -> bool) -> usize {
        self.nodes.values().filter(|n| pred(&n.visual)).count()
    }

    pub fn camera(&self) -> Option<&Transform> {
        self.camera.as_ref()
    }
}

impl RenderWorld for HeadlessRenderWorld {
    fn attach(&mut self, visual: Visual) -> RenderHandle {
        self.next_handle += 1;
        let handle = RenderHandle::new(self.next_handle);
        trace!(?handle, ?visual, "attach");
        self.nodes.insert(
            handle,
            HeadlessNode { visual, transform: Transform::IDENTITY, visible: true },
        );
        handle
    }

    fn detach(&mut self, handle: RenderHandle) {
        self.nodes.remove(&handle);
    }

    fn set_transform(&mut self, handle: RenderHandle, transform: &Transform) {
        if let Some(node) = self.nodes.get_mut(&handle) {
            node.transform = *transform;
        }
    }

    fn set_visible(&mut self, handle: RenderHandle, visible: bool) {
        if let Some(node) = self.nodes.get_mut(&handle) {
            node.visible = visible;
        }
    }

    fn set_camera(&mut self, transform: &Transform) {
        self.camera = Some(*transform);
    }
}

/// Last text written to each HUD slot.
#[derive(Debug, Default)]
pub struct TextBoard {
    texts: HashMap<String, String>,
}

impl TextBoard {
    pub fn get(&self, id: &str) -> &str {
        self.texts.get(id).map(String::as_str).unwrap_or("")
    }
}

impl TextSink for TextBoard {
    fn set_text(&mut self, id: &str, text: &str) {
        self.texts.insert(id.to_string(), text.to_string());
    }
}

/// Every sound played, in order.
#[derive(Debug, Default)]
pub struct AudioLog {
    pub played: Vec<(String, f32)>,
}

impl AudioLog {
    pub fn count(&self, sound: &str) -> usize {
        self.played.iter().filter(|(s, _)| s == sound).count()
    }
}

impl AudioOut for AudioLog {
    fn play(&mut self, sound: &str, volume: f32) {
        trace!(sound, volume, "play");
        self.played.push((sound.to_string(), volume));
    }
}

/// The three headless collaborators, kept typed so callers can inspect them
/// after handing [`Headless::services`] to a level.
#[derive(Clone, Default)]
pub struct Headless {
    pub render: Rc<RefCell<HeadlessRenderWorld>>,
    pub text: Rc<RefCell<TextBoard>>,
    pub audio: Rc<RefCell<AudioLog>>,
}

impl Headless {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn services(&self) -> Services {
        Services::new(self.render.clone(), self.text.clone(), self.audio.clone())
    }

    pub fn text(&self, id: &str) -> String {
        self.text.borrow().get(id).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_shared::text_ids;

    #[test]
    fn render_world_tracks_attached_nodes() {
        let mut world = HeadlessRenderWorld::default();
        let a = world.attach(Visual::Arrow);
        let b = world.attach(Visual::Model { asset: "zombie".into() });
        assert_ne!(a, b);

        world.set_visible(a, false);
        assert!(!world.node(a).unwrap().visible);
        world.detach(a);
        world.detach(a);
        assert_eq!(world.len(), 1);
        assert_eq!(world.count_where(|v| matches!(v, Visual::Model { .. })), 1);
    }

    #[test]
    fn services_share_the_inspectable_sinks() {
        let headless = Headless::new();
        let services = headless.services();
        services.set_text(text_ids::SCORE, "Score : 10");
        services.play("hit", 0.5);

        assert_eq!(headless.text(text_ids::SCORE), "Score : 10");
        assert_eq!(headless.text(text_ids::INFO), "");
        assert_eq!(headless.audio.borrow().count("hit"), 1);
    }
}
