// crates/engine_ecs/src/game_object.rs

use engine_shared::glam::Vec3;
use engine_shared::{SharedRenderWorld, Transform};
use tracing::{error, warn};

use crate::component::{Component, ComponentCtx, ComponentNode, Damageable, Renderable};
use crate::entity::{EntityId, NodeId};
use crate::error::SceneError;
use crate::level::Level;

/// Per-frame custom hook of a game object, run before its components.
///
/// Any `FnMut(&mut Transform, f32) + Clone` closure is a hook. Cloning a
/// game object clones the closure together with its captured state, so two
/// clones never share hook state.
pub trait ObjectHook {
    fn run(&mut self, transform: &mut Transform, dt: f32);
    fn clone_hook(&self) -> Box<dyn ObjectHook>;
}

impl<F> ObjectHook for F
where
    F: FnMut(&mut Transform, f32) + Clone + 'static,
{
    fn run(&mut self, transform: &mut Transform, dt: f32) {
        self(transform, dt)
    }

    fn clone_hook(&self) -> Box<dyn ObjectHook> {
        Box::new(self.clone())
    }
}

/// Where a game object lives: its level and its handle there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectOwner {
    pub level: NodeId,
    pub entity: EntityId,
}

/// Named container of components.
pub struct GameObject {
    id: NodeId,
    name: String,
    transform: Transform,
    // Slots are None while checked out for a hook or after a removal that
    // happened mid-iteration; `compact` drops the latter.
    components: Vec<Option<ComponentNode>>,
    hook: Option<Box<dyn ObjectHook>>,
    owner: Option<ObjectOwner>,
    render: Option<SharedRenderWorld>,
    created: bool,
}

impl GameObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            transform: Transform::IDENTITY,
            components: Vec::new(),
            hook: None,
            owner: None,
            render: None,
            created: false,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn owner(&self) -> Option<ObjectOwner> {
        self.owner
    }

    pub fn entity(&self) -> Option<EntityId> {
        self.owner.map(|o| o.entity)
    }

    pub fn containing_level(&self) -> Option<NodeId> {
        self.owner.map(|o| o.level)
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn set_hook(&mut self, hook: impl ObjectHook + 'static) {
        self.hook = Some(Box::new(hook));
    }

    pub fn clear_hook(&mut self) {
        self.hook = None;
    }

    // --- Children ---

    fn slots(&self) -> impl Iterator<Item = &ComponentNode> {
        self.components.iter().flatten()
    }

    fn slots_mut(&mut self) -> impl Iterator<Item = &mut ComponentNode> {
        self.components.iter_mut().flatten()
    }

    pub fn len(&self) -> usize {
        self.slots().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn component_ids(&self) -> Vec<NodeId> {
        self.slots().map(|n| n.base.id).collect()
    }

    /// Attaches a component. Only one component per concrete type is kept:
    /// lookups by type assume uniqueness, so a second one is rejected.
    pub fn try_add(&mut self, node: impl Into<ComponentNode>) -> Result<NodeId, SceneError> {
        let mut node = node.into();

        if node.base.owner.is_some() || self.slots().any(|n| n.base.id == node.base.id) {
            return Err(SceneError::AlreadyOwned { component: node.type_name().to_string() });
        }

        let type_id = node.behavior.as_any().type_id();
        if self.slots().any(|n| n.behavior.as_any().type_id() == type_id) {
            return Err(SceneError::DuplicateComponent {
                object: self.name.clone(),
                component: node.type_name(),
            });
        }

        node.base.owner = Some(self.id);
        node.base.render = self.render.clone();
        let id = node.base.id;
        self.components.push(Some(node));
        Ok(id)
    }

    /// Like [`GameObject::try_add`], with duplicates ignored and rejections logged.
    pub fn add(&mut self, node: impl Into<ComponentNode>) -> Option<NodeId> {
        match self.try_add(node) {
            Ok(id) => Some(id),
            Err(SceneError::AlreadyOwned { .. }) => None,
            Err(err) => {
                warn!(%err, "component rejected");
                None
            }
        }
    }

    /// Unlinks a component of an object that is not in a level. Components
    /// of a live object must go through `Level::remove_component` so their
    /// `remove` hook can run.
    pub fn remove(&mut self, id: NodeId) -> Option<ComponentNode> {
        if self.owner.is_some() {
            error!(err = %SceneError::LiveObject { object: self.name.clone() }, "component not removed");
            return None;
        }
        let index = self.index_of(id)?;
        let mut node = self.components.remove(index)?;
        node.base.owner = None;
        node.base.render = None;
        Some(node)
    }

    fn index_of(&self, id: NodeId) -> Option<usize> {
        self.components
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|n| n.base.id == id))
    }

    pub fn component<T: Component + 'static>(&self) -> Option<&T> {
        self.slots().find_map(|n| n.behavior.as_any().downcast_ref::<T>())
    }

    pub fn component_mut<T: Component + 'static>(&mut self) -> Option<&mut T> {
        self.slots_mut()
            .find_map(|n| n.behavior.as_any_mut().downcast_mut::<T>())
    }

    pub fn has<T: Component + 'static>(&self) -> bool {
        self.component::<T>().is_some()
    }

    /// First component with the damage capability.
    pub fn damageable_mut(&mut self) -> Option<&mut dyn Damageable> {
        self.slots_mut().find_map(|n| n.behavior.as_damageable())
    }

    pub fn renderables(&self) -> impl Iterator<Item = &dyn Renderable> + '_ {
        self.slots().filter_map(|n| n.behavior.as_renderable())
    }

    // --- Lifecycle ---

    fn with_component<R>(
        &mut self,
        index: usize,
        level: &mut Level,
        f: impl FnOnce(&mut dyn Component, &mut ComponentCtx<'_>) -> R,
    ) -> Option<R> {
        let mut node = self.components.get_mut(index)?.take()?;
        let result = {
            let ComponentNode { base, behavior } = &mut node;
            let mut cx = ComponentCtx::new(level, self, base);
            f(behavior.as_mut(), &mut cx)
        };
        if let Some(slot) = self.components.get_mut(index) {
            *slot = Some(node);
        }
        Some(result)
    }

    pub(crate) fn compact(&mut self) {
        self.components.retain(Option::is_some);
    }

    /// Runs `create` on every component not created yet.
    pub fn try_create(&mut self, level: &mut Level) -> Result<(), SceneError> {
        match self.owner {
            Some(owner) if owner.level == level.id() => {}
            _ => return Err(SceneError::Unowned { name: self.name.clone() }),
        }

        for index in 0..self.components.len() {
            self.with_component(index, level, create_behavior);
        }
        self.created = true;
        self.compact();
        Ok(())
    }

    pub fn create(&mut self, level: &mut Level) {
        if let Err(err) = self.try_create(level) {
            error!(%err, "create skipped");
        }
    }

    /// Runs the hook, then every live component in insertion order.
    /// Components added after creation are created on their first update.
    /// Detached objects skip silently.
    pub fn update(&mut self, level: &mut Level, dt: f32) {
        if self.owner.is_none() || !self.created {
            return;
        }
        if let Some(hook) = self.hook.as_mut() {
            hook.run(&mut self.transform, dt);
        }

        for index in 0..self.components.len() {
            self.with_component(index, level, |behavior, cx| {
                create_behavior(behavior, cx);
                behavior.update(cx, dt);
            });
        }
        self.compact();
    }

    pub(crate) fn remove_component_in(&mut self, level: &mut Level, id: NodeId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.with_component(index, level, remove_behavior);
        self.components[index] = None;
        true
    }

    pub(crate) fn remove_all(&mut self, level: &mut Level) {
        for index in 0..self.components.len() {
            self.with_component(index, level, remove_behavior);
        }
        self.created = false;
    }

    pub(crate) fn attach_to(&mut self, owner: ObjectOwner, render: SharedRenderWorld) {
        for node in self.slots_mut() {
            node.base.render = Some(render.clone());
        }
        self.render = Some(render);
        self.owner = Some(owner);
    }

    pub(crate) fn detach_from_level(&mut self) {
        for node in self.slots_mut() {
            node.base.render = None;
        }
        self.render = None;
        self.owner = None;
        self.created = false;
    }
}

fn create_behavior(behavior: &mut dyn Component, cx: &mut ComponentCtx<'_>) {
    if !cx.base_mut().created {
        behavior.create(cx);
        cx.base_mut().created = true;
    }
}

fn remove_behavior(behavior: &mut dyn Component, cx: &mut ComponentCtx<'_>) {
    if cx.base_mut().created {
        behavior.remove(cx);
        cx.base_mut().created = false;
    }
}

impl Clone for GameObject {
    /// Deep copy: new identity, cloned components and hook, detached.
    fn clone(&self) -> Self {
        let id = NodeId::new();
        let components = self
            .slots()
            .map(|n| {
                let mut copy = n.duplicate();
                copy.base.owner = Some(id);
                Some(copy)
            })
            .collect();

        Self {
            id,
            name: self.name.clone(),
            transform: self.transform,
            components,
            hook: self.hook.as_ref().map(|h| h.clone_hook()),
            owner: None,
            render: None,
            created: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use super::*;
    use crate::testing::level;

    #[derive(Clone, Default)]
    struct Counter {
        updates: u32,
        created: bool,
    }

    impl Component for Counter {
        fn create(&mut self, _cx: &mut ComponentCtx<'_>) {
            self.created = true;
        }
        fn update(&mut self, _cx: &mut ComponentCtx<'_>, _dt: f32) {
            self.updates += 1;
        }
        fn clone_box(&self) -> Box<dyn Component> {
            Box::new(Counter::default())
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[derive(Clone)]
    struct Marker;

    impl Component for Marker {
        fn clone_box(&self) -> Box<dyn Component> {
            Box::new(Marker)
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn unowned_object_ignores_create_and_update() {
        let mut level = level();
        let mut object = GameObject::new("Loose");
        object.add(Counter::default());

        assert_eq!(
            object.try_create(&mut level),
            Err(SceneError::Unowned { name: "Loose".into() })
        );
        object.update(&mut level, 0.1);

        let counter = object.component::<Counter>().unwrap();
        assert!(!counter.created);
        assert_eq!(counter.updates, 0);
    }

    #[test]
    fn second_component_of_a_type_is_rejected() {
        let mut object = GameObject::new("Crate");
        assert!(object.add(Counter::default()).is_some());
        assert!(object.add(Marker).is_some());
        assert!(object.add(Counter::default()).is_none());
        assert_eq!(object.len(), 2);
        assert!(matches!(
            object.try_add(Marker),
            Err(SceneError::DuplicateComponent { .. })
        ));
    }

    #[test]
    fn detached_remove_unlinks_and_is_idempotent() {
        let mut object = GameObject::new("Crate");
        let id = object.add(Marker).unwrap();
        let node = object.remove(id).unwrap();
        assert!(node.base().owner().is_none());
        assert!(object.remove(id).is_none());
        assert!(object.is_empty());
    }

    #[test]
    fn live_object_updates_components_and_runs_hook() {
        let mut level = level();
        let mut object = GameObject::new("Mover");
        object.add(Counter::default());
        object.set_hook(|t: &mut Transform, dt: f32| t.position.x += dt);
        let id = level.add(object);
        level.create().ok();

        level.advance(0.25);
        level.advance(0.25);

        let object = level.object(id).unwrap();
        assert!((object.position().x - 0.5).abs() < 1e-6);
        let counter = object.component::<Counter>().unwrap();
        assert!(counter.created);
        assert_eq!(counter.updates, 2);
    }

    #[test]
    fn component_added_after_create_is_created_on_first_update() {
        let mut level = level();
        let id = level.add(GameObject::new("Late"));
        level.create().ok();
        level.object_mut(id).unwrap().add(Counter::default());

        level.advance(0.1);
        let counter = level.component::<Counter>(id).unwrap();
        assert!(counter.created);
        assert_eq!(counter.updates, 1);
    }

    #[test]
    fn clones_have_independent_hooks_and_fresh_components() {
        let mut level = level();
        let mut original = GameObject::new("Ticker");
        let mut ticks = 0u32;
        original.set_hook(move |t: &mut Transform, _dt: f32| {
            ticks += 1;
            t.position.y = ticks as f32;
        });
        original.add(Counter { updates: 7, created: true });

        let copy = original.clone();
        assert_ne!(copy.id(), original.id());
        assert_eq!(copy.component::<Counter>().unwrap().updates, 0);

        let a = level.add(original);
        level.create().ok();
        level.advance(0.1);
        level.advance(0.1);
        let b = level.add(copy);
        level.advance(0.1);

        assert_eq!(level.object(a).unwrap().position().y, 3.0);
        assert_eq!(level.object(b).unwrap().position().y, 1.0);
    }

    #[test]
    fn containing_level_follows_attachment() {
        let mut level = level();
        let object = GameObject::new("Crate");
        assert_eq!(object.containing_level(), None);
        let id = level.add(object);
        assert_eq!(level.object(id).unwrap().containing_level(), Some(level.id()));
        let object = level.remove(id).unwrap();
        assert_eq!(object.containing_level(), None);
    }
}
