// crates/engine_ecs/src/component.rs

use std::any::{type_name, Any};
use std::time::Duration;

use engine_shared::{RenderHandle, Services, SharedRenderWorld, Transform, Visual};
use tracing::error;

use crate::entity::{EntityId, NodeId};
use crate::game_object::GameObject;
use crate::level::Level;
use crate::scheduler::Scheduler;

// ==================================================================================
// 1. CAPABILITIES
// ==================================================================================

/// Result of handing damage to a [`Damageable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Nothing happened (immune, already dead).
    Ignored,
    /// Damage taken; an immunity window may follow.
    Wounded { immunity: Option<Duration> },
    /// Health ran out. `despawn` asks the level to drop the entity.
    Lethal { despawn: bool },
}

impl DamageOutcome {
    pub fn is_lethal(&self) -> bool {
        matches!(self, DamageOutcome::Lethal { .. })
    }
}

pub trait Damageable {
    fn apply_damage(&mut self, amount: i32) -> DamageOutcome;
    fn health(&self) -> i32;
    /// Called when the immunity window granted by a wound elapses.
    fn end_immunity(&mut self) {}
}

pub trait Renderable {
    fn render_handle(&self) -> Option<RenderHandle>;
    /// Radius of the sphere used for hit tests around the owner's position.
    fn hit_radius(&self) -> f32;
}

// ==================================================================================
// 2. COMPONENT TRAIT
// ==================================================================================

/// Polymorphic unit of behavior owned by a [`GameObject`].
///
/// Lifecycle hooks receive a [`ComponentCtx`] granting access to the owning
/// object and its level. Capabilities are exposed through the `as_*`
/// accessors; containers never inspect concrete types to find them.
pub trait Component {
    fn create(&mut self, _cx: &mut ComponentCtx<'_>) {}
    fn remove(&mut self, _cx: &mut ComponentCtx<'_>) {}
    fn update(&mut self, _cx: &mut ComponentCtx<'_>, _dt: f32) {}

    /// Fresh, not yet created copy of this component.
    fn clone_box(&self) -> Box<dyn Component>;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn as_damageable(&mut self) -> Option<&mut dyn Damageable> {
        None
    }

    fn as_renderable(&self) -> Option<&dyn Renderable> {
        None
    }

    fn type_name(&self) -> &'static str {
        type_name::<Self>()
    }
}

/// Per-instance state every component carries regardless of its kind.
#[derive(Clone)]
pub struct ComponentBase {
    pub(crate) id: NodeId,
    pub(crate) transform: Transform,
    pub(crate) owner: Option<NodeId>,
    pub(crate) render: Option<SharedRenderWorld>,
    pub(crate) created: bool,
}

impl ComponentBase {
    fn detached(transform: Transform) -> Self {
        Self {
            id: NodeId::new(),
            transform,
            owner: None,
            render: None,
            created: false,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    pub fn is_created(&self) -> bool {
        self.created
    }
}

/// A component together with its base state, as stored by a game object.
pub struct ComponentNode {
    pub(crate) base: ComponentBase,
    pub(crate) behavior: Box<dyn Component>,
}

impl ComponentNode {
    pub fn new(behavior: impl Component + 'static) -> Self {
        Self::with_transform(behavior, Transform::IDENTITY)
    }

    pub fn with_transform(behavior: impl Component + 'static, transform: Transform) -> Self {
        Self {
            base: ComponentBase::detached(transform),
            behavior: Box::new(behavior),
        }
    }

    pub fn id(&self) -> NodeId {
        self.base.id
    }

    pub fn base(&self) -> &ComponentBase {
        &self.base
    }

    pub fn behavior(&self) -> &dyn Component {
        self.behavior.as_ref()
    }

    pub fn type_name(&self) -> &'static str {
        self.behavior.type_name()
    }

    /// Deep copy with a new identity, detached and uncreated.
    pub fn duplicate(&self) -> Self {
        Self {
            base: ComponentBase::detached(self.base.transform),
            behavior: self.behavior.clone_box(),
        }
    }
}

impl<C: Component + 'static> From<C> for ComponentNode {
    fn from(behavior: C) -> Self {
        Self::new(behavior)
    }
}

// ==================================================================================
// 3. LIFECYCLE CONTEXT
// ==================================================================================

/// Access a component gets while one of its hooks runs: its own base state,
/// the owning object (with this component checked out) and the level.
pub struct ComponentCtx<'a> {
    level: &'a mut Level,
    object: &'a mut GameObject,
    base: &'a mut ComponentBase,
}

impl<'a> ComponentCtx<'a> {
    pub(crate) fn new(
        level: &'a mut Level,
        object: &'a mut GameObject,
        base: &'a mut ComponentBase,
    ) -> Self {
        Self { level, object, base }
    }

    pub fn id(&self) -> NodeId {
        self.base.id
    }

    pub fn level(&mut self) -> &mut Level {
        &mut *self.level
    }

    pub fn level_ref(&self) -> &Level {
        &*self.level
    }

    pub fn object(&mut self) -> &mut GameObject {
        &mut *self.object
    }

    pub fn object_ref(&self) -> &GameObject {
        &*self.object
    }

    /// Handle of the owning object inside its level.
    pub fn entity(&self) -> Option<EntityId> {
        self.object.entity()
    }

    /// Walks component -> object -> level.
    pub fn containing_level(&self) -> Option<NodeId> {
        self.base.owner?;
        self.object.containing_level()
    }

    pub fn local(&self) -> &Transform {
        &self.base.transform
    }

    pub fn local_mut(&mut self) -> &mut Transform {
        &mut self.base.transform
    }

    /// Local transform composed with the owner's.
    pub fn world_transform(&self) -> Transform {
        self.base.transform.compose(self.object.transform())
    }

    pub fn services(&self) -> &Services {
        self.level.services()
    }

    pub fn scheduler(&mut self) -> &mut Scheduler {
        self.level.scheduler_mut()
    }

    pub fn render(&self) -> Option<SharedRenderWorld> {
        self.base.render.clone()
    }

    pub fn attach(&self, visual: Visual) -> Option<RenderHandle> {
        match &self.base.render {
            Some(render) => Some(render.borrow_mut().attach(visual)),
            None => {
                error!(object = %self.object.name(), "component has no render world to attach to");
                None
            }
        }
    }

    pub fn detach(&self, handle: RenderHandle) {
        if let Some(render) = &self.base.render {
            render.borrow_mut().detach(handle);
        }
    }

    pub fn sync(&self, handle: RenderHandle, transform: &Transform) {
        if let Some(render) = &self.base.render {
            render.borrow_mut().set_transform(handle, transform);
        }
    }

    pub fn set_visible(&self, handle: RenderHandle, visible: bool) {
        if let Some(render) = &self.base.render {
            render.borrow_mut().set_visible(handle, visible);
        }
    }

    /// Removes a sibling component (running its `remove` hook).
    pub fn remove_sibling(&mut self, id: NodeId) -> bool {
        self.object.remove_component_in(&mut *self.level, id)
    }
}

impl ComponentCtx<'_> {
    pub(crate) fn base_mut(&mut self) -> &mut ComponentBase {
        &mut *self.base
    }
}
