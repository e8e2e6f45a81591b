// crates/engine_ecs/src/level.rs

use std::time::Duration;

use engine_shared::{Aabb, Ray, RenderHandle, Services, SharedRenderWorld};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info, trace};

use crate::clock::FrameClock;
use crate::component::Component;
use crate::entity::{EntityId, NodeId};
use crate::error::SceneError;
use crate::game_object::{GameObject, ObjectOwner};
use crate::scheduler::{Scheduler, Step};
use crate::storage::EntityArena;

/// Name of the game object a level resolves as its player.
pub const PLAYER_NAME: &str = "Player";

/// Static box that blocks movement and line of sight.
#[derive(Debug, Clone, Copy)]
pub struct Obstacle {
    pub bounds: Aabb,
    pub handle: Option<RenderHandle>,
}

/// Root of the scene graph.
///
/// Owns its game objects, the frame clock and the task scheduler. A frame is
/// `advance(dt)`: scheduler time moves forward, every object updates in
/// insertion order, then due tasks resume.
pub struct Level {
    id: NodeId,
    services: Services,
    objects: EntityArena<GameObject>,
    player: Option<EntityId>,
    obstacles: Vec<Obstacle>,
    clock: FrameClock,
    scheduler: Scheduler,
    rng: StdRng,
    created: bool,
    // removed while checked out; finished when the checkout ends
    doomed: Vec<EntityId>,
}

impl Level {
    pub fn new(services: Services) -> Self {
        Self::with_clock(services, FrameClock::system())
    }

    pub fn with_clock(services: Services, clock: FrameClock) -> Self {
        Self {
            id: NodeId::new(),
            services,
            objects: EntityArena::new(),
            player: None,
            obstacles: Vec::new(),
            clock,
            scheduler: Scheduler::new(),
            rng: StdRng::from_entropy(),
            created: false,
            doomed: Vec::new(),
        }
    }

    pub fn seed_rng(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn render(&self) -> SharedRenderWorld {
        self.services.render.clone()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Game time elapsed through `advance`.
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn player(&self) -> Option<EntityId> {
        self.player
    }

    // --- Objects ---

    /// Takes ownership of `object`. On a created level the object is
    /// created right away.
    pub fn add(&mut self, object: GameObject) -> EntityId {
        let render = self.render();
        let level = self.id;
        let entity = self.objects.insert(object);
        if let Some(object) = self.objects.get_mut(entity) {
            object.attach_to(ObjectOwner { level, entity }, render);
            debug!(?entity, name = object.name(), "object added");
        }

        if self.created {
            self.with_checked_out(entity, |object, level| object.create(level));
        }
        entity
    }

    /// Runs the object's `remove` lifecycle and hands it back detached.
    /// Pending tasks owned by it are cancelled. Removing an unknown (or
    /// already removed) entity is a no-op. An object removed during its own
    /// update finishes its removal when the update returns, and `None` is
    /// returned.
    ///
    /// The object stays in the level until its components' `remove` hooks
    /// are done.
    pub fn remove(&mut self, entity: EntityId) -> Option<GameObject> {
        if !self.objects.contains(entity) {
            return None;
        }
        let cancelled = self.scheduler.cancel_owned_by(entity);
        if self.player == Some(entity) {
            self.player = None;
        }
        trace!(?entity, cancelled, "removing object");

        if self.objects.is_checked_out(entity) {
            if !self.doomed.contains(&entity) {
                self.doomed.push(entity);
            }
            return None;
        }
        let object = self.objects.checkout(entity)?;
        Some(self.finish_removal(entity, object))
    }

    /// Removal of a checked-out object: hooks first, then the slot.
    fn finish_removal(&mut self, entity: EntityId, mut object: GameObject) -> GameObject {
        object.remove_all(self);
        object.detach_from_level();
        self.objects.remove(entity);
        self.doomed.retain(|e| *e != entity);
        // remove hooks may have scheduled follow-ups
        self.scheduler.cancel_owned_by(entity);
        debug!(name = object.name(), "object removed");
        object
    }

    pub fn clear(&mut self) {
        for entity in self.objects.ids().to_vec() {
            self.remove(entity);
        }
    }

    /// Removes one component of a live object, running its `remove` hook.
    pub fn remove_component(&mut self, entity: EntityId, component: NodeId) -> bool {
        self.with_checked_out(entity, |object, level| {
            let removed = object.remove_component_in(level, component);
            object.compact();
            removed
        })
        .unwrap_or(false)
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.objects.contains(entity)
    }

    /// The object behind `entity`, unless it is currently updating.
    pub fn object(&self, entity: EntityId) -> Option<&GameObject> {
        self.objects.get(entity)
    }

    pub fn object_mut(&mut self, entity: EntityId) -> Option<&mut GameObject> {
        self.objects.get_mut(entity)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> impl Iterator<Item = (EntityId, &GameObject)> {
        self.objects.iter()
    }

    pub fn find_by_name_prefix(&self, prefix: &str) -> Vec<EntityId> {
        self.objects()
            .filter(|(_, o)| o.name().starts_with(prefix))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn find_first_by_name_prefix(&self, prefix: &str) -> Option<EntityId> {
        self.objects()
            .find(|(_, o)| o.name().starts_with(prefix))
            .map(|(id, _)| id)
    }

    pub fn find_by_name(&self, name: &str) -> Vec<EntityId> {
        self.objects()
            .filter(|(_, o)| o.name() == name)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn count_by_name_prefix(&self, prefix: &str) -> usize {
        self.objects()
            .filter(|(_, o)| o.name().starts_with(prefix))
            .count()
    }

    pub fn component<T: Component + 'static>(&self, entity: EntityId) -> Option<&T> {
        self.object(entity)?.component::<T>()
    }

    pub fn component_mut<T: Component + 'static>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.object_mut(entity)?.component_mut::<T>()
    }

    /// First object, in insertion order, holding a `T`.
    pub fn find_with<T: Component + 'static>(&self) -> Option<EntityId> {
        self.objects()
            .find(|(_, o)| o.has::<T>())
            .map(|(id, _)| id)
    }

    pub fn find_component_mut<T: Component + 'static>(&mut self) -> Option<&mut T> {
        let entity = self.find_with::<T>()?;
        self.component_mut::<T>(entity)
    }

    // --- Obstacles ---

    pub fn add_obstacle(&mut self, bounds: Aabb, handle: Option<RenderHandle>) {
        self.obstacles.push(Obstacle { bounds, handle });
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Distance to the nearest obstacle `ray` hits within `[near, far]`.
    pub fn first_obstacle_hit(&self, ray: &Ray, near: f32, far: f32) -> Option<f32> {
        self.obstacles
            .iter()
            .filter_map(|o| ray.hit_aabb(&o.bounds, near, far))
            .min_by(f32::total_cmp)
    }

    // --- Lifecycle ---

    /// Resolves the player and creates every object. A missing player is
    /// reported but the level still comes up.
    pub fn create(&mut self) -> Result<(), SceneError> {
        let player = self.objects().find(|(_, o)| o.name() == PLAYER_NAME).map(|(id, _)| id);
        self.player = player;
        self.created = true;

        for entity in self.objects.ids().to_vec() {
            self.with_checked_out(entity, |object, level| object.create(level));
        }
        info!(objects = self.objects.len(), "level created");

        if self.player.is_none() {
            error!(err = %SceneError::MissingPlayer, "level created without a player");
            return Err(SceneError::MissingPlayer);
        }
        Ok(())
    }

    /// One frame driven by the level's clock.
    pub fn update(&mut self) {
        let dt = self.clock.tick();
        self.advance(dt);
    }

    /// One frame of `dt` seconds, clamped to `[0, max_dt]` of the level's
    /// clock.
    pub fn advance(&mut self, dt: f32) {
        let max_step = Duration::try_from_secs_f32(self.clock.max_dt()).unwrap_or_default();
        let step = Duration::try_from_secs_f32(dt).unwrap_or_default().min(max_step);
        self.scheduler.advance(step);
        let dt = step.as_secs_f32();

        // Objects added during the frame wait for the next one.
        for entity in self.objects.ids().to_vec() {
            self.with_checked_out(entity, |object, level| object.update(level, dt));
        }
        self.run_due_tasks();
    }

    /// Moves the object out of the arena so `f` can use the level alongside
    /// it. If `f` removed the object, its removal completes here.
    pub fn with_checked_out<R>(
        &mut self,
        entity: EntityId,
        f: impl FnOnce(&mut GameObject, &mut Level) -> R,
    ) -> Option<R> {
        let mut object = self.objects.checkout(entity)?;
        let result = f(&mut object, self);
        if self.doomed.contains(&entity) {
            self.finish_removal(entity, object);
        } else if let Err(object) = self.objects.restore(entity, object) {
            error!(name = object.name(), "checked-out object lost its slot");
        }
        Some(result)
    }

    fn run_due_tasks(&mut self) {
        while let Some(mut task) = self.scheduler.pop_due() {
            if task.owner().is_some_and(|owner| !self.objects.contains(owner)) {
                trace!(task = task.label(), "owner gone, task dropped");
                continue;
            }
            match task.resume(self) {
                Step::Wait(wait) => {
                    if task.owner().is_some_and(|owner| !self.objects.contains(owner)) {
                        trace!(task = task.label(), "owner removed while running");
                        continue;
                    }
                    self.scheduler.requeue(task, wait);
                }
                Step::Done => trace!(task = task.label(), "task done"),
            }
        }
    }
}
