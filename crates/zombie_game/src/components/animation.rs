// crates/zombie_game/src/components/animation.rs
//! Pose-named clip playback for models, and the component that shows one.

use std::collections::BTreeMap;

use engine_ecs::{Component, ComponentCtx, Renderable};
use engine_shared::glam::Vec3;
use engine_shared::{AssetSource, ClipInfo, ModelAsset, RenderHandle, Transform, Visual};
use tracing::{debug, warn};

use super::any_plumbing;

#[derive(Debug, Clone, PartialEq)]
pub struct ClipPlayback {
    clip: ClipInfo,
    time: f32,
    playing: bool,
    /// `None` loops forever.
    repetitions: Option<u32>,
    completed: u32,
}

impl ClipPlayback {
    fn new(clip: ClipInfo) -> Self {
        Self { clip, time: 0.0, playing: false, repetitions: None, completed: 0 }
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    fn advance(&mut self, dt: f32) {
        if !self.playing {
            return;
        }
        let duration = self.clip.duration;
        if duration <= 0.0 {
            if self.repetitions.is_some() {
                self.playing = false;
            }
            return;
        }

        self.time += dt;
        while self.time >= duration {
            self.completed += 1;
            if self.repetitions.is_some_and(|n| self.completed >= n) {
                self.time = duration;
                self.playing = false;
                return;
            }
            self.time -= duration;
        }
    }
}

/// Names the clips of a model.
///
/// Poses are queued by name, then [`AnimationSystem::compile`] pairs them
/// with the model's clips in file order.
#[derive(Debug, Clone, Default)]
pub struct AnimationSystem {
    clips: Vec<ClipInfo>,
    poses: Vec<String>,
    anims: BTreeMap<String, ClipPlayback>,
}

impl AnimationSystem {
    pub fn new(clips: Vec<ClipInfo>) -> Self {
        Self { clips, ..Self::default() }
    }

    pub fn add_pose(&mut self, name: &str) {
        if !self.poses.iter().any(|p| p == name) {
            self.poses.push(name.to_string());
        }
    }

    pub fn poses(&self) -> &[String] {
        &self.poses
    }

    /// Binds pending poses to clips (up to the shorter list) and clears the
    /// pending poses.
    pub fn compile(&mut self) {
        for (pose, clip) in self.poses.drain(..).zip(self.clips.iter()) {
            self.anims.insert(pose, ClipPlayback::new(clip.clone()));
        }
    }

    pub fn set_repetitions(&mut self, repetitions: Option<u32>) {
        for anim in self.anims.values_mut() {
            anim.repetitions = repetitions;
        }
    }

    /// Restarts `name` from its first frame.
    pub fn play(&mut self, name: &str) -> bool {
        match self.anims.get_mut(name) {
            Some(anim) => {
                anim.time = 0.0;
                anim.completed = 0;
                anim.playing = true;
                true
            }
            None => {
                warn!(name, "can't find animation");
                false
            }
        }
    }

    pub fn anim(&self, name: &str) -> Option<&ClipPlayback> {
        self.anims.get(name)
    }

    pub fn len(&self) -> usize {
        self.anims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anims.is_empty()
    }

    pub fn advance(&mut self, dt: f32) {
        for anim in self.anims.values_mut() {
            anim.advance(dt);
        }
    }
}

/// Shows a model asset at its owner, optionally offset by `local`.
#[derive(Debug, Clone)]
pub struct AnimatedModel {
    asset: String,
    model: ModelAsset,
    anim: AnimationSystem,
    local: Transform,
    autoplay: Option<String>,
    handle: Option<RenderHandle>,
}

impl AnimatedModel {
    pub fn new(asset: impl Into<String>, model: ModelAsset) -> Self {
        let anim = AnimationSystem::new(model.clips.clone());
        Self {
            asset: asset.into(),
            model,
            anim,
            local: Transform::IDENTITY,
            autoplay: None,
            handle: None,
        }
    }

    /// Looks `asset` up in `models`. A missing model still renders by name,
    /// without clips.
    pub fn from_source(models: &dyn AssetSource<ModelAsset>, asset: &str) -> Self {
        let model = models.get(asset).unwrap_or_else(|| {
            debug!(asset, "model not loaded, using an empty descriptor");
            ModelAsset::default()
        });
        Self::new(asset, model)
    }

    pub fn with_poses(mut self, poses: &[&str]) -> Self {
        for pose in poses {
            self.anim.add_pose(pose);
        }
        self.anim.compile();
        self
    }

    pub fn autoplay(mut self, pose: &str) -> Self {
        self.autoplay = Some(pose.to_string());
        self
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }

    pub fn anim(&self) -> &AnimationSystem {
        &self.anim
    }

    pub fn anim_mut(&mut self) -> &mut AnimationSystem {
        &mut self.anim
    }

    pub fn local(&self) -> &Transform {
        &self.local
    }

    pub fn local_mut(&mut self) -> &mut Transform {
        &mut self.local
    }

    /// Copy that isn't shown anywhere yet.
    pub fn fresh(&self) -> Self {
        Self { handle: None, ..self.clone() }
    }

    fn sync(&self, cx: &ComponentCtx<'_>) {
        if let Some(handle) = self.handle {
            cx.sync(handle, &self.local.compose(&cx.world_transform()));
        }
    }
}

impl Component for AnimatedModel {
    fn create(&mut self, cx: &mut ComponentCtx<'_>) {
        if self.handle.is_some() {
            return;
        }
        self.handle = cx.attach(Visual::Model { asset: self.asset.clone() });
        self.sync(cx);
        if let Some(pose) = self.autoplay.clone() {
            self.anim.play(&pose);
        }
    }

    fn remove(&mut self, cx: &mut ComponentCtx<'_>) {
        if let Some(handle) = self.handle.take() {
            cx.detach(handle);
        }
    }

    fn update(&mut self, cx: &mut ComponentCtx<'_>, dt: f32) {
        self.sync(cx);
        self.anim.advance(dt);
    }

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(self.fresh())
    }

    any_plumbing!();

    fn as_renderable(&self) -> Option<&dyn Renderable> {
        Some(self)
    }
}

impl Renderable for AnimatedModel {
    fn render_handle(&self) -> Option<RenderHandle> {
        self.handle
    }

    fn hit_radius(&self) -> f32 {
        self.model.hit_radius
    }
}

pub const ZOMBIE_MODEL: &str = "zombie";

/// The zombie body: idle pose playing from creation, half scale.
pub fn zombie_model(models: &dyn AssetSource<ModelAsset>) -> AnimatedModel {
    let mut model = AnimatedModel::from_source(models, ZOMBIE_MODEL)
        .with_poses(&["idle"])
        .autoplay("idle");
    model.local_mut().scale = Vec3::splat(0.5);
    model
}
