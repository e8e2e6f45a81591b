// crates/zombie_game/src/components/gun.rs

use std::f32::consts::PI;

use engine_ecs::{Component, ComponentCtx, EntityId, Level, Step, Task};
use engine_shared::glam::Vec3;
use engine_shared::{yaw_forward, yaw_right, Action, AssetSource, ModelAsset, Ray, SharedInput};
use tracing::debug;

use super::animation::AnimatedModel;
use super::any_plumbing;
use super::player::{show_hitmarker, PlayerController};
use crate::combat::{deal_damage, look_direction, shot_target};
use crate::config::{ms, GunConfig};

pub const GUN_MODEL: &str = "gun";
const FIRE_SOUND: &str = "gunFire";

/// Hitscan weapon held by the player object.
#[derive(Clone)]
pub struct PlayerGun {
    input: SharedInput,
    cfg: GunConfig,
    mag: u32,
    has_shot: bool,
    reloading: bool,
    model: AnimatedModel,
}

impl PlayerGun {
    pub fn new(input: SharedInput, cfg: GunConfig, models: &dyn AssetSource<ModelAsset>) -> Self {
        let mut model = AnimatedModel::from_source(models, GUN_MODEL).with_poses(&["reload", "shoot"]);
        model.anim_mut().set_repetitions(Some(1));
        model.local_mut().scale = Vec3::splat(0.25);
        model.local_mut().rotation.y = -PI / 2.0 - PI / 8.0;

        Self {
            input,
            mag: cfg.capacity,
            cfg,
            has_shot: false,
            reloading: false,
            model,
        }
    }

    pub fn mag(&self) -> u32 {
        self.mag
    }

    pub fn capacity(&self) -> u32 {
        self.cfg.capacity
    }

    pub fn is_reloading(&self) -> bool {
        self.reloading
    }

    pub fn has_shot(&self) -> bool {
        self.has_shot
    }

    pub fn model(&self) -> &AnimatedModel {
        &self.model
    }

    /// Takes one round for a shot. Rejected while a shot is in flight,
    /// while reloading, or with an empty magazine.
    pub fn begin_shot(&mut self) -> bool {
        if self.has_shot || self.reloading || self.mag == 0 {
            return false;
        }
        self.mag -= 1;
        self.has_shot = true;
        true
    }

    pub fn end_shot(&mut self) {
        self.has_shot = false;
    }

    /// Starts a reload. Rejected while reloading or with a full magazine.
    pub fn begin_reload(&mut self) -> bool {
        if self.reloading || self.mag >= self.cfg.capacity {
            return false;
        }
        self.reloading = true;
        true
    }

    pub fn finish_reload(&mut self) {
        self.mag = self.cfg.capacity;
        self.reloading = false;
    }

    fn reload(&mut self, cx: &mut ComponentCtx<'_>, owner: EntityId) {
        if !self.begin_reload() {
            return;
        }
        self.model.anim_mut().play("reload");
        cx.services().play("gunReload", 1.0);
        cx.scheduler().after(ms(self.cfg.reload_ms), Some(owner), move |level| {
            if let Some(gun) = level.component_mut::<PlayerGun>(owner) {
                gun.finish_reload();
            }
        });
    }

    fn shoot(&mut self, cx: &mut ComponentCtx<'_>, owner: EntityId) {
        if !self.begin_shot() {
            return;
        }
        self.model.anim_mut().play("shoot");
        cx.services().play(FIRE_SOUND, 1.0);
        debug!(mag = self.mag, "current munitions");

        let eye = cx.object_ref().transform();
        let ray = Ray::new(eye.position, look_direction(eye.yaw()));
        let task = ShotTask { shooter: owner, ray, cfg: self.cfg.clone(), stage: ShotStage::Hit };
        cx.scheduler().spawn(ms(self.cfg.hit_delay_ms), Some(owner), task);
    }
}

impl Component for PlayerGun {
    fn create(&mut self, cx: &mut ComponentCtx<'_>) {
        cx.local_mut().position.y = -0.2;
        self.model.create(cx);
    }

    fn remove(&mut self, cx: &mut ComponentCtx<'_>) {
        self.model.remove(cx);
    }

    fn update(&mut self, cx: &mut ComponentCtx<'_>, dt: f32) {
        let Some(owner) = cx.entity() else {
            return;
        };

        // Presses only count while the action is possible.
        let wants_reload = !self.reloading
            && self.mag < self.cfg.capacity
            && self.input.borrow_mut().is_freshly_pressed(Action::Reload);
        if wants_reload {
            self.reload(cx, owner);
        }
        let wants_shot = !self.has_shot
            && !self.reloading
            && self.mag > 0
            && self.input.borrow_mut().is_freshly_pressed(Action::Shoot);
        if wants_shot {
            self.shoot(cx, owner);
        }

        let yaw = cx.object_ref().transform().yaw();
        let offset = -0.3 * yaw_forward(yaw) + 0.5 * yaw_right(yaw);
        let local = cx.local_mut();
        local.position.x = offset.x;
        local.position.z = offset.z;
        self.model.update(cx, dt);
    }

    fn clone_box(&self) -> Box<dyn Component> {
        let mut copy = self.clone();
        copy.mag = self.cfg.capacity;
        copy.has_shot = false;
        copy.reloading = false;
        copy.model = self.model.fresh();
        Box::new(copy)
    }

    any_plumbing!();
}

enum ShotStage {
    Hit,
    Cooldown,
}

/// The ray lands one hit delay after the trigger; the gun can fire again
/// one shoot delay later.
struct ShotTask {
    shooter: EntityId,
    ray: Ray,
    cfg: GunConfig,
    stage: ShotStage,
}

impl Task for ShotTask {
    fn resume(&mut self, level: &mut Level) -> Step {
        match self.stage {
            ShotStage::Hit => {
                resolve_hit(level, self.shooter, &self.ray, &self.cfg);
                self.stage = ShotStage::Cooldown;
                Step::Wait(ms(self.cfg.shoot_delay_ms))
            }
            ShotStage::Cooldown => {
                if let Some(gun) = level.component_mut::<PlayerGun>(self.shooter) {
                    gun.end_shot();
                }
                Step::Done
            }
        }
    }
}

fn resolve_hit(level: &mut Level, shooter: EntityId, ray: &Ray, cfg: &GunConfig) {
    let Some((zombie, distance)) = shot_target(level, ray, 0.1, cfg.range) else {
        debug!("player shot, nothing hit");
        return;
    };
    debug!(?zombie, distance, "player shot a zombie");

    let lethal = deal_damage(level, zombie, cfg.damage).is_lethal();
    let points = cfg.hit_score + if lethal { cfg.kill_bonus } else { 0 };
    if let Some(player) = level.component_mut::<PlayerController>(shooter) {
        player.add_score(points);
    }
    show_hitmarker(level, shooter, ms(cfg.hitmarker_ms));
    level.services().play("hit", 0.1);
}
