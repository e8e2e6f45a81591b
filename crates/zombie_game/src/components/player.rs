// crates/zombie_game/src/components/player.rs

use std::f32::consts::{FRAC_PI_2, PI};
use std::time::Duration;

use engine_ecs::{Component, ComponentCtx, DamageOutcome, Damageable, EntityId, Level};
use engine_shared::glam::Vec3;
use engine_shared::{
    planar_distance, text_ids, yaw_right, Action, Ray, RenderHandle, Services, SharedInput,
    Transform, Visual,
};
use tracing::{debug, info};

use super::mystery_box::{self, MysteryBox};
use super::{any_plumbing, MYSTERY_BOX};
use crate::combat::look_direction;
use crate::config::{ms, PlayerConfig};

/// First-person movement, look, score and health of the player.
#[derive(Clone)]
pub struct PlayerController {
    input: SharedInput,
    cfg: PlayerConfig,
    score: u32,
    health: i32,
    immune: bool,
    dead: bool,
    walk: f32,
    prompt: String,
    services: Option<Services>,
    target: Option<RenderHandle>,
    hitmarker: Option<RenderHandle>,
    flashlight: Option<RenderHandle>,
}

impl PlayerController {
    pub fn new(input: SharedInput, cfg: PlayerConfig) -> Self {
        let health = cfg.health;
        Self {
            input,
            cfg,
            score: 0,
            health,
            immune: false,
            dead: false,
            walk: 0.0,
            prompt: String::new(),
            services: None,
            target: None,
            hitmarker: None,
            flashlight: None,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn add_score(&mut self, points: u32) {
        self.score += points;
        self.update_score_text();
    }

    /// Spends `points` if the score covers them.
    pub fn spend(&mut self, points: u32) -> bool {
        if self.score < points {
            return false;
        }
        self.score -= points;
        self.update_score_text();
        true
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_immune(&self) -> bool {
        self.immune
    }

    /// Head bob phase in radians, wrapped back to zero at a quarter turn.
    pub fn walk_phase(&self) -> f32 {
        self.walk
    }

    pub fn hitmarker(&self) -> Option<RenderHandle> {
        self.hitmarker
    }

    fn update_score_text(&self) {
        if let Some(services) = &self.services {
            services.set_text(text_ids::SCORE, &self.score.to_string());
        }
    }

    fn set_prompt(&mut self, cx: &ComponentCtx<'_>, text: String) {
        if self.prompt != text {
            cx.services().set_text(text_ids::INFO, &text);
            self.prompt = text;
        }
    }

    fn offer_box(&mut self, cx: &mut ComponentCtx<'_>, position: Vec3) {
        let level = cx.level_ref();
        let nearby = level.find_first_by_name_prefix(MYSTERY_BOX).filter(|id| {
            level
                .object(*id)
                .is_some_and(|b| planar_distance(position, b.position()) <= self.cfg.box_reach)
        });
        let Some(box_id) = nearby else {
            self.set_prompt(cx, String::new());
            return;
        };

        let cost = self.cfg.box_cost;
        let text = if self.score >= cost {
            "Press E to open the box".to_string()
        } else {
            format!("You need at least {cost} points")
        };
        self.set_prompt(cx, text);

        let opened = cx
            .level_ref()
            .component::<MysteryBox>(box_id)
            .map_or(true, MysteryBox::is_opened);
        let pressed = self.input.borrow_mut().is_freshly_pressed(Action::Use);
        if pressed && !opened && self.spend(cost) {
            mystery_box::open(cx.level(), box_id);
        }
    }

    fn sync_visuals(&self, cx: &ComponentCtx<'_>, position: Vec3, look: Vec3, camera: &Transform) {
        let ahead = position + look * 0.5;
        if let Some(handle) = self.target {
            cx.sync(handle, &Transform::from_position(ahead).with_scale(Vec3::splat(0.02)));
        }
        if let Some(handle) = self.hitmarker {
            cx.sync(handle, &Transform::from_position(ahead).with_scale(Vec3::splat(0.05)));
        }
        if let Some(handle) = self.flashlight {
            cx.sync(handle, &Transform::from_position(position));
        }
        if let Some(render) = cx.render() {
            render.borrow_mut().set_camera(camera);
        }
    }
}

impl Component for PlayerController {
    fn create(&mut self, cx: &mut ComponentCtx<'_>) {
        self.services = Some(cx.services().clone());
        self.target = cx.attach(Visual::Sprite { texture: "target".into(), scale: 0.02 });
        self.hitmarker = cx.attach(Visual::Sprite { texture: "hitmarker".into(), scale: 0.05 });
        if let Some(handle) = self.hitmarker {
            cx.set_visible(handle, false);
        }
        self.flashlight = cx.attach(Visual::PointLight { intensity: 0.25, range: 5.0 });
        self.update_score_text();
    }

    fn remove(&mut self, cx: &mut ComponentCtx<'_>) {
        for handle in [self.target.take(), self.hitmarker.take(), self.flashlight.take()]
            .into_iter()
            .flatten()
        {
            cx.detach(handle);
        }
    }

    fn update(&mut self, cx: &mut ComponentCtx<'_>, dt: f32) {
        let (drag, [up, down, left, right, look_left, look_right]) = {
            let mut input = self.input.borrow_mut();
            let held = [
                Action::Up,
                Action::Down,
                Action::Left,
                Action::Right,
                Action::LookLeft,
                Action::LookRight,
            ]
            .map(|a| input.is_held(a));
            (input.take_pointer_delta(), held)
        };

        let mut transform = *cx.object_ref().transform();
        if self.dead {
            let look = look_direction(transform.yaw());
            self.sync_visuals(cx, transform.position, look, &transform);
            return;
        }

        let mut yaw = transform.yaw() - drag * self.cfg.drag_sensitivity;
        if look_left {
            yaw += self.cfg.look_speed * dt;
        }
        if look_right {
            yaw -= self.cfg.look_speed * dt;
        }
        let look = look_direction(yaw);
        let side = yaw_right(yaw);
        let position = transform.position;

        // One direction per frame, forward first.
        let step = if up {
            let ray = Ray::new(position + Vec3::Y * 0.1, look);
            let blocked = cx.level_ref().first_obstacle_hit(&ray, 0.1, 0.5).is_some();
            if !blocked {
                self.walk += dt / 2.0;
            }
            if blocked { Vec3::ZERO } else { look }
        } else if down {
            self.walk += dt;
            -look
        } else if right {
            self.walk += dt;
            side
        } else if left {
            self.walk += dt;
            -side
        } else {
            self.walk = (self.walk - dt * 2.0).max(0.0);
            Vec3::ZERO
        };

        let next = position + step * self.cfg.speed * dt;
        if next.x.abs() < self.cfg.bound {
            transform.position.x = next.x;
        }
        if next.z.abs() < self.cfg.bound {
            transform.position.z = next.z;
        }
        if self.walk >= FRAC_PI_2 {
            self.walk = 0.0;
        }
        let pitch = (self.walk * 4.0).sin() * PI / 320.0;
        transform.rotation = Vec3::new(pitch, yaw, 0.0);
        *cx.object().transform_mut() = transform;

        self.offer_box(cx, transform.position);
        self.sync_visuals(cx, transform.position, look, &transform);
    }

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(Self::new(self.input.clone(), self.cfg.clone()))
    }

    any_plumbing!();

    fn as_damageable(&mut self) -> Option<&mut dyn Damageable> {
        Some(self)
    }
}

impl Damageable for PlayerController {
    fn apply_damage(&mut self, amount: i32) -> DamageOutcome {
        if self.immune || self.dead {
            return DamageOutcome::Ignored;
        }
        self.health -= amount;
        debug!(health = self.health, "player took damage");
        if let Some(services) = &self.services {
            services.play("playerHit", 0.1);
        }

        self.immune = true;
        if self.health <= 0 {
            self.dead = true;
            info!(score = self.score, "player died");
            DamageOutcome::Lethal { despawn: false }
        } else {
            DamageOutcome::Wounded { immunity: Some(ms(self.cfg.immunity_ms)) }
        }
    }

    fn health(&self) -> i32 {
        self.health
    }

    fn end_immunity(&mut self) {
        if !self.dead {
            self.immune = false;
        }
    }
}

/// Flashes the player's hitmarker for `duration`.
pub fn show_hitmarker(level: &mut Level, player: EntityId, duration: Duration) {
    let Some(handle) = level.component::<PlayerController>(player).and_then(|p| p.hitmarker()) else {
        return;
    };
    level.render().borrow_mut().set_visible(handle, true);
    level.scheduler_mut().after(duration, Some(player), move |level| {
        level.render().borrow_mut().set_visible(handle, false);
    });
}
