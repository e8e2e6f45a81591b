// crates/zombie_game/src/components/zombie.rs

use engine_ecs::{Component, ComponentCtx, DamageOutcome, Damageable, EntityId, GameObject, Level};
use engine_shared::glam::Vec3;
use engine_shared::{
    planar_distance, yaw_forward, yaw_towards, AssetSource, ModelAsset, RenderHandle, Transform,
    Visual,
};
use tracing::{debug, trace};

use super::animation::zombie_model;
use super::{any_plumbing, ZOMBIE};
use crate::combat::deal_damage;
use crate::config::ZombieConfig;

/// Walks along its facing and, once per sense period, turns toward the
/// player and bites it when close enough.
#[derive(Debug, Clone)]
pub struct ZombieAi {
    cfg: ZombieConfig,
    speed: f32,
    health: i32,
    round: u32,
    sensing: bool,
    dead: bool,
    arrow: Option<RenderHandle>,
}

impl ZombieAi {
    pub fn new(cfg: ZombieConfig, round: u32) -> Self {
        Self {
            speed: cfg.speed_for(round),
            health: cfg.health_for(round),
            cfg,
            round,
            sensing: false,
            dead: false,
            arrow: None,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Back to the walking speed of its round.
    pub fn restore_speed(&mut self) {
        self.speed = self.cfg.speed_for(self.round);
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn is_sensing(&self) -> bool {
        self.sensing
    }
}

impl Component for ZombieAi {
    fn create(&mut self, cx: &mut ComponentCtx<'_>) {
        self.arrow = cx.attach(Visual::Arrow);
    }

    fn remove(&mut self, cx: &mut ComponentCtx<'_>) {
        if let Some(handle) = self.arrow.take() {
            cx.detach(handle);
        }
    }

    fn update(&mut self, cx: &mut ComponentCtx<'_>, dt: f32) {
        let transform = cx.object().transform_mut();
        let step = yaw_forward(transform.yaw()) * self.speed * dt;
        transform.position += step;
        let facing = *transform;

        if let Some(handle) = self.arrow {
            cx.sync(handle, &Transform { scale: Vec3::ONE, ..facing });
        }

        if !self.sensing {
            if let Some(zombie) = cx.entity() {
                self.sensing = true;
                cx.scheduler().after(self.cfg.sense_period(), Some(zombie), move |level| {
                    sense_player(level, zombie)
                });
            }
        }
    }

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(Self::new(self.cfg.clone(), self.round))
    }

    any_plumbing!();

    fn as_damageable(&mut self) -> Option<&mut dyn Damageable> {
        Some(self)
    }
}

impl Damageable for ZombieAi {
    fn apply_damage(&mut self, amount: i32) -> DamageOutcome {
        if self.dead {
            return DamageOutcome::Ignored;
        }
        self.health -= amount;
        if self.health <= 0 {
            self.dead = true;
            debug!("zombie died");
            return DamageOutcome::Lethal { despawn: true };
        }
        DamageOutcome::Wounded { immunity: None }
    }

    fn health(&self) -> i32 {
        self.health
    }
}

fn sense_player(level: &mut Level, zombie: EntityId) {
    let player = level
        .player()
        .and_then(|id| level.object(id).map(|o| (id, o.position())));

    let Some(object) = level.object_mut(zombie) else {
        return;
    };
    let position = object.position();
    let mut bite = None;
    if let Some((player, target)) = player {
        object.transform_mut().rotation.y = yaw_towards(position, target);
        if let Some(ai) = object.component::<ZombieAi>() {
            if planar_distance(position, target) <= ai.cfg.contact_radius {
                bite = Some((player, ai.cfg.contact_damage));
            }
        }
    }
    if let Some(ai) = object.component_mut::<ZombieAi>() {
        ai.sensing = false;
    }

    if let Some((player, damage)) = bite {
        trace!(?zombie, "zombie reached the player");
        deal_damage(level, player, damage);
    }
}

/// A live zombie for `round`, standing at `position`.
pub fn make_zombie(
    position: Vec3,
    round: u32,
    cfg: &ZombieConfig,
    models: &dyn AssetSource<ModelAsset>,
) -> GameObject {
    let mut zombie = GameObject::new(ZOMBIE).at(position);
    zombie.add(zombie_model(models));
    zombie.add(ZombieAi::new(cfg.clone(), round));
    zombie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_rounds_are_tougher_and_faster() {
        let cfg = ZombieConfig::default();
        let first = ZombieAi::new(cfg.clone(), 1);
        let fifth = ZombieAi::new(cfg, 5);
        assert_eq!(first.health(), 2);
        assert_eq!(fifth.health(), 4);
        assert!(fifth.speed() > first.speed());
    }

    #[test]
    fn dies_once() {
        let mut ai = ZombieAi::new(ZombieConfig::default(), 1);
        assert_eq!(ai.apply_damage(1), DamageOutcome::Wounded { immunity: None });
        assert_eq!(ai.apply_damage(1), DamageOutcome::Lethal { despawn: true });
        assert_eq!(ai.health(), 0);
        assert_eq!(ai.apply_damage(1), DamageOutcome::Ignored);
        assert_eq!(ai.health(), 0);
    }

    #[test]
    fn overkill_takes_health_below_zero() {
        let mut ai = ZombieAi::new(ZombieConfig::default(), 1);
        assert_eq!(ai.apply_damage(5), DamageOutcome::Lethal { despawn: true });
        assert_eq!(ai.health(), -3);
    }
}
