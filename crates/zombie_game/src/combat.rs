// crates/zombie_game/src/combat.rs
//! Damage delivery and shot resolution shared by every attacker.

use engine_ecs::{DamageOutcome, EntityId, Level};
use engine_shared::glam::Vec3;
use engine_shared::{yaw_forward, Ray};
use tracing::debug;

use crate::components::ZOMBIE;

const DEFAULT_HIT_RADIUS: f32 = 0.5;

/// Direction the player camera faces for a yaw (the model's forward axis
/// points behind the camera).
pub fn look_direction(yaw: f32) -> Vec3 {
    -yaw_forward(yaw)
}

/// Hands `amount` damage to the first damageable component of `target` and
/// carries out the consequences: lethal hits despawn when asked to, wounds
/// schedule the end of their immunity window.
pub fn deal_damage(level: &mut Level, target: EntityId, amount: i32) -> DamageOutcome {
    let outcome = level
        .object_mut(target)
        .and_then(|o| o.damageable_mut())
        .map(|d| d.apply_damage(amount))
        .unwrap_or(DamageOutcome::Ignored);

    match outcome {
        DamageOutcome::Lethal { despawn: true } => {
            debug!(?target, "lethal hit, despawning");
            level.remove(target);
        }
        DamageOutcome::Wounded { immunity: Some(window) } => {
            level.scheduler_mut().after(window, Some(target), move |level| {
                if let Some(d) = level.object_mut(target).and_then(|o| o.damageable_mut()) {
                    d.end_immunity();
                }
            });
        }
        _ => {}
    }
    outcome
}

/// Nearest zombie hit by `ray` within `[near, far]`, unless an obstacle
/// stands in front of it. Zombies are tested as upright cylinders of their
/// render hit radius.
pub fn shot_target(level: &Level, ray: &Ray, near: f32, far: f32) -> Option<(EntityId, f32)> {
    let (target, distance) = level
        .find_by_name(ZOMBIE)
        .into_iter()
        .filter_map(|id| {
            let zombie = level.object(id)?;
            let radius = zombie
                .renderables()
                .map(|r| r.hit_radius())
                .reduce(f32::max)
                .unwrap_or(DEFAULT_HIT_RADIUS);
            let mut center = zombie.position();
            center.y = ray.origin.y;
            ray.hit_sphere(center, radius, near, far).map(|t| (id, t))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))?;

    if level.first_obstacle_hit(ray, near, distance).is_some() {
        debug!(?target, "shot blocked by an obstacle");
        return None;
    }
    Some((target, distance))
}
