// crates/zombie_game/src/scene.rs
//! Assembly of the playable level.

use engine_ecs::{FrameClock, GameObject, Level, PLAYER_NAME};
use engine_shared::glam::Vec3;
use engine_shared::{Aabb, ModelSource, Services, SharedInput};
use tracing::info;

use crate::components::animation::AnimatedModel;
use crate::components::gun::PlayerGun;
use crate::components::mystery_box::{MysteryBox, BOX_MODEL};
use crate::components::player::PlayerController;
use crate::components::shape::BasicShape;
use crate::components::spawner::SpawnerManager;
use crate::components::{MYSTERY_BOX, SPAWNER_MANAGER};
use crate::config::GameConfig;

pub const PLATFORM_SIZE: Vec3 = Vec3::new(150.0, 1.0, 150.0);
pub const CRATES: [Vec3; 4] = [
    Vec3::new(1.0, 1.0, 0.0),
    Vec3::new(-6.0, 1.0, 4.0),
    Vec3::new(8.0, 1.0, -7.0),
    Vec3::new(-3.0, 1.0, -10.0),
];
pub const SPAWNERS: [Vec3; 3] = [
    Vec3::new(-20.0, 1.0, -20.0),
    Vec3::new(20.0, 1.0, -20.0),
    Vec3::new(0.0, 1.0, 25.0),
];
pub const BOX_POSITION: Vec3 = Vec3::new(5.0, 1.0, 5.0);

/// Builds the main level: platform, crates, player, mystery box and the
/// spawner manager. The caller still has to `create` it.
pub fn make_main_level(
    services: Services,
    clock: FrameClock,
    input: SharedInput,
    models: ModelSource,
    cfg: &GameConfig,
) -> Level {
    let mut level = Level::with_clock(services, clock.with_max_dt(cfg.frame.max_dt));
    if let Some(seed) = cfg.seed {
        level.seed_rng(seed);
    }

    let mut platform = GameObject::new("BasePlatform");
    platform.add(BasicShape::cuboid(PLATFORM_SIZE, 0xffffff));
    level.add(platform);

    for (index, position) in CRATES.iter().enumerate() {
        let mut cube = GameObject::new(format!("Crate{index}")).at(*position);
        cube.add(BasicShape::cuboid(Vec3::ONE, 0x000000));
        level.add(cube);
        level.add_obstacle(Aabb::from_center_size(*position, Vec3::ONE), None);
    }

    let mut player = GameObject::new(PLAYER_NAME).at(Vec3::new(0.0, 1.0, 0.0));
    player.add(PlayerController::new(input.clone(), cfg.player.clone()));
    player.add(PlayerGun::new(input, cfg.gun.clone(), &*models));
    level.add(player);

    let mut mystery = GameObject::new(MYSTERY_BOX).at(BOX_POSITION);
    mystery.add(AnimatedModel::from_source(&*models, BOX_MODEL));
    mystery.add(MysteryBox::new(cfg.loot.clone()));
    level.add(mystery);

    let mut spawners = SpawnerManager::new(cfg.rounds.clone(), cfg.zombie.clone(), models);
    for position in SPAWNERS {
        spawners.add_spawner(position);
    }
    let mut manager = GameObject::new(SPAWNER_MANAGER);
    manager.add(spawners);
    level.add(manager);

    info!(objects = level.len(), obstacles = level.obstacles().len(), "main level assembled");
    level
}
