// crates/zombie_game/tests/common/mod.rs
#![allow(dead_code)]

use std::collections::HashMap;
use std::rc::Rc;

use engine_core::Headless;
use engine_ecs::{EntityId, GameObject, Level, PLAYER_NAME};
use engine_shared::glam::Vec3;
use engine_shared::{InputState, ModelAsset, ModelSource, SharedInput};
use zombie_game::components::ZOMBIE;
use zombie_game::config::{GunConfig, PlayerConfig, RoundConfig, ZombieConfig};
use zombie_game::{PlayerController, PlayerGun, SpawnerManager};

pub const DT: f32 = 0.125;

pub fn models() -> ModelSource {
    Rc::new(HashMap::<String, ModelAsset>::new())
}

pub struct Session {
    pub headless: Headless,
    pub level: Level,
    pub input: SharedInput,
}

impl Session {
    pub fn new() -> Self {
        let headless = Headless::new();
        let mut level = Level::new(headless.services());
        level.seed_rng(7);
        Self { headless, level, input: InputState::shared() }
    }

    pub fn add_player(&mut self, position: Vec3) -> EntityId {
        let mut player = GameObject::new(PLAYER_NAME).at(position);
        player.add(PlayerController::new(self.input.clone(), PlayerConfig::default()));
        player.add(PlayerGun::new(self.input.clone(), GunConfig::default(), &*models()));
        self.level.add(player)
    }

    pub fn add_manager(&mut self, spawners: usize) -> EntityId {
        let mut manager =
            SpawnerManager::new(RoundConfig::default(), ZombieConfig::default(), models());
        for i in 0..spawners {
            manager.add_spawner(Vec3::new(30.0 * i as f32 - 30.0, 1.0, -40.0));
        }
        let mut object = GameObject::new("SpawnerManager");
        object.add(manager);
        self.level.add(object)
    }

    pub fn press(&self, action: engine_shared::Action, held: bool) {
        self.input.borrow_mut().set_held(action, held);
    }

    pub fn run(&mut self, seconds: f32) {
        let frames = (seconds / DT).ceil() as usize;
        for _ in 0..frames {
            self.level.advance(DT);
        }
    }

    pub fn zombies(&self) -> usize {
        self.level.find_by_name(ZOMBIE).len()
    }

    /// Removes every zombie, returning how many there were.
    pub fn clear_zombies(&mut self) -> usize {
        let zombies = self.level.find_by_name(ZOMBIE);
        for zombie in &zombies {
            self.level.remove(*zombie);
        }
        zombies.len()
    }

    pub fn manager(&self, id: EntityId) -> &SpawnerManager {
        self.level.component::<SpawnerManager>(id).expect("spawner manager")
    }
}
