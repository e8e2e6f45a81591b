// crates/zombie_game/src/lib.rs
//! Zombie survival gameplay on top of the engine scene graph.

pub mod combat;
pub mod components;
pub mod config;
pub mod scene;

pub use components::animation::{AnimatedModel, AnimationSystem};
pub use components::gun::PlayerGun;
pub use components::mystery_box::{LootTable, MysteryBox};
pub use components::player::PlayerController;
pub use components::shape::BasicShape;
pub use components::spawner::{round_over, start_round, RoundPhase, SpawnerManager, ZombieSpawner};
pub use components::zombie::{make_zombie, ZombieAi};
pub use config::{ConfigError, GameConfig};
pub use scene::make_main_level;
