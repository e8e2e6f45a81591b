// crates/zombie_game/src/components/mod.rs

// `Any` plumbing shared by every gameplay component.
macro_rules! any_plumbing {
    () => {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    };
}
pub(crate) use any_plumbing;

pub mod animation;
pub mod gun;
pub mod mystery_box;
pub mod player;
pub mod shape;
pub mod spawner;
pub mod zombie;

// --- SHARED NAMES ---
// Lookups across components go through these object names.
pub const ZOMBIE: &str = "Zombie";
pub const MYSTERY_BOX: &str = "MysteryBox";
pub const SPAWNER_MANAGER: &str = "SpawnerManager";
