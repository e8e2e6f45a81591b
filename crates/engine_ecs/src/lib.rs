// crates/engine_ecs/src/lib.rs
//! Scene graph: levels own game objects, game objects own components, and a
//! cooperative scheduler runs deferred behavior on the frame tick.

pub mod clock;
pub mod component;
pub mod entity;
pub mod error;
pub mod game_object;
pub mod level;
pub mod scheduler;
mod storage;

#[cfg(test)]
mod testing;

pub use clock::{FrameClock, ManualTime, SystemTime, TimeSource};
pub use component::{
    Component, ComponentBase, ComponentCtx, ComponentNode, DamageOutcome, Damageable, Renderable,
};
pub use entity::{EntityId, NodeId};
pub use error::SceneError;
pub use game_object::{GameObject, ObjectHook, ObjectOwner};
pub use level::{Level, Obstacle, PLAYER_NAME};
pub use scheduler::{Scheduler, Step, Task, TaskId};
pub use storage::EntityArena;
