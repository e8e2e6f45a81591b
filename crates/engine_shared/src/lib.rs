// crates/engine_shared/src/lib.rs

pub mod assets;
pub mod input_types;
pub mod math;
pub mod services;

pub use assets::{AssetSource, ClipInfo, ModelAsset, ModelSource};
pub use input_types::{Action, ActionId, InputState, SharedInput};
pub use math::{planar_distance, yaw_forward, yaw_right, yaw_towards, Aabb, Ray, Transform};
pub use services::{
    text_ids, AudioOut, RenderHandle, RenderWorld, Services, SharedAudio, SharedRenderWorld,
    SharedTextSink, TextSink, Visual,
};

// Re-export glam so downstream crates agree on the math types.
pub use glam;
