// crates/engine_ecs/src/error.rs

/// Structural misuse of the scene graph. These are reported and the
/// offending operation is skipped; none of them stop the frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("level doesn't contain a Player game object")]
    MissingPlayer,
    #[error("{name} gameobject is not affected to a level")]
    Unowned { name: String },
    #[error("{object} already holds a {component} component")]
    DuplicateComponent { object: String, component: &'static str },
    #[error("component {component} is already owned")]
    AlreadyOwned { component: String },
    #[error("{object} is live, remove its components through the level")]
    LiveObject { object: String },
}
