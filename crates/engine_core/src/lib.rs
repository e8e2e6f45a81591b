// crates/engine_core/src/lib.rs

// Logic Modules
pub mod app;
pub mod assets;
pub mod headless;
pub mod input;
pub mod logging;

pub use app::App;
pub use assets::{
    AssetError, AssetLoader, AssetManager, BytesLoader, LoadReport, ModelManager, RonModelLoader,
    SoundManager, TextureManager,
};
pub use headless::{AudioLog, Headless, HeadlessRenderWorld, TextBoard};
pub use input::{InputDefaults, InputEvent, InputMap, InputPoller};
pub use logging::init_logging;
