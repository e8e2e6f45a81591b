// crates/engine_shared/src/assets.rs
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// One animation clip baked into a model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipInfo {
    pub name: String,
    pub duration: f32,
}

/// Model descriptor: the renderer resolves the mesh by asset name, gameplay
/// only needs the clip list (in file order) and a hit radius.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelAsset {
    #[serde(default)]
    pub clips: Vec<ClipInfo>,
    #[serde(default = "default_hit_radius")]
    pub hit_radius: f32,
}

fn default_hit_radius() -> f32 {
    0.5
}

impl Default for ModelAsset {
    fn default() -> Self {
        Self { clips: Vec::new(), hit_radius: default_hit_radius() }
    }
}

/// Read side of an asset provider: returns a fresh copy per call.
pub trait AssetSource<A> {
    fn get(&self, name: &str) -> Option<A>;
}

impl<A: Clone> AssetSource<A> for HashMap<String, A> {
    fn get(&self, name: &str) -> Option<A> {
        HashMap::get(self, name).cloned()
    }
}

pub type ModelSource = Rc<dyn AssetSource<ModelAsset>>;
