// crates/engine_core/src/assets.rs
//! Named asset registries loaded in one parallel batch.
//!
//! Every registered asset is handed to the rayon pool; the calling thread
//! collects outcomes from a channel, waking every poll interval to report
//! progress. A failed asset marks the batch degraded but never stops it.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;
use engine_shared::{AssetSource, ModelAsset};
use tracing::{debug, info, trace, warn};

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("loader for {name} never answered")]
    Lost { name: String },
}

/// Decodes one file into an asset. Loaders run on worker threads.
pub trait AssetLoader: Send + Sync + 'static {
    type Asset: Clone + Send + 'static;

    fn load(&self, path: &Path) -> Result<Self::Asset, AssetError>;
}

/// Reads model descriptors written in RON.
#[derive(Debug, Default, Clone, Copy)]
pub struct RonModelLoader;

impl AssetLoader for RonModelLoader {
    type Asset = ModelAsset;

    fn load(&self, path: &Path) -> Result<ModelAsset, AssetError> {
        let text = fs::read_to_string(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&text).map_err(|err| AssetError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }
}

/// Raw file contents; decoding is left to the renderer or mixer.
#[derive(Debug, Default, Clone, Copy)]
pub struct BytesLoader;

impl AssetLoader for BytesLoader {
    type Asset = Arc<[u8]>;

    fn load(&self, path: &Path) -> Result<Arc<[u8]>, AssetError> {
        fs::read(path).map(Arc::from).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Outcome of [`AssetManager::load_all`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub failed: Vec<String>,
    pub degraded: bool,
}

pub struct AssetManager<L: AssetLoader> {
    kind: &'static str,
    loader: Arc<L>,
    // registration order
    entries: Vec<(String, PathBuf)>,
    assets: HashMap<String, L::Asset>,
    poll_interval: Duration,
}

pub type ModelManager = AssetManager<RonModelLoader>;
pub type TextureManager = AssetManager<BytesLoader>;
pub type SoundManager = AssetManager<BytesLoader>;

impl ModelManager {
    pub fn models() -> Self {
        Self::new("model", RonModelLoader)
    }
}

impl AssetManager<BytesLoader> {
    pub fn textures() -> Self {
        Self::new("texture", BytesLoader)
    }

    pub fn sounds() -> Self {
        Self::new("sound", BytesLoader)
    }
}

impl<L: AssetLoader> AssetManager<L> {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

    pub fn new(kind: &'static str, loader: L) -> Self {
        Self {
            kind,
            loader: Arc::new(loader),
            entries: Vec::new(),
            assets: HashMap::new(),
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Registers (or re-points) `name`. Takes effect on the next batch.
    pub fn register(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        let name = name.into();
        let path = path.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = path,
            None => self.entries.push((name, path)),
        }
    }

    pub fn registered(&self) -> usize {
        self.entries.len()
    }

    /// Loads every registered asset and blocks until each one succeeded or
    /// failed.
    pub fn load_all(&mut self) -> LoadReport {
        info!(kind = self.kind, count = self.entries.len(), "asset loading started");
        let (tx, rx) = crossbeam_channel::unbounded();

        for (name, path) in self.entries.iter().cloned() {
            let tx = tx.clone();
            let loader = Arc::clone(&self.loader);
            rayon::spawn(move || {
                let result = loader.load(&path);
                // The receiver only hangs up once the batch is over.
                let _ = tx.send((name, result));
            });
        }
        drop(tx);

        let mut report = LoadReport::default();
        let mut outstanding: Vec<&str> = self.entries.iter().map(|(n, _)| n.as_str()).collect();

        while !outstanding.is_empty() {
            match rx.recv_timeout(self.poll_interval) {
                Ok((name, result)) => {
                    outstanding.retain(|n| *n != name);
                    match result {
                        Ok(asset) => {
                            debug!(kind = self.kind, %name, "asset loaded");
                            self.assets.insert(name, asset);
                            report.loaded += 1;
                        }
                        Err(err) => {
                            warn!(kind = self.kind, %name, %err, "asset failed to load");
                            report.failed.push(name);
                        }
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    trace!(kind = self.kind, outstanding = outstanding.len(), "still loading");
                }
                Err(RecvTimeoutError::Disconnected) => {
                    for name in outstanding.drain(..) {
                        let err = AssetError::Lost { name: name.to_string() };
                        warn!(kind = self.kind, %err, "asset failed to load");
                        report.failed.push(name.to_string());
                    }
                }
            }
        }

        report.degraded = !report.failed.is_empty();
        if report.degraded {
            warn!(kind = self.kind, failed = ?report.failed, "error while loading some assets");
        } else {
            info!(kind = self.kind, loaded = report.loaded, "all assets loaded successfully");
        }
        report
    }

    /// A fresh copy of the asset, if it loaded.
    pub fn get(&self, name: &str) -> Option<L::Asset> {
        let asset = self.assets.get(name).cloned();
        if asset.is_none() {
            debug!(kind = self.kind, %name, "asset not available");
        }
        asset
    }

    pub fn contains(&self, name: &str) -> bool {
        self.assets.contains_key(name)
    }
}

impl<L: AssetLoader> AssetSource<L::Asset> for AssetManager<L> {
    fn get(&self, name: &str) -> Option<L::Asset> {
        AssetManager::get(self, name)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const ZOMBIE: &str = r#"(
        clips: [(name: "idle", duration: 1.25), (name: "walk", duration: 0.8)],
        hit_radius: 0.4,
    )"#;

    #[test]
    fn loads_models_and_hands_out_copies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zombie.ron");
        fs::write(&path, ZOMBIE).unwrap();

        let mut models = ModelManager::models();
        models.register("zombie", &path);
        let report = models.load_all();

        assert_eq!(report, LoadReport { loaded: 1, failed: vec![], degraded: false });
        let mut first = models.get("zombie").unwrap();
        assert_eq!(first.clips[0].name, "idle");
        assert_eq!(first.hit_radius, 0.4);

        first.clips.clear();
        assert_eq!(models.get("zombie").unwrap().clips.len(), 2);
        assert!(models.get("gun").is_none());
    }

    #[test]
    fn single_failure_degrades_batch_without_aborting() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.ron"), "()").unwrap();
        fs::write(dir.path().join("broken.ron"), "(clips: [").unwrap();
        fs::write(dir.path().join("c.ron"), ZOMBIE).unwrap();

        let mut models = ModelManager::models();
        models.register("a", dir.path().join("a.ron"));
        models.register("broken", dir.path().join("broken.ron"));
        models.register("missing", dir.path().join("missing.ron"));
        models.register("c", dir.path().join("c.ron"));
        let mut report = models.load_all();
        report.failed.sort();

        assert!(report.degraded);
        assert_eq!(report.loaded, 2);
        assert_eq!(report.failed, vec!["broken".to_string(), "missing".to_string()]);
        assert!(models.contains("a"));
        assert!(models.contains("c"));
        assert_eq!(models.get("a").unwrap().hit_radius, 0.5);
    }

    #[test]
    fn bytes_loader_reads_raw_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gunFire.ogg");
        fs::write(&path, [1u8, 2, 3]).unwrap();

        let mut sounds = SoundManager::sounds();
        sounds.register("gunFire", &path);
        assert!(!sounds.load_all().degraded);
        assert_eq!(&*sounds.get("gunFire").unwrap(), &[1u8, 2, 3]);
    }

    #[test]
    fn re_registering_replaces_the_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("real.png"), b"png").unwrap();

        let mut textures = TextureManager::textures();
        textures.register("target", dir.path().join("nope.png"));
        textures.register("target", dir.path().join("real.png"));
        assert_eq!(textures.registered(), 1);
        assert!(!textures.load_all().degraded);
    }

    #[test]
    fn empty_batch_resolves_immediately() {
        let mut models = ModelManager::models();
        assert_eq!(models.load_all(), LoadReport::default());
    }
}
