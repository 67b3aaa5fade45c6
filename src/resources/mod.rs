//! Everything a texture needs to get from a file name to a published image.
//!
//! - [`AssetLoader`] answers "does this file exist" and "give me its bytes"
//! - [`decoder`] picks a parser by extension
//! - [`normalize`] widens bit depths the GPU cannot sample
//! - [`task`] decides where load tasks run
//! - [`library`] deduplicates textures by name
//!
//! [`LoadContext`] bundles the collaborators so they can be injected into each
//! [`TextureAsset`](crate::data_structures::texture::TextureAsset).

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;

use crate::config::AssetConfig;

pub mod decoder;
pub mod library;
pub mod normalize;
pub mod task;

use decoder::DecoderSet;
use task::{TaskLauncher, ThreadLauncher};

/// Storage that texture files are read from.
///
/// Both calls block and are made from inside load tasks.
pub trait AssetLoader: Send + Sync {
    fn file_exists(&self, name: &str) -> bool;

    fn read_binary(&self, name: &str) -> anyhow::Result<Vec<u8>>;
}

impl<T: AssetLoader + ?Sized> AssetLoader for Arc<T> {
    fn file_exists(&self, name: &str) -> bool {
        (**self).file_exists(name)
    }

    fn read_binary(&self, name: &str) -> anyhow::Result<Vec<u8>> {
        (**self).read_binary(name)
    }
}

/// Reads assets relative to a root directory.
#[derive(Clone, Debug)]
pub struct FsAssetLoader {
    root: PathBuf,
}

impl Default for FsAssetLoader {
    fn default() -> Self {
        Self::new(Path::new("./").join("assets"))
    }
}

impl FsAssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl AssetLoader for FsAssetLoader {
    fn file_exists(&self, name: &str) -> bool {
        self.resolve(name).is_file()
    }

    fn read_binary(&self, name: &str) -> anyhow::Result<Vec<u8>> {
        let path = self.resolve(name);
        std::fs::read(&path).with_context(|| format!("could not read {}", path.display()))
    }
}

/// The collaborators shared by every texture load.
#[derive(Clone)]
pub struct LoadContext {
    pub(crate) loader: Arc<dyn AssetLoader>,
    pub(crate) decoders: Arc<DecoderSet>,
    pub(crate) launcher: Arc<dyn TaskLauncher>,
    pub(crate) normalize: bool,
}

impl LoadContext {
    /// Default decoders, one thread per load, normalization on.
    pub fn new(loader: impl AssetLoader + 'static) -> Self {
        Self {
            loader: Arc::new(loader),
            decoders: Arc::new(DecoderSet::default()),
            launcher: Arc::new(ThreadLauncher),
            normalize: true,
        }
    }

    /// Filesystem loader rooted at the configured directory, loads on `runtime`'s blocking pool.
    pub fn from_config(config: &AssetConfig, runtime: tokio::runtime::Handle) -> Self {
        Self::new(FsAssetLoader::new(config.asset_root.clone()))
            .with_launcher(runtime)
            .with_normalization(config.normalize)
    }

    pub fn with_decoders(mut self, decoders: DecoderSet) -> Self {
        self.decoders = Arc::new(decoders);
        self
    }

    pub fn with_launcher(mut self, launcher: impl TaskLauncher + 'static) -> Self {
        self.launcher = Arc::new(launcher);
        self
    }

    pub fn with_normalization(mut self, enabled: bool) -> Self {
        self.normalize = enabled;
        self
    }

    pub fn decoders(&self) -> &DecoderSet {
        &self.decoders
    }
}
