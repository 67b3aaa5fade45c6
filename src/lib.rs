//! flow-assets
//!
//! Asynchronous texture loading for scene graphs. A texture is referenced by
//! name, its file is located through an injected asset loader, decoded by the
//! decoder matching its extension, widened to a GPU-friendly bit depth and
//! cached. The first request starts exactly one load; every other request,
//! early or late, waits for it and shares the result.
//!
//! High-level modules
//! - `config`: asset root, load threads and normalization switches
//! - `data_structures`: decoded images, texture assets and the scene tree
//! - `error`: the error type published by failed loads
//! - `resources`: asset loaders, decoder dispatch, normalization, task launching
//!

pub mod config;
pub mod data_structures;
pub mod error;
pub mod resources;

pub use config::AssetConfig;
pub use data_structures::{
    image::{MipLevel, RawImage},
    scene_graph::{Camera, Geometry, Light, LightKind, SceneNode, ScenePayload},
    texture::{LoadState, TextureAsset},
};
pub use error::TextureError;
pub use resources::{
    AssetLoader, FsAssetLoader, LoadContext,
    decoder::{DecoderSet, ImageFormat, ImageParser},
    library::TextureLibrary,
    normalize::normalize,
    task::{TaskLauncher, ThreadLauncher},
};

/// Install `env_logger` as the `log` backend, honoring `RUST_LOG`.
///
/// Safe to call more than once; later calls only print a warning.
pub fn init_logger() {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    }
}
