//! Loader configuration.
//!
//! Defaults match the engine's conventions: assets live in `./assets` and
//! 24/48-bit images are widened before they are published. Each field can be
//! overridden from the environment.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};

pub const ASSET_ROOT_VAR: &str = "FLOW_ASSET_ROOT";
pub const WORKERS_VAR: &str = "FLOW_ASSET_WORKERS";
pub const NORMALIZE_VAR: &str = "FLOW_ASSET_NORMALIZE";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetConfig {
    /// Directory texture names are resolved against.
    pub asset_root: PathBuf,
    /// Threads for the load runtime. `None` lets tokio decide.
    pub worker_threads: Option<usize>,
    /// Widen 24-bit and 48-bit images after decoding.
    pub normalize: bool,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("./").join("assets"),
            worker_threads: None,
            normalize: true,
        }
    }
}

impl AssetConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from `lookup`, which maps variable names to values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(root) = lookup(ASSET_ROOT_VAR) {
            config.asset_root = PathBuf::from(root);
        }
        if let Some(workers) = lookup(WORKERS_VAR) {
            let workers: usize = workers
                .trim()
                .parse()
                .with_context(|| format!("{WORKERS_VAR} must be a number, got {workers:?}"))?;
            if workers == 0 {
                bail!("{WORKERS_VAR} must be at least 1");
            }
            config.worker_threads = Some(workers);
        }
        if let Some(flag) = lookup(NORMALIZE_VAR) {
            config.normalize =
                parse_flag(&flag).with_context(|| format!("invalid value for {NORMALIZE_VAR}"))?;
        }
        Ok(config)
    }

    /// The multi-threaded runtime whose blocking pool runs texture loads.
    pub fn build_runtime(&self) -> Result<tokio::runtime::Runtime> {
        let mut builder = tokio::runtime::Builder::new_multi_thread();
        builder.enable_all().thread_name("flow-assets");
        if let Some(workers) = self.worker_threads {
            builder.worker_threads(workers).max_blocking_threads(workers);
        }
        builder.build().context("could not build the texture load runtime")
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean, got {other:?}"),
    }
}
