use std::{collections::HashMap, path::PathBuf};

use anyhow::Result;
use flow_assets::{
    AssetConfig, AssetLoader, FsAssetLoader, LoadContext, TextureAsset, TextureLibrary,
    config::{ASSET_ROOT_VAR, NORMALIZE_VAR, WORKERS_VAR},
};
use tempfile::tempdir;

use crate::common::test_utils::{init_logs, png_rgb8};

mod common;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn config_defaults() -> Result<()> {
    let config = AssetConfig::from_lookup(lookup(&[]))?;
    assert_eq!(config, AssetConfig::default());
    assert_eq!(config.asset_root, PathBuf::from("./assets"));
    assert!(config.normalize);
    assert_eq!(config.worker_threads, None);
    Ok(())
}

#[test]
fn config_overrides() -> Result<()> {
    let config = AssetConfig::from_lookup(lookup(&[
        (ASSET_ROOT_VAR, "/srv/game/assets"),
        (WORKERS_VAR, " 3 "),
        (NORMALIZE_VAR, "off"),
    ]))?;
    assert_eq!(config.asset_root, PathBuf::from("/srv/game/assets"));
    assert_eq!(config.worker_threads, Some(3));
    assert!(!config.normalize);
    Ok(())
}

#[test]
fn config_rejects_bad_values() {
    assert!(AssetConfig::from_lookup(lookup(&[(WORKERS_VAR, "many")])).is_err());
    assert!(AssetConfig::from_lookup(lookup(&[(WORKERS_VAR, "0")])).is_err());
    assert!(AssetConfig::from_lookup(lookup(&[(NORMALIZE_VAR, "maybe")])).is_err());
}

#[test]
fn fs_loader_resolves_against_root() -> Result<()> {
    let dir = tempdir()?;
    std::fs::create_dir(dir.path().join("textures"))?;
    std::fs::write(dir.path().join("textures/a.bin"), [1u8, 2, 3])?;

    let loader = FsAssetLoader::new(dir.path());
    assert_eq!(loader.root(), dir.path());
    assert_eq!(FsAssetLoader::default().root(), PathBuf::from("./assets"));
    assert!(loader.file_exists("textures/a.bin"));
    assert!(!loader.file_exists("textures"));
    assert!(!loader.file_exists("textures/b.bin"));
    assert_eq!(loader.read_binary("textures/a.bin")?, vec![1, 2, 3]);

    let err = loader.read_binary("textures/b.bin").unwrap_err();
    assert!(format!("{err:#}").contains("b.bin"));
    Ok(())
}

#[test]
fn configured_context_loads_from_disk() -> Result<()> {
    init_logs();
    let dir = tempdir()?;
    std::fs::write(dir.path().join("floor.png"), png_rgb8(6, 4))?;

    let config = AssetConfig::from_lookup(lookup(&[
        (ASSET_ROOT_VAR, dir.path().to_str().unwrap()),
        (WORKERS_VAR, "2"),
    ]))?;
    let runtime = config.build_runtime()?;
    let context = LoadContext::from_config(&config, runtime.handle().clone());
    assert!(context.decoders().supports("floor.png"));
    assert!(context.decoders().supports("sky.hdr"));
    let library = TextureLibrary::new(context);

    let floor = library.get_or_create("floor.png");
    assert!(floor.ptr_eq(&library.get_or_create("floor.png")));
    assert_eq!(library.len(), 1);

    let image = floor.get_image().expect("floor.png should load from disk");
    assert_eq!((image.width, image.height, image.bit_count), (6, 4, 32));

    let missing = TextureAsset::new(
        "ceiling.png",
        LoadContext::from_config(&config, runtime.handle().clone()),
    );
    assert!(missing.get_image().is_none());
    Ok(())
}

#[test]
fn library_requests_every_texture_once() {
    let dir = tempdir().unwrap();
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let config = AssetConfig {
        asset_root: dir.path().to_path_buf(),
        ..Default::default()
    };
    let library = TextureLibrary::new(LoadContext::from_config(&config, runtime.handle().clone()));
    library.get_or_create("a.png");
    library.get_or_create("b.png");

    assert_eq!(library.request_all(), 2);
    assert_eq!(library.request_all(), 0);
    assert!(library.get("a.png").unwrap().get_image().is_none());
    assert!(library.get("c.png").is_none());
}
