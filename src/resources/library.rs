//! Name-deduplicated texture registry.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{data_structures::texture::TextureAsset, resources::LoadContext};

/// Hands out one shared [`TextureAsset`] per logical name.
///
/// Scene construction goes through a library so that every geometry that
/// references `"brick.png"` waits on the same single decode.
pub struct TextureLibrary {
    context: LoadContext,
    textures: Mutex<HashMap<String, TextureAsset>>,
}

impl TextureLibrary {
    pub fn new(context: LoadContext) -> Self {
        Self {
            context,
            textures: Mutex::new(HashMap::new()),
        }
    }

    // Entries are only ever inserted or removed whole, a poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, TextureAsset>> {
        self.textures.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The asset registered for `name`, creating it (unloaded) on first use.
    pub fn get_or_create(&self, name: &str) -> TextureAsset {
        self.lock()
            .entry(name.to_string())
            .or_insert_with(|| TextureAsset::new(name, self.context.clone()))
            .clone()
    }

    pub fn get(&self, name: &str) -> Option<TextureAsset> {
        self.lock().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Request a load for every registered texture. Returns how many loads were launched.
    pub fn request_all(&self) -> usize {
        let textures: Vec<TextureAsset> = self.lock().values().cloned().collect();
        textures.iter().filter(|texture| texture.request_load()).count()
    }

    /// Forget textures that nothing outside the library refers to any more.
    ///
    /// Textures with a load still in flight are kept. Returns the number removed.
    pub fn purge_unused(&self) -> usize {
        let mut textures = self.lock();
        let before = textures.len();
        textures.retain(|name, texture| {
            let keep = texture.handle_count() > 1;
            if !keep {
                log::debug!("dropping unused texture {}", name);
            }
            keep
        });
        before - textures.len()
    }
}
