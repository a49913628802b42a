//! Folder-backed collection of structure templates.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::material::MaterialPalette;
use crate::voxel::VoxelGrid;

use super::config::{BLUEPRINT_EXTENSION, ManagerConfig};
use super::template::{Iwgo, Registries};
use super::transform::Placement;

/// Loads every blueprint in a folder and hands out templates by name.
#[derive(Debug)]
pub struct IwgoManager {
    config: ManagerConfig,
    registries: Registries,
    iwgos: BTreeMap<String, Iwgo>,
}

impl IwgoManager {
    /// Manager with the default registries, plus the configured palette file if any.
    pub fn new(config: ManagerConfig) -> Result<Self> {
        let mut registries = Registries::default();
        if let Some(path) = &config.palette {
            registries.materials = MaterialPalette::load_sync(path)?;
        }
        Ok(Self::with_registries(config, registries))
    }

    pub fn with_registries(config: ManagerConfig, registries: Registries) -> Self {
        Self {
            config,
            registries,
            iwgos: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    pub fn registries_mut(&mut self) -> &mut Registries {
        &mut self.registries
    }

    /// Load every `*.json` blueprint in the configured folder.
    ///
    /// Files that fail to load are logged and skipped. Returns the number of
    /// templates loaded by this call.
    pub fn load_iwgos(&mut self) -> Result<usize> {
        let paths = blueprint_paths(&self.config.folder)?;
        let mut loaded = 0;
        for path in paths {
            match Iwgo::load_file(&path, &self.registries, self.config.policy) {
                Ok(mut iwgo) => {
                    if let Some(seed) = self.config.seed {
                        iwgo.reseed(seed);
                    }
                    if let Some(mut previous) = self.iwgos.insert(iwgo.name().to_string(), iwgo) {
                        log::warn!("IWGO '{}' from {} replaces an earlier one", previous.name(), path.display());
                        previous.unload();
                    }
                    loaded += 1;
                }
                Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
            }
        }
        log::info!("Loaded {} IWGOs from {}", loaded, self.config.folder.display());
        Ok(loaded)
    }

    /// Drop every loaded template.
    pub fn unload_iwgos(&mut self) {
        let count = self.iwgos.len();
        for iwgo in self.iwgos.values_mut() {
            iwgo.unload();
        }
        self.iwgos.clear();
        log::info!("Unloaded {} IWGOs", count);
    }

    /// Unload, then load the folder again.
    pub fn reload_iwgos(&mut self) -> Result<usize> {
        self.unload_iwgos();
        self.load_iwgos()
    }

    pub fn get(&self, name: &str) -> Option<&Iwgo> {
        self.iwgos.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Iwgo> {
        self.iwgos.get_mut(name)
    }

    /// Loaded template names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.iwgos.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.iwgos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.iwgos.is_empty()
    }

    /// Randomize and draw the named template.
    pub fn place(&mut self, name: &str, placement: &Placement, grid: &mut dyn VoxelGrid) -> Result<()> {
        let iwgo = self
            .iwgos
            .get_mut(name)
            .ok_or_else(|| Error::UnknownIwgo(name.to_string()))?;
        iwgo.place(placement, grid)?;
        Ok(())
    }
}

/// Blueprint files directly inside `folder`, sorted by path.
fn blueprint_paths(folder: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let path = entry?.path();
        let is_blueprint = path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(BLUEPRINT_EXTENSION));
        if is_blueprint {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
