//! Name -> material lookup table.

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::Path;

use super::{Material, MaterialError, MaterialRegistry};

/// Built-in materials, indexed by id
const DEFAULT_MATERIALS: &[&str] = &[
    "air",
    "stone",
    "grass",
    "dirt",
    "sand",
    "water",
    "wood",
    "leaves",
    "brick",
    "glass",
    "cobblestone",
    "gravel",
    "snow",
    "ice",
    "obsidian",
];

/// Case-insensitive material palette.
///
/// `air` is always id 0 and maps to [`Material::AIR`]. Each id has at most
/// one name.
#[derive(Debug, Clone)]
pub struct MaterialPalette {
    by_name: HashMap<String, u16>,
    names: HashMap<u16, String>,
    /// One past the highest bound id. Reaches `u16::MAX + 1` when full.
    next_id: u32,
}

impl MaterialPalette {
    /// Palette containing only `air`.
    pub fn empty() -> Self {
        let mut palette = Self {
            by_name: HashMap::new(),
            names: HashMap::new(),
            next_id: 0,
        };
        palette.bind(DEFAULT_MATERIALS[0].to_string(), Material::AIR.id);
        palette
    }

    /// Register `name` under the next free id, or return its existing material.
    /// Fails once every id above the highest bound one is taken.
    pub fn register(&mut self, name: &str) -> Result<Material, MaterialError> {
        let key = name.to_ascii_lowercase();
        if let Some(&id) = self.by_name.get(&key) {
            return Ok(Material::new(id));
        }
        let id = u16::try_from(self.next_id).map_err(|_| MaterialError::PaletteFull(key.clone()))?;
        self.bind(key, id);
        Ok(Material::new(id))
    }

    /// Bind `name` to an explicit id, replacing any previous binding of `name`.
    ///
    /// A different name already bound to `id` is dropped and returned.
    /// `air` cannot leave id 0 and nothing else can take it.
    pub fn insert(&mut self, name: &str, id: u16) -> Result<Option<String>, MaterialError> {
        let key = name.to_ascii_lowercase();
        if (key == DEFAULT_MATERIALS[0]) != (id == Material::AIR.id) {
            return Err(MaterialError::ReservedAir { name: key, id });
        }
        Ok(self.bind(key, id))
    }

    fn bind(&mut self, key: String, id: u16) -> Option<String> {
        let displaced = match self.names.insert(id, key.clone()) {
            Some(old) if old != key => {
                self.by_name.remove(&old);
                Some(old)
            }
            _ => None,
        };
        if let Some(previous) = self.by_name.insert(key, id) {
            if previous != id {
                self.names.remove(&previous);
            }
        }
        self.next_id = self.next_id.max(u32::from(id) + 1);
        displaced
    }

    /// Name registered for `material.id`.
    pub fn name_of(&self, material: Material) -> Option<&str> {
        self.names.get(&material.id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Extend the palette from a JSON object of `name: id` pairs, applied in
    /// name order.
    pub fn extend_from_json(&mut self, json: &str) -> Result<(), io::Error> {
        let entries: BTreeMap<String, u16> = serde_json::from_str(json)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        for (name, id) in entries {
            let displaced = self
                .insert(&name, id)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            if let Some(old) = displaced {
                log::warn!("Material '{}' takes id {} from '{}'", name, id, old);
            }
        }
        Ok(())
    }

    /// Load defaults plus the entries of a JSON palette file (sync)
    pub fn load_sync(path: &Path) -> Result<Self, io::Error> {
        let json = std::fs::read_to_string(path)?;
        let mut palette = Self::default();
        palette.extend_from_json(&json)?;
        Ok(palette)
    }
}

impl Default for MaterialPalette {
    fn default() -> Self {
        let mut palette = Self::empty();
        for (id, name) in (0u16..).zip(DEFAULT_MATERIALS).skip(1) {
            palette.bind(name.to_string(), id);
        }
        palette
    }
}

impl MaterialRegistry for MaterialPalette {
    fn resolve(&self, name: &str) -> Option<Material> {
        self.by_name
            .get(&name.to_ascii_lowercase())
            .map(|&id| Material::new(id))
    }
}
