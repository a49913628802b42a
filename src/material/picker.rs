//! Material picker trait and the name -> constructor table.

use std::collections::HashMap;
use std::fmt;

use crate::value::RandomAware;

use super::pickers::{InnerOuterPicker, RandomInnerOuterPicker, RandomSimplePicker, SimplePicker};
use super::{Material, MaterialError, MaterialRegistry, Properties};

/// Per-voxel material strategy.
pub trait MaterialPicker: fmt::Debug {
    /// Instance name given at construction.
    fn name(&self) -> &str;

    /// Registry key of the picker type.
    fn kind(&self) -> &'static str;

    /// Read the picker's parameters from a flat property map.
    fn configure(
        &mut self,
        properties: &Properties,
        materials: &dyn MaterialRegistry,
    ) -> Result<(), MaterialError>;

    /// Material for a voxel, or `None` for "no material".
    fn pick(&self, is_shell: bool) -> Result<Option<Material>, MaterialError>;

    /// Random-source capability, for pickers that sample.
    fn as_random_aware(&mut self) -> Option<&mut dyn RandomAware> {
        None
    }
}

/// Builds an unconfigured picker from its instance name.
pub type PickerConstructor = fn(String) -> Box<dyn MaterialPicker>;

/// Picker types by registry key.
#[derive(Clone)]
pub struct PickerRegistry {
    constructors: HashMap<String, PickerConstructor>,
}

impl PickerRegistry {
    /// Registry without any picker types.
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Register (or replace) a picker type.
    pub fn register(&mut self, kind: &str, constructor: PickerConstructor) {
        self.constructors.insert(kind.to_string(), constructor);
    }

    /// New unconfigured picker of type `kind`, or `None` if `kind` is unknown.
    pub fn create(&self, kind: &str, name: &str) -> Option<Box<dyn MaterialPicker>> {
        self.constructors.get(kind).map(|ctor| ctor(name.to_string()))
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }

    /// Registered keys, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}

impl Default for PickerRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(SimplePicker::KIND, SimplePicker::boxed);
        registry.register(RandomSimplePicker::KIND, RandomSimplePicker::boxed);
        registry.register(InnerOuterPicker::KIND, InnerOuterPicker::boxed);
        registry.register(RandomInnerOuterPicker::KIND, RandomInnerOuterPicker::boxed);
        registry
    }
}

impl fmt::Debug for PickerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PickerRegistry").field("kinds", &self.kinds()).finish()
    }
}

/// Read `<prefix>material` and the optional `<prefix>data`.
pub(crate) fn material_property(
    properties: &Properties,
    prefix: &str,
    materials: &dyn MaterialRegistry,
) -> Result<Material, MaterialError> {
    let key = format!("{prefix}material");
    let name = properties
        .get(&key)
        .ok_or_else(|| MaterialError::MissingProperty(key.clone()))?;
    let material = materials
        .resolve(name.trim())
        .ok_or_else(|| MaterialError::UnknownMaterial(name.clone()))?;

    let data_key = format!("{prefix}data");
    match properties.get(&data_key) {
        Some(raw) => {
            let data = raw.trim().parse::<u16>().map_err(|_| MaterialError::InvalidNumber {
                key: data_key,
                value: raw.clone(),
            })?;
            Ok(material.with_data(data))
        }
        None => Ok(material),
    }
}

/// Read `<prefix>odd` (or `<prefix>odds`) as a percentage in `0..=100`.
pub(crate) fn odds_property(properties: &Properties, prefix: &str) -> Result<u8, MaterialError> {
    let (key, raw) = ["odd", "odds"]
        .iter()
        .map(|suffix| format!("{prefix}{suffix}"))
        .find_map(|key| properties.get(&key).map(|raw| (key, raw)))
        .ok_or_else(|| MaterialError::MissingProperty(format!("{prefix}odd")))?;
    let value = raw.trim().parse::<u32>().map_err(|_| MaterialError::InvalidNumber {
        key: key.clone(),
        value: raw.clone(),
    })?;
    if value > 100 {
        return Err(MaterialError::InvalidOdds { key, value });
    }
    Ok(value as u8)
}
