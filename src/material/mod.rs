//! Material handles, the material palette, and per-voxel material strategies.
//!
//! Materials are opaque tokens to the rest of the crate. A
//! [`MaterialRegistry`] turns configured names into tokens, a
//! [`MaterialPicker`] decides which token (if any) goes into a voxel, and a
//! [`MaterialSetter`] applies that decision to a voxel grid.

pub mod palette;
pub mod picker;
pub mod pickers;
pub mod setter;

use std::collections::BTreeMap;

use thiserror::Error;

pub use palette::MaterialPalette;
pub use picker::{MaterialPicker, PickerConstructor, PickerRegistry};
pub use pickers::{InnerOuterPicker, RandomInnerOuterPicker, RandomSimplePicker, SimplePicker};
pub use setter::{EmptyPolicy, MaterialSetter};

/// Flat, dotted-key property map used to configure pickers.
pub type Properties = BTreeMap<String, String>;

/// Opaque material token. [`Material::AIR`] is the empty sentinel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Material {
    /// Identifier assigned by the registry
    pub id: u16,
    /// Variant data (block state, color index, ...)
    pub data: u16,
}

impl Material {
    /// Empty voxel
    pub const AIR: Material = Material { id: 0, data: 0 };

    pub const fn new(id: u16) -> Self {
        Self { id, data: 0 }
    }

    pub const fn with_data(self, data: u16) -> Self {
        Self { data, ..self }
    }

    pub fn is_air(&self) -> bool {
        self.id == Self::AIR.id
    }
}

/// Resolves configured material names into [`Material`] tokens.
pub trait MaterialRegistry {
    fn resolve(&self, name: &str) -> Option<Material>;
}

/// Errors raised while configuring or querying pickers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaterialError {
    #[error("missing property \"{0}\"")]
    MissingProperty(String),

    #[error("property \"{key}\" is not a valid number: \"{value}\"")]
    InvalidNumber { key: String, value: String },

    #[error("property \"{key}\" must be between 0 and 100, got {value}")]
    InvalidOdds { key: String, value: u32 },

    #[error("unknown material \"{0}\"")]
    UnknownMaterial(String),

    #[error("random picker used without a random source")]
    MissingRandomSource,

    #[error("material palette is full, cannot register \"{0}\"")]
    PaletteFull(String),

    #[error("id 0 is reserved for air, cannot bind \"{name}\" to {id}")]
    ReservedAir { name: String, id: u16 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_air_sentinel() {
        assert!(Material::AIR.is_air());
        assert!(Material::default().is_air());
        assert!(!Material::new(3).is_air());
    }

    #[test]
    fn test_with_data() {
        let m = Material::new(5).with_data(2);
        assert_eq!(m.id, 5);
        assert_eq!(m.data, 2);
    }
}
