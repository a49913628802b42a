//! Binding of a picker to voxel writes.

use std::fmt;
use std::str::FromStr;

use crate::config::ConfigNode;
use crate::core::error::LoadError;
use crate::core::types::IVec3;
use crate::value::{RandomAware, RandomSource};
use crate::voxel::VoxelGrid;

use super::pickers::SimplePicker;
use super::{Material, MaterialError, MaterialPicker, MaterialRegistry, PickerRegistry, Properties};

/// What to do with a voxel whose picker returned "no material".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmptyPolicy {
    /// Write air, hollowing out whatever was there.
    #[default]
    Carve,
    /// Leave the voxel untouched.
    Skip,
}

impl FromStr for EmptyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "carve" | "air" => Ok(Self::Carve),
            "skip" | "keep" => Ok(Self::Skip),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for EmptyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Carve => write!(f, "carve"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// A named picker plus its empty policy. Shared by every instruction that
/// references it.
#[derive(Debug)]
pub struct MaterialSetter {
    name: String,
    picker: Box<dyn MaterialPicker>,
    empty: EmptyPolicy,
}

impl MaterialSetter {
    pub fn new(name: impl Into<String>, picker: Box<dyn MaterialPicker>, empty: EmptyPolicy) -> Self {
        Self {
            name: name.into(),
            picker,
            empty,
        }
    }

    /// Setter that always writes `material`.
    pub fn fixed(name: impl Into<String>, material: Material) -> Self {
        let name = name.into();
        let picker = SimplePicker::with_material(name.clone(), material);
        Self::new(name, Box::new(picker), EmptyPolicy::Carve)
    }

    /// Build a setter from a `{ "type", "empty"?, "properties"? }` node.
    pub fn load(
        name: &str,
        node: &ConfigNode<'_>,
        pickers: &PickerRegistry,
        materials: &dyn MaterialRegistry,
    ) -> Result<Self, LoadError> {
        Self::load_inner(name, node, pickers, materials).map_err(|e| LoadError::MaterialSetter {
            name: name.to_string(),
            source: Box::new(e),
        })
    }

    fn load_inner(
        name: &str,
        node: &ConfigNode<'_>,
        pickers: &PickerRegistry,
        materials: &dyn MaterialRegistry,
    ) -> Result<Self, LoadError> {
        let kind = node
            .string("type")
            .ok_or_else(|| LoadError::MissingKey("type".into()))?;
        let mut picker = pickers
            .create(&kind, name)
            .ok_or_else(|| LoadError::UnknownPicker(kind.clone()))?;

        let empty = match node.string("empty") {
            Some(value) => value
                .parse::<EmptyPolicy>()
                .map_err(|value| LoadError::InvalidKey { key: "empty".into(), value })?,
            None => EmptyPolicy::default(),
        };

        let properties = node
            .get("properties")
            .map(|p| p.properties())
            .unwrap_or_else(Properties::new);
        picker.configure(&properties, materials)?;

        log::debug!("Material setter '{}': {} ({})", name, kind, empty);
        Ok(Self::new(name, picker, empty))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn picker(&self) -> &dyn MaterialPicker {
        self.picker.as_ref()
    }

    pub fn empty_policy(&self) -> EmptyPolicy {
        self.empty
    }

    /// Ask the picker for `position` and write the result into `grid`.
    pub fn set_material(
        &self,
        grid: &mut dyn VoxelGrid,
        position: IVec3,
        is_shell: bool,
    ) -> Result<(), MaterialError> {
        match (self.picker.pick(is_shell)?, self.empty) {
            (Some(material), _) => grid.write_voxel(position, material),
            (None, EmptyPolicy::Carve) => grid.write_voxel(position, Material::AIR),
            (None, EmptyPolicy::Skip) => {}
        }
        Ok(())
    }
}

impl RandomAware for MaterialSetter {
    fn set_random_source(&mut self, source: &RandomSource) {
        if let Some(picker) = self.picker.as_random_aware() {
            picker.set_random_source(source);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_document;
    use crate::material::MaterialPalette;
    use crate::voxel::VoxelBuffer;

    fn load(json: &str) -> Result<MaterialSetter, LoadError> {
        let doc = parse_document(json).unwrap();
        MaterialSetter::load(
            "walls",
            &ConfigNode::new(&doc),
            &PickerRegistry::default(),
            &MaterialPalette::default(),
        )
    }

    #[test]
    fn test_load_inner_outer() {
        let setter = load(
            r#"{ "type": "inner-outer",
                 "properties": { "inner": { "material": "dirt" }, "outer.material": "stone" } }"#,
        )
        .unwrap();
        let palette = MaterialPalette::default();
        let mut grid = VoxelBuffer::new();
        setter.set_material(&mut grid, IVec3::ZERO, true).unwrap();
        setter.set_material(&mut grid, IVec3::X, false).unwrap();
        assert_eq!(grid.get(IVec3::ZERO), palette.resolve("stone"));
        assert_eq!(grid.get(IVec3::X), palette.resolve("dirt"));
        assert_eq!(setter.empty_policy(), EmptyPolicy::Carve);
    }

    #[test]
    fn test_empty_policy() {
        let json = |empty: &str| {
            format!(
                r#"{{ "type": "random-simple", "empty": "{empty}",
                      "properties": {{ "material": "stone", "odd": 0 }} }}"#
            )
        };
        let mut grid = VoxelBuffer::new();

        let carve = load(&json("carve")).unwrap();
        carve.set_material(&mut grid, IVec3::ZERO, true).unwrap();
        assert_eq!(grid.get(IVec3::ZERO), Some(Material::AIR));

        let skip = load(&json("skip")).unwrap();
        skip.set_material(&mut grid, IVec3::Y, true).unwrap();
        assert_eq!(grid.get(IVec3::Y), None);
        assert_eq!(grid.len(), 1);

        let err = load(&json("melt")).unwrap_err();
        assert!(matches!(err.root_cause(), LoadError::InvalidKey { key, .. } if key == "empty"));
    }

    #[test]
    fn test_load_errors_are_wrapped() {
        let err = load(r#"{ "type": "gradient" }"#).unwrap_err();
        assert!(matches!(&err, LoadError::MaterialSetter { name, .. } if name == "walls"));
        assert!(matches!(err.root_cause(), LoadError::UnknownPicker(kind) if kind == "gradient"));

        let err = load(r#"{ "properties": {} }"#).unwrap_err();
        assert!(matches!(err.root_cause(), LoadError::MissingKey(key) if key == "type"));

        let err = load(r#"{ "type": "simple", "properties": { "material": "unobtainium" } }"#)
            .unwrap_err();
        assert!(matches!(
            err.root_cause(),
            LoadError::Material(MaterialError::UnknownMaterial(_))
        ));
    }

    #[test]
    fn test_fixed_setter() {
        let brick = Material::new(8).with_data(1);
        let setter = MaterialSetter::fixed("brick", brick);
        let mut grid = VoxelBuffer::new();
        setter.set_material(&mut grid, IVec3::ONE, false).unwrap();
        assert_eq!(grid.writes(), &[(IVec3::ONE, brick)]);
    }
}
