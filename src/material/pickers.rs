//! Built-in material pickers.
//!
//! | key                  | properties                                               |
//! |----------------------|----------------------------------------------------------|
//! | `simple`             | `material`, `data`?                                      |
//! | `random-simple`      | `material`, `data`?, `odd`                               |
//! | `inner-outer`        | `inner.material`, `outer.material` (+ `.data`?)          |
//! | `random-inner-outer` | as `inner-outer`, plus `inner.odd`, `outer.odd`          |
//!
//! Odds are percentages: a roll in `0..100` below the odds keeps the material.

use crate::value::{RandomAware, RandomHandle, RandomSource};

use super::picker::{material_property, odds_property, MaterialPicker};
use super::{Material, MaterialError, MaterialRegistry, Properties};

/// Keep `material` with `odds` percent probability.
fn roll(random: &RandomHandle, odds: u8, material: Material) -> Result<Option<Material>, MaterialError> {
    match odds {
        0 => Ok(None),
        100.. => Ok(Some(material)),
        _ => {
            let roll = random.percent().ok_or(MaterialError::MissingRandomSource)?;
            Ok((roll < odds).then_some(material))
        }
    }
}

/// Always the same material.
#[derive(Debug, Clone)]
pub struct SimplePicker {
    name: String,
    material: Material,
}

impl SimplePicker {
    pub const KIND: &'static str = "simple";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            material: Material::AIR,
        }
    }

    /// Already configured picker.
    pub fn with_material(name: impl Into<String>, material: Material) -> Self {
        Self {
            name: name.into(),
            material,
        }
    }

    pub fn boxed(name: String) -> Box<dyn MaterialPicker> {
        Box::new(Self::new(name))
    }

    pub fn material(&self) -> Material {
        self.material
    }
}

impl MaterialPicker for SimplePicker {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn configure(&mut self, properties: &Properties, materials: &dyn MaterialRegistry) -> Result<(), MaterialError> {
        self.material = material_property(properties, "", materials)?;
        Ok(())
    }

    fn pick(&self, _is_shell: bool) -> Result<Option<Material>, MaterialError> {
        Ok(Some(self.material))
    }
}

/// One material, kept with a fixed probability.
#[derive(Debug, Clone)]
pub struct RandomSimplePicker {
    name: String,
    material: Material,
    odds: u8,
    random: RandomHandle,
}

impl RandomSimplePicker {
    pub const KIND: &'static str = "random-simple";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            material: Material::AIR,
            odds: 0,
            random: RandomHandle::default(),
        }
    }

    pub fn boxed(name: String) -> Box<dyn MaterialPicker> {
        Box::new(Self::new(name))
    }

    pub fn odds(&self) -> u8 {
        self.odds
    }
}

impl MaterialPicker for RandomSimplePicker {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn configure(&mut self, properties: &Properties, materials: &dyn MaterialRegistry) -> Result<(), MaterialError> {
        self.material = material_property(properties, "", materials)?;
        self.odds = odds_property(properties, "")?;
        Ok(())
    }

    fn pick(&self, _is_shell: bool) -> Result<Option<Material>, MaterialError> {
        roll(&self.random, self.odds, self.material)
    }

    fn as_random_aware(&mut self) -> Option<&mut dyn RandomAware> {
        Some(self)
    }
}

impl RandomAware for RandomSimplePicker {
    fn set_random_source(&mut self, source: &RandomSource) {
        self.random = source.handle();
    }
}

/// One material for shell voxels, another for interior voxels.
#[derive(Debug, Clone)]
pub struct InnerOuterPicker {
    name: String,
    inner: Material,
    outer: Material,
}

impl InnerOuterPicker {
    pub const KIND: &'static str = "inner-outer";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inner: Material::AIR,
            outer: Material::AIR,
        }
    }

    pub fn boxed(name: String) -> Box<dyn MaterialPicker> {
        Box::new(Self::new(name))
    }
}

impl MaterialPicker for InnerOuterPicker {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn configure(&mut self, properties: &Properties, materials: &dyn MaterialRegistry) -> Result<(), MaterialError> {
        self.inner = material_property(properties, "inner.", materials)?;
        self.outer = material_property(properties, "outer.", materials)?;
        Ok(())
    }

    fn pick(&self, is_shell: bool) -> Result<Option<Material>, MaterialError> {
        Ok(Some(if is_shell { self.outer } else { self.inner }))
    }
}

/// Inner/outer materials, each side kept with its own probability.
#[derive(Debug, Clone)]
pub struct RandomInnerOuterPicker {
    name: String,
    inner: Material,
    inner_odds: u8,
    outer: Material,
    outer_odds: u8,
    random: RandomHandle,
}

impl RandomInnerOuterPicker {
    pub const KIND: &'static str = "random-inner-outer";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inner: Material::AIR,
            inner_odds: 0,
            outer: Material::AIR,
            outer_odds: 0,
            random: RandomHandle::default(),
        }
    }

    pub fn boxed(name: String) -> Box<dyn MaterialPicker> {
        Box::new(Self::new(name))
    }
}

impl MaterialPicker for RandomInnerOuterPicker {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn configure(&mut self, properties: &Properties, materials: &dyn MaterialRegistry) -> Result<(), MaterialError> {
        self.inner = material_property(properties, "inner.", materials)?;
        self.inner_odds = odds_property(properties, "inner.")?;
        self.outer = material_property(properties, "outer.", materials)?;
        self.outer_odds = odds_property(properties, "outer.")?;
        Ok(())
    }

    fn pick(&self, is_shell: bool) -> Result<Option<Material>, MaterialError> {
        if is_shell {
            roll(&self.random, self.outer_odds, self.outer)
        } else {
            roll(&self.random, self.inner_odds, self.inner)
        }
    }

    fn as_random_aware(&mut self) -> Option<&mut dyn RandomAware> {
        Some(self)
    }
}

impl RandomAware for RandomInnerOuterPicker {
    fn set_random_source(&mut self, source: &RandomSource) {
        self.random = source.handle();
    }
}
