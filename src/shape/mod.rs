//! Voxel rasterization of primitive shapes.
//!
//! A shape owns its size [`Value`]s and walks its footprint from an integer
//! origin, reporting every voxel exactly once together with its shell flag.
//! Placement, transform and material assignment belong to the owning
//! [`Instruction`](crate::instruction::Instruction).

pub mod cuboid;
pub mod line;
pub mod sphere;

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use thiserror::Error;

use crate::core::error::DrawError;
use crate::core::types::IVec3;
use crate::math::VoxelBounds;
use crate::value::{Environment, RandomAware, Value, ValueError};

pub use cuboid::Cuboid;
pub use line::Line;
pub use sphere::Sphere;

/// Size expressions by key, as declared in the blueprint.
pub type SizeMap = BTreeMap<String, Value>;

/// Receives `(local position, is_shell)` for each voxel in a footprint.
pub type VoxelSink<'a> = dyn FnMut(IVec3, bool) -> Result<(), DrawError> + 'a;

/// Errors raised while configuring a shape
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("{shape}: {key} size is missing")]
    MissingSize { shape: &'static str, key: &'static str },

    #[error("{shape}: unexpected size \"{key}\"")]
    UnexpectedSize { shape: &'static str, key: String },
}

/// A rasterization algorithm with its size parameters.
pub trait Shape: RandomAware + fmt::Debug {
    /// Registry key.
    fn kind(&self) -> &'static str;

    /// Size keys `set_size` requires, in evaluation order.
    fn size_keys(&self) -> &'static [&'static str];

    /// Take the required sizes out of `sizes`. Missing or unknown keys fail.
    fn set_size(&mut self, sizes: SizeMap) -> Result<(), ShapeError>;

    /// Size values in `size_keys` order.
    fn sizes(&self) -> Vec<&Value>;

    fn sizes_mut(&mut self) -> Vec<&mut Value>;

    /// Recalculate every size value in `size_keys` order. On error no
    /// cached size changes.
    fn randomize(&mut self, env: &Environment) -> Result<(), ValueError> {
        let results = self
            .sizes()
            .into_iter()
            .map(|v| v.evaluate(env))
            .collect::<Result<Vec<_>, _>>()?;
        for (value, result) in self.sizes_mut().into_iter().zip(results) {
            value.set_cached(result);
        }
        Ok(())
    }

    /// Footprint bounds for the current cached sizes. `None` if empty or
    /// outside the `i32` voxel range.
    fn bounds(&self, origin: IVec3) -> Option<VoxelBounds>;

    /// Emit each voxel of the footprint once, using cached sizes only.
    /// Fails with [`DrawError::OutOfRange`] before emitting anything if the
    /// footprint does not fit in `i32` coordinates.
    fn rasterize(&self, origin: IVec3, sink: &mut VoxelSink<'_>) -> Result<(), DrawError>;
}

/// Remove a required size from `sizes`.
pub(crate) fn take_size(
    sizes: &mut SizeMap,
    shape: &'static str,
    key: &'static str,
) -> Result<Value, ShapeError> {
    sizes.remove(key).ok_or(ShapeError::MissingSize { shape, key })
}

/// Fail on the first size key the shape did not consume.
pub(crate) fn reject_extra_sizes(sizes: &SizeMap, shape: &'static str) -> Result<(), ShapeError> {
    match sizes.keys().next() {
        Some(key) => Err(ShapeError::UnexpectedSize { shape, key: key.clone() }),
        None => Ok(()),
    }
}

/// Builds an unconfigured shape.
pub type ShapeConstructor = fn() -> Box<dyn Shape>;

/// Shape types by registry key.
#[derive(Clone)]
pub struct ShapeRegistry {
    constructors: HashMap<String, ShapeConstructor>,
}

impl ShapeRegistry {
    /// Registry without any shape types.
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Register (or replace) a shape type.
    pub fn register(&mut self, kind: &str, constructor: ShapeConstructor) {
        self.constructors.insert(kind.to_string(), constructor);
    }

    /// New unconfigured shape of type `kind`, or `None` if `kind` is unknown.
    pub fn create(&self, kind: &str) -> Option<Box<dyn Shape>> {
        self.constructors.get(kind).map(|ctor| ctor())
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

impl Default for ShapeRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Cuboid::KIND, Cuboid::boxed);
        registry.register(Sphere::KIND, Sphere::boxed);
        registry.register(Line::KIND, Line::boxed);
        registry
    }
}

impl fmt::Debug for ShapeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeRegistry").field("kinds", &self.kinds()).finish()
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;

    pub fn sizes(pairs: &[(&str, f64)]) -> SizeMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::constant(*v)))
            .collect()
    }

    /// Rasterize into a list of `(position, shell)` pairs.
    pub fn try_collect(shape: &dyn Shape, origin: IVec3) -> Result<Vec<(IVec3, bool)>, DrawError> {
        let mut out = Vec::new();
        shape.rasterize(origin, &mut |p, shell| {
            out.push((p, shell));
            Ok(())
        })?;
        Ok(out)
    }

    pub fn collect(shape: &dyn Shape, origin: IVec3) -> Vec<(IVec3, bool)> {
        try_collect(shape, origin).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry() {
        let registry = ShapeRegistry::default();
        assert_eq!(registry.kinds(), vec!["cuboid", "line", "sphere"]);
        assert_eq!(registry.create("sphere").unwrap().kind(), "sphere");
        assert!(registry.create("torus").is_none());
    }

    #[test]
    fn test_size_keys_match_kind() {
        let registry = ShapeRegistry::default();
        assert_eq!(registry.create("cuboid").unwrap().size_keys(), &["x", "y", "z"]);
        assert_eq!(
            registry.create("sphere").unwrap().size_keys(),
            &["radiusX", "radiusY", "radiusZ"]
        );
    }

    #[test]
    fn test_take_and_reject() {
        let mut sizes = test_util::sizes(&[("x", 1.0), ("w", 2.0)]);
        assert!(take_size(&mut sizes, "cuboid", "x").is_ok());
        assert_eq!(
            take_size(&mut sizes, "cuboid", "y").unwrap_err(),
            ShapeError::MissingSize { shape: "cuboid", key: "y" }
        );
        assert_eq!(
            reject_extra_sizes(&sizes, "cuboid"),
            Err(ShapeError::UnexpectedSize { shape: "cuboid", key: "w".into() })
        );
    }
}
