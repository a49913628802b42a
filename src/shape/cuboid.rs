//! Axis-aligned box anchored at its lower corner.

use crate::core::error::DrawError;
use crate::core::types::IVec3;
use crate::math::{VoxelBounds, checked_offset};
use crate::value::{RandomAware, RandomSource, Value};

use super::{Shape, ShapeError, SizeMap, VoxelSink, reject_extra_sizes, take_size};

const SIZE_KEYS: &[&str] = &["x", "y", "z"];

/// Box of `x * y * z` voxels starting at the origin.
#[derive(Debug, Clone)]
pub struct Cuboid {
    x: Value,
    y: Value,
    z: Value,
}

impl Cuboid {
    pub const KIND: &'static str = "cuboid";

    /// Zero-sized cuboid; configure with [`Shape::set_size`].
    pub fn new() -> Self {
        Self {
            x: Value::constant(0.0),
            y: Value::constant(0.0),
            z: Value::constant(0.0),
        }
    }

    pub fn boxed() -> Box<dyn Shape> {
        Box::new(Self::new())
    }

    /// Evaluated extents, truncated to whole voxels.
    pub fn extent(&self) -> IVec3 {
        IVec3::new(
            self.x.cached() as i32,
            self.y.cached() as i32,
            self.z.cached() as i32,
        )
    }

    /// Footprint at `origin`, `Ok(None)` if any extent is not positive.
    fn footprint(&self, origin: IVec3) -> Result<Option<VoxelBounds>, DrawError> {
        let extent = self.extent();
        if extent.cmple(IVec3::ZERO).any() {
            return Ok(None);
        }
        let max = checked_offset(origin, extent - IVec3::ONE).ok_or(DrawError::OutOfRange(origin))?;
        Ok(Some(VoxelBounds::new(origin, max)))
    }
}

impl Default for Cuboid {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomAware for Cuboid {
    fn set_random_source(&mut self, source: &RandomSource) {
        self.x.set_random_source(source);
        self.y.set_random_source(source);
        self.z.set_random_source(source);
    }
}

impl Shape for Cuboid {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn size_keys(&self) -> &'static [&'static str] {
        SIZE_KEYS
    }

    fn set_size(&mut self, mut sizes: SizeMap) -> Result<(), ShapeError> {
        let x = take_size(&mut sizes, Self::KIND, "x")?;
        let y = take_size(&mut sizes, Self::KIND, "y")?;
        let z = take_size(&mut sizes, Self::KIND, "z")?;
        reject_extra_sizes(&sizes, Self::KIND)?;
        self.x = x;
        self.y = y;
        self.z = z;
        Ok(())
    }

    fn sizes(&self) -> Vec<&Value> {
        vec![&self.x, &self.y, &self.z]
    }

    fn sizes_mut(&mut self) -> Vec<&mut Value> {
        vec![&mut self.x, &mut self.y, &mut self.z]
    }

    fn bounds(&self, origin: IVec3) -> Option<VoxelBounds> {
        self.footprint(origin).ok().flatten()
    }

    fn rasterize(&self, origin: IVec3, sink: &mut VoxelSink<'_>) -> Result<(), DrawError> {
        let Some(bounds) = self.footprint(origin)? else {
            return Ok(());
        };
        for p in bounds.iter() {
            sink(p, bounds.on_boundary(p))?;
        }
        Ok(())
    }
}
