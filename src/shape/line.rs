//! Voxel line from the origin to an end offset.

use crate::core::error::DrawError;
use crate::core::types::IVec3;
use crate::math::{VoxelBounds, checked_offset};
use crate::value::{RandomAware, RandomSource, Value};

use super::{Shape, ShapeError, SizeMap, VoxelSink, reject_extra_sizes, take_size};

const SIZE_KEYS: &[&str] = &["x", "y", "z"];

/// Line whose sizes are the end point relative to the origin. Every voxel is shell.
#[derive(Debug, Clone)]
pub struct Line {
    x: Value,
    y: Value,
    z: Value,
}

impl Line {
    pub const KIND: &'static str = "line";

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

    /// End offset, truncated to whole voxels.
    pub fn offset(&self) -> IVec3 {
        IVec3::new(
            self.x.cached() as i32,
            self.y.cached() as i32,
            self.z.cached() as i32,
        )
    }
}

impl Default for Line {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomAware for Line {
    fn set_random_source(&mut self, source: &RandomSource) {
        self.x.set_random_source(source);
        self.y.set_random_source(source);
        self.z.set_random_source(source);
    }
}

impl Shape for Line {
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
        checked_offset(origin, self.offset()).map(|end| VoxelBounds::new(origin, end))
    }

    fn rasterize(&self, origin: IVec3, sink: &mut VoxelSink<'_>) -> Result<(), DrawError> {
        let offset = self.offset();
        // Every point lies between the origin and the end.
        checked_offset(origin, offset).ok_or(DrawError::OutOfRange(origin))?;
        // The dominant axis advances by one voxel per step.
        let steps = offset.as_i64vec3().abs().max_element();
        if steps == 0 {
            return sink(origin, true);
        }
        let delta = offset.as_dvec3() / steps as f64;
        for i in 0..=steps {
            let p = (delta * i as f64).round().as_ivec3();
            sink(origin + p, true)?;
        }
        Ok(())
    }
}
