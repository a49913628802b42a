//! Voxel write targets.
//!
//! The engine never reads world state; it only issues writes through
//! [`VoxelGrid`]. Hosts implement the trait over their own world storage.

use std::collections::{BTreeMap, HashMap};

use crate::core::types::IVec3;
use crate::material::Material;
use crate::math::VoxelBounds;

/// Write-only view of the host's voxel world.
pub trait VoxelGrid {
    fn write_voxel(&mut self, position: IVec3, material: Material);
}

/// In-memory grid keeping the ordered write log and the final voxel state.
#[derive(Debug, Clone, Default)]
pub struct VoxelBuffer {
    writes: Vec<(IVec3, Material)>,
    voxels: HashMap<IVec3, Material>,
    bounds: Option<VoxelBounds>,
}

impl VoxelBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Final material at `position` (last write wins).
    pub fn get(&self, position: IVec3) -> Option<Material> {
        self.voxels.get(&position).copied()
    }

    /// Every write in issue order, including overwrites.
    pub fn writes(&self) -> &[(IVec3, Material)] {
        &self.writes
    }

    /// Number of distinct voxels written.
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// Bounds of every written voxel, `None` if nothing was written.
    pub fn bounds(&self) -> Option<VoxelBounds> {
        self.bounds
    }

    /// Distinct voxels per final material.
    pub fn material_counts(&self) -> BTreeMap<Material, usize> {
        let mut counts = BTreeMap::new();
        for material in self.voxels.values() {
            *counts.entry(*material).or_insert(0) += 1;
        }
        counts
    }

    /// Final voxel state as a map.
    pub fn voxels(&self) -> &HashMap<IVec3, Material> {
        &self.voxels
    }

    pub fn clear(&mut self) {
        self.writes.clear();
        self.voxels.clear();
        self.bounds = None;
    }
}

impl VoxelGrid for VoxelBuffer {
    fn write_voxel(&mut self, position: IVec3, material: Material) {
        self.writes.push((position, material));
        self.voxels.insert(position, material);
        match &mut self.bounds {
            Some(bounds) => bounds.expand(position),
            None => self.bounds = Some(VoxelBounds::from_point(position)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins() {
        let mut buffer = VoxelBuffer::new();
        let p = IVec3::new(1, 2, 3);
        buffer.write_voxel(p, Material::new(1));
        buffer.write_voxel(p, Material::new(2));

        assert_eq!(buffer.get(p), Some(Material::new(2)));
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.writes().len(), 2);
    }

    #[test]
    fn test_bounds_and_counts() {
        let mut buffer = VoxelBuffer::new();
        assert_eq!(buffer.bounds(), None);
        buffer.write_voxel(IVec3::new(-1, 0, 0), Material::new(1));
        buffer.write_voxel(IVec3::new(2, 3, 0), Material::new(1));
        buffer.write_voxel(IVec3::new(0, 0, 4), Material::AIR);

        let bounds = buffer.bounds().unwrap();
        assert_eq!(bounds.min, IVec3::new(-1, 0, 0));
        assert_eq!(bounds.max, IVec3::new(2, 3, 4));

        let counts = buffer.material_counts();
        assert_eq!(counts.get(&Material::new(1)), Some(&2));
        assert_eq!(counts.get(&Material::AIR), Some(&1));
    }

    #[test]
    fn test_clear() {
        let mut buffer = VoxelBuffer::new();
        buffer.write_voxel(IVec3::ZERO, Material::new(1));
        buffer.clear();
        assert!(buffer.is_empty());
        assert!(buffer.writes().is_empty());
        assert_eq!(buffer.bounds(), None);
    }
}
