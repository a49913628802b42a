//! Integer voxel bounding box

use crate::core::types::IVec3;

/// Componentwise `a + b`, or `None` if any axis overflows
pub fn checked_offset(a: IVec3, b: IVec3) -> Option<IVec3> {
    Some(IVec3::new(
        a.x.checked_add(b.x)?,
        a.y.checked_add(b.y)?,
        a.z.checked_add(b.z)?,
    ))
}

/// Inclusive integer box defined by min and max voxel corners
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VoxelBounds {
    pub min: IVec3,
    pub max: IVec3,
}

impl VoxelBounds {
    /// Create bounds from two corners in any order
    pub fn new(a: IVec3, b: IVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Bounds covering a single voxel
    pub fn from_point(p: IVec3) -> Self {
        Self { min: p, max: p }
    }

    /// Number of voxels along each axis
    pub fn size(&self) -> IVec3 {
        self.max - self.min + IVec3::ONE
    }

    /// Total voxel count
    pub fn volume(&self) -> u64 {
        let s = self.size();
        s.x as u64 * s.y as u64 * s.z as u64
    }

    /// Check if voxel is inside bounds
    pub fn contains(&self, p: IVec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Check if voxel lies on the boundary faces
    pub fn on_boundary(&self, p: IVec3) -> bool {
        self.contains(p) && (p.cmpeq(self.min).any() || p.cmpeq(self.max).any())
    }

    /// Expand bounds to include voxel
    pub fn expand(&mut self, p: IVec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Return merged bounds containing both
    pub fn merged(&self, other: &VoxelBounds) -> VoxelBounds {
        VoxelBounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Every voxel in the box, x outermost
    pub fn iter(&self) -> impl Iterator<Item = IVec3> + '_ {
        (self.min.x..=self.max.x).flat_map(move |x| {
            (self.min.y..=self.max.y).flat_map(move |y| {
                (self.min.z..=self.max.z).map(move |z| IVec3::new(x, y, z))
            })
        })
    }
}
