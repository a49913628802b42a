//! Ellipsoid centered on the origin.
//!
//! One octant is walked with normalized distances and mirrored into the
//! other seven. Each radius is widened by half a voxel so a zero radius
//! still yields the center voxel. A voxel is inside when the normalized
//! position of its inner face lies within the unit sphere, and shell when
//! stepping to any of its outer faces leaves it.

use glam::DVec3;

use crate::core::error::DrawError;
use crate::core::types::IVec3;
use crate::math::{VoxelBounds, checked_offset};
use crate::value::{RandomAware, RandomSource, Value};

use super::{Shape, ShapeError, SizeMap, VoxelSink, reject_extra_sizes, take_size};

const SIZE_KEYS: &[&str] = &["radiusX", "radiusY", "radiusZ"];

/// Octant sign combinations.
const MIRRORS: [IVec3; 8] = [
    IVec3::new(1, 1, 1),
    IVec3::new(-1, 1, 1),
    IVec3::new(1, -1, 1),
    IVec3::new(-1, -1, 1),
    IVec3::new(1, 1, -1),
    IVec3::new(-1, 1, -1),
    IVec3::new(1, -1, -1),
    IVec3::new(-1, -1, -1),
];

#[derive(Debug, Clone)]
pub struct Sphere {
    radius_x: Value,
    radius_y: Value,
    radius_z: Value,
}

impl Sphere {
    pub const KIND: &'static str = "sphere";

    pub fn new() -> Self {
        Self {
            radius_x: Value::constant(0.0),
            radius_y: Value::constant(0.0),
            radius_z: Value::constant(0.0),
        }
    }

    pub fn boxed() -> Box<dyn Shape> {
        Box::new(Self::new())
    }

    /// Effective per-axis radii, or `None` if any radius is negative or not finite.
    fn effective_radii(&self) -> Option<DVec3> {
        let radii = DVec3::new(
            self.radius_x.cached(),
            self.radius_y.cached(),
            self.radius_z.cached(),
        );
        if !radii.is_finite() || radii.cmplt(DVec3::ZERO).any() {
            return None;
        }
        Some(radii + DVec3::splat(0.5))
    }

    /// Effective radii and bounding box at `origin`, `Ok(None)` if empty.
    fn footprint(&self, origin: IVec3) -> Result<Option<(DVec3, VoxelBounds)>, DrawError> {
        let Some(r) = self.effective_radii() else {
            return Ok(None);
        };
        // The octant walk probes two voxels past the radius.
        let half = r.floor().as_ivec3();
        if half.max_element() > i32::MAX - 2 {
            return Err(DrawError::OutOfRange(origin));
        }
        match (checked_offset(origin, -half), checked_offset(origin, half)) {
            (Some(min), Some(max)) => Ok(Some((r, VoxelBounds::new(min, max)))),
            _ => Err(DrawError::OutOfRange(origin)),
        }
    }

    /// Walk the positive octant, calling `visit(offset, shell)` for every accepted voxel.
    fn walk_octant(
        r: DVec3,
        visit: &mut dyn FnMut(IVec3, bool) -> Result<(), DrawError>,
    ) -> Result<(), DrawError> {
        let mut next_xn = 0.0;
        let mut xx = 0;
        'x: loop {
            let xn = next_xn;
            next_xn = (xx + 1) as f64 / r.x;
            let mut next_yn = 0.0;
            let mut yy = 0;
            'y: loop {
                let yn = next_yn;
                next_yn = (yy + 1) as f64 / r.y;
                let mut next_zn = 0.0;
                let mut zz = 0;
                loop {
                    let zn = next_zn;
                    next_zn = (zz + 1) as f64 / r.z;

                    if length_sq(xn, yn, zn) > 1.0 {
                        if zz == 0 {
                            if yy == 0 {
                                break 'x;
                            }
                            break 'y;
                        }
                        break;
                    }

                    let shell = length_sq(next_xn, yn, zn) > 1.0
                        || length_sq(xn, next_yn, zn) > 1.0
                        || length_sq(xn, yn, next_zn) > 1.0;
                    visit(IVec3::new(xx, yy, zz), shell)?;
                    zz += 1;
                }
                yy += 1;
            }
            xx += 1;
        }
        Ok(())
    }
}

fn length_sq(x: f64, y: f64, z: f64) -> f64 {
    x * x + y * y + z * z
}

impl Default for Sphere {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomAware for Sphere {
    fn set_random_source(&mut self, source: &RandomSource) {
        self.radius_x.set_random_source(source);
        self.radius_y.set_random_source(source);
        self.radius_z.set_random_source(source);
    }
}

impl Shape for Sphere {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn size_keys(&self) -> &'static [&'static str] {
        SIZE_KEYS
    }

    fn set_size(&mut self, mut sizes: SizeMap) -> Result<(), ShapeError> {
        let x = take_size(&mut sizes, Self::KIND, "radiusX")?;
        let y = take_size(&mut sizes, Self::KIND, "radiusY")?;
        let z = take_size(&mut sizes, Self::KIND, "radiusZ")?;
        reject_extra_sizes(&sizes, Self::KIND)?;
        self.radius_x = x;
        self.radius_y = y;
        self.radius_z = z;
        Ok(())
    }

    fn sizes(&self) -> Vec<&Value> {
        vec![&self.radius_x, &self.radius_y, &self.radius_z]
    }

    fn sizes_mut(&mut self) -> Vec<&mut Value> {
        vec![&mut self.radius_x, &mut self.radius_y, &mut self.radius_z]
    }

    fn bounds(&self, origin: IVec3) -> Option<VoxelBounds> {
        self.footprint(origin).ok().flatten().map(|(_, bounds)| bounds)
    }

    fn rasterize(&self, origin: IVec3, sink: &mut VoxelSink<'_>) -> Result<(), DrawError> {
        let Some((r, _)) = self.footprint(origin)? else {
            return Ok(());
        };
        Self::walk_octant(r, &mut |offset, shell| {
            for sign in MIRRORS {
                // A zero coordinate has only one sign.
                if (sign.x < 0 && offset.x == 0)
                    || (sign.y < 0 && offset.y == 0)
                    || (sign.z < 0 && offset.z == 0)
                {
                    continue;
                }
                sink(origin + offset * sign, shell)?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::test_util::{collect, sizes, try_collect};
    use std::collections::HashMap;

    fn sphere(rx: f64, ry: f64, rz: f64) -> Sphere {
        let mut s = Sphere::new();
        s.set_size(sizes(&[("radiusX", rx), ("radiusY", ry), ("radiusZ", rz)]))
            .unwrap();
        s
    }

    /// Classify every voxel of a generous box directly from the formula.
    fn brute_force(rx: f64, ry: f64, rz: f64) -> HashMap<IVec3, bool> {
        let r = DVec3::new(rx, ry, rz) + DVec3::splat(0.5);
        let reach = r.ceil().as_ivec3() + IVec3::ONE;
        let mut out = HashMap::new();
        for x in -reach.x..=reach.x {
            for y in -reach.y..=reach.y {
                for z in -reach.z..=reach.z {
                    let a = IVec3::new(x, y, z).abs().as_dvec3();
                    let inner = a / r;
                    let outer = (a + DVec3::ONE) / r;
                    if length_sq(inner.x, inner.y, inner.z) > 1.0 {
                        continue;
                    }
                    let shell = length_sq(outer.x, inner.y, inner.z) > 1.0
                        || length_sq(inner.x, outer.y, inner.z) > 1.0
                        || length_sq(inner.x, inner.y, outer.z) > 1.0;
                    out.insert(IVec3::new(x, y, z), shell);
                }
            }
        }
        out
    }

    #[test]
    fn test_zero_radius_is_single_voxel() {
        let voxels = collect(&sphere(0.0, 0.0, 0.0), IVec3::new(1, 2, 3));
        assert_eq!(voxels, vec![(IVec3::new(1, 2, 3), true)]);
    }

    #[test]
    fn test_matches_brute_force() {
        let radii = [0.0, 0.5, 1.0, 1.5, 2.0, 2.3, 3.0, 4.7];
        for &rx in &radii {
            for &ry in &radii {
                for &rz in &radii {
                    let voxels = collect(&sphere(rx, ry, rz), IVec3::ZERO);
                    let expected = brute_force(rx, ry, rz);

                    let got: HashMap<IVec3, bool> = voxels.iter().copied().collect();
                    assert_eq!(got.len(), voxels.len(), "duplicate voxel for ({rx},{ry},{rz})");
                    assert_eq!(got, expected, "radii ({rx},{ry},{rz})");
                }
            }
        }
    }

    #[test]
    fn test_footprint_within_bounds() {
        let s = sphere(3.0, 1.0, 2.5);
        let origin = IVec3::new(10, -4, 0);
        let bounds = s.bounds(origin).unwrap();
        for (p, _) in collect(&s, origin) {
            assert!(bounds.contains(p), "{p} outside {bounds:?}");
        }
        assert!(bounds.contains(origin + IVec3::new(3, 0, 0)));
        assert!(bounds.contains(origin + IVec3::new(0, 0, -3)));
    }

    #[test]
    fn test_symmetric_around_center() {
        let origin = IVec3::new(5, 5, 5);
        let voxels: HashMap<IVec3, bool> = collect(&sphere(3.0, 2.0, 4.0), origin)
            .into_iter()
            .collect();
        for (p, shell) in &voxels {
            let mirrored = origin * 2 - *p;
            assert_eq!(voxels.get(&mirrored), Some(shell));
        }
    }

    #[test]
    fn test_footprint_past_i32_is_error() {
        let unit = sphere(1.0, 1.0, 1.0);
        let edge = IVec3::new(0, i32::MIN, 0);
        assert!(unit.bounds(edge).is_none());
        assert!(matches!(try_collect(&unit, edge), Err(DrawError::OutOfRange(p)) if p == edge));

        let huge = sphere(1e12, 0.0, 0.0);
        assert!(matches!(try_collect(&huge, IVec3::ZERO), Err(DrawError::OutOfRange(_))));

        let inside = IVec3::new(0, i32::MIN + 1, 0);
        assert_eq!(collect(&unit, inside).len(), collect(&unit, IVec3::ZERO).len());
    }

    #[test]
    fn test_negative_radius_is_empty() {
        let s = sphere(2.0, -1.0, 2.0);
        assert!(collect(&s, IVec3::ZERO).is_empty());
        assert!(s.bounds(IVec3::ZERO).is_none());
    }

    #[test]
    fn test_missing_radius() {
        let mut s = Sphere::new();
        let err = s.set_size(sizes(&[("radiusX", 1.0), ("radiusZ", 1.0)])).unwrap_err();
        assert_eq!(err, ShapeError::MissingSize { shape: "sphere", key: "radiusY" });
    }
}
