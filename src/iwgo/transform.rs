//! Local-to-world placement of a structure.

use std::fmt;

use crate::core::types::IVec3;
use crate::math::checked_offset;

/// Maps shape-local voxel coordinates into world coordinates.
pub trait CoordinateTransform {
    /// `None` if the world position does not fit in `i32`.
    fn to_world(&self, local: IVec3) -> Option<IVec3>;
}

/// Quarter turn about the Y axis, clockwise when looking down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [Rotation::None, Rotation::Cw90, Rotation::Cw180, Rotation::Cw270];

    /// Parse a multiple of 90 degrees. Negative angles turn counter-clockwise.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }
        match degrees.rem_euclid(360) {
            0 => Some(Self::None),
            90 => Some(Self::Cw90),
            180 => Some(Self::Cw180),
            270 => Some(Self::Cw270),
            _ => None,
        }
    }

    pub fn degrees(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Cw90 => 90,
            Self::Cw180 => 180,
            Self::Cw270 => 270,
        }
    }

    /// Rotated vector, `None` if a negated axis is `i32::MIN`.
    pub fn apply(self, v: IVec3) -> Option<IVec3> {
        Some(match self {
            Self::None => v,
            Self::Cw90 => IVec3::new(v.z.checked_neg()?, v.y, v.x),
            Self::Cw180 => IVec3::new(v.x.checked_neg()?, v.y, v.z.checked_neg()?),
            Self::Cw270 => IVec3::new(v.z, v.y, v.x.checked_neg()?),
        })
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// World origin plus rotation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Placement {
    pub origin: IVec3,
    pub rotation: Rotation,
}

impl Placement {
    pub fn new(origin: IVec3, rotation: Rotation) -> Self {
        Self { origin, rotation }
    }

    pub fn at(origin: IVec3) -> Self {
        Self::new(origin, Rotation::None)
    }
}

impl CoordinateTransform for Placement {
    fn to_world(&self, local: IVec3) -> Option<IVec3> {
        checked_offset(self.origin, self.rotation.apply(local)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_degrees() {
        assert_eq!(Rotation::from_degrees(0), Some(Rotation::None));
        assert_eq!(Rotation::from_degrees(90), Some(Rotation::Cw90));
        assert_eq!(Rotation::from_degrees(450), Some(Rotation::Cw90));
        assert_eq!(Rotation::from_degrees(-90), Some(Rotation::Cw270));
        assert_eq!(Rotation::from_degrees(45), None);
    }

    #[test]
    fn test_four_turns_is_identity() {
        let v = IVec3::new(3, -2, 7);
        for r in Rotation::ALL {
            let mut p = v;
            for _ in 0..4 {
                p = r.apply(p).unwrap();
            }
            assert_eq!(p, v);
        }
        assert_eq!(Rotation::Cw90.apply(Rotation::Cw270.apply(v).unwrap()), Some(v));
    }

    #[test]
    fn test_rotation_keeps_height() {
        for r in Rotation::ALL {
            assert_eq!(r.apply(IVec3::new(1, 5, 2)).unwrap().y, 5);
        }
        assert_eq!(Rotation::Cw90.apply(IVec3::X), Some(IVec3::Z));
        assert_eq!(Rotation::Cw180.apply(IVec3::X), Some(-IVec3::X));
    }

    #[test]
    fn test_placement_to_world() {
        let placement = Placement::new(IVec3::new(100, 64, -20), Rotation::Cw180);
        assert_eq!(placement.to_world(IVec3::ZERO), Some(IVec3::new(100, 64, -20)));
        assert_eq!(placement.to_world(IVec3::new(1, 2, 3)), Some(IVec3::new(99, 66, -23)));
        assert_eq!(Placement::at(IVec3::ONE).to_world(IVec3::X), Some(IVec3::new(2, 1, 1)));
    }

    #[test]
    fn test_to_world_out_of_range() {
        let edge = Placement::at(IVec3::new(i32::MAX, 0, 0));
        assert_eq!(edge.to_world(IVec3::ZERO), Some(IVec3::new(i32::MAX, 0, 0)));
        assert_eq!(edge.to_world(IVec3::X), None);

        let turned = Placement::new(IVec3::ZERO, Rotation::Cw180);
        assert_eq!(turned.to_world(IVec3::new(i32::MIN, 0, 0)), None);
        assert_eq!(turned.to_world(IVec3::new(i32::MAX, 0, 0)), Some(IVec3::new(-i32::MAX, 0, 0)));
    }
}
