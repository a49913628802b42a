//! Integer voxel math

pub mod bounds;

pub use bounds::{VoxelBounds, checked_offset};
