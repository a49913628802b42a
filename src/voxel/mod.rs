//! Voxel write targets

pub mod grid;

pub use grid::{VoxelBuffer, VoxelGrid};
