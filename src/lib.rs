//! Infobjects - randomized voxel structure templates
//!
//! Blueprints declare variables, material setters and shape instructions.
//! Loading turns them into an [`iwgo::Iwgo`]; placing one randomizes every
//! expression from a shared seedable source and rasterizes each shape into
//! a [`voxel::VoxelGrid`].

pub mod core;
pub mod math;
pub mod value;
pub mod material;
pub mod shape;
pub mod voxel;
pub mod config;
pub mod instruction;
pub mod iwgo;
