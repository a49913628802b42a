//! Structure templates and their placement.
//!
//! An [`Iwgo`] is a named blueprint of instructions drawn through a
//! [`Placement`]. [`IwgoManager`] loads a folder of blueprints.

pub mod config;
pub mod manager;
pub mod template;
pub mod transform;

pub use config::{LoadPolicy, ManagerConfig};
pub use manager::IwgoManager;
pub use template::{Iwgo, Registries};
pub use transform::{CoordinateTransform, Placement, Rotation};
