//! Error types for the structure engine
//!
//! Configuration problems surface as [`LoadError`] before any voxel is
//! written. Failures while materializing a structure surface as
//! [`DrawError`]. [`Error`] is the union handed to hosts.

use thiserror::Error;

use crate::core::types::IVec3;
use crate::material::MaterialError;
use crate::shape::ShapeError;
use crate::value::ValueError;

/// Main error type for the engine
#[derive(Debug, Error)]
pub enum Error {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Draw error: {0}")]
    Draw(#[from] DrawError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown IWGO \"{0}\"")]
    UnknownIwgo(String),
}

/// Configuration errors raised while loading templates, instructions and setters
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("missing key \"{0}\"")]
    MissingKey(String),

    #[error("invalid value for \"{key}\": \"{value}\"")]
    InvalidKey { key: String, value: String },

    #[error("unknown shape type \"{0}\"")]
    UnknownShape(String),

    #[error("unknown material picker type \"{0}\"")]
    UnknownPicker(String),

    #[error("unknown material setter \"{0}\"")]
    UnknownMaterialSetter(String),

    #[error("invalid expression for \"{field}\": {source}")]
    Value { field: String, source: ValueError },

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Material(#[from] MaterialError),

    #[error("could not load variable \"{name}\": {source}")]
    Variable { name: String, source: ValueError },

    #[error("could not load material setter \"{name}\": {source}")]
    MaterialSetter { name: String, source: Box<LoadError> },

    #[error("could not load instruction \"{name}\": {source}")]
    Instruction { name: String, source: Box<LoadError> },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoadError {
    /// Innermost error, past any setter/instruction wrapping.
    pub fn root_cause(&self) -> &LoadError {
        match self {
            LoadError::MaterialSetter { source, .. } | LoadError::Instruction { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }

    pub(crate) fn value(field: impl Into<String>, source: ValueError) -> Self {
        LoadError::Value {
            field: field.into(),
            source,
        }
    }
}

/// Errors raised while randomizing or drawing
#[derive(Debug, Error)]
pub enum DrawError {
    #[error("instruction \"{0}\" is not loaded")]
    NotLoaded(String),

    #[error(transparent)]
    Value(#[from] ValueError),

    #[error(transparent)]
    Material(#[from] MaterialError),

    #[error("instruction \"{name}\" failed: {source}")]
    Instruction { name: String, source: Box<DrawError> },

    #[error("variable \"{name}\" failed: {source}")]
    Variable { name: String, source: ValueError },

    #[error("voxel coordinates out of range near {0}")]
    OutOfRange(IVec3),
}
