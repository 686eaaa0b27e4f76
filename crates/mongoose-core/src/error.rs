//! Error types for the simulation.

use crate::types::{EntityId, Species};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unknown species: {0}")]
    UnknownSpecies(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Entity not found: {0}")]
    NotFound(EntityId),

    #[error("Already exists: {0}")]
    AlreadyExists(Species),

    #[error("Invalid position: ({x}, {y})")]
    InvalidPosition { x: f32, y: f32 },
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
