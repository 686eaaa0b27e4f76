//! Core types and utilities for the mongoose ecosystem simulation.

pub mod types;
pub mod config;
pub mod error;
pub mod events;
pub mod scoreboard;

pub use error::{Error, Result};
pub use types::*;
pub use config::*;
pub use events::SimEvent;
pub use scoreboard::Scoreboard;
