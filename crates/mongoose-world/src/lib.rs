//! Ecosystem simulation engine.
//!
//! A mongoose, snakes, rats and berries share a bounded 2D world. Each tick
//! runs the spawner, targeting, movement and interaction passes in that order.

pub mod entity;
pub mod registry;
pub mod spawner;
pub mod targeting;
pub mod movement;
pub mod interaction;
pub mod simulation;

pub use entity::{AiState, Entity};
pub use registry::Registry;
pub use spawner::{spawn_probability, Spawner};
pub use simulation::{Simulation, SimulationResult};
