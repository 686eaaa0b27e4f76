//! Discrete simulation events, emitted once per occurrence.

use crate::types::{EntityId, Position, Species};
use serde::{Deserialize, Serialize};

/// Something that happened during a tick.
///
/// The simulation never keeps counters of its own; observers fold these
/// events into whatever totals they display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimEvent {
    Spawned {
        id: EntityId,
        species: Species,
        position: Position,
    },
    Consumed {
        predator: EntityId,
        predator_species: Species,
        prey: EntityId,
        prey_species: Species,
        /// Predator size after the meal
        predator_size: u32,
    },
    Damaged {
        target: EntityId,
        target_species: Species,
        attacker: EntityId,
        remaining_health: u32,
    },
    Killed {
        target: EntityId,
        target_species: Species,
        killer: EntityId,
        killer_species: Species,
    },
    Escaped {
        id: EntityId,
        species: Species,
    },
    Bitten {
        attacker: EntityId,
        victim: EntityId,
    },
}

impl SimEvent {
    /// The entity this event removed from the world, if any
    pub fn removed_entity(&self) -> Option<EntityId> {
        match self {
            SimEvent::Consumed { prey, .. } => Some(*prey),
            SimEvent::Killed { target, .. } => Some(*target),
            SimEvent::Escaped { id, .. } => Some(*id),
            _ => None,
        }
    }
}
