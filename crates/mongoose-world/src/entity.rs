//! Entity state and AI state.

use mongoose_core::{EntityId, Position, Species, SpeciesConfig};
use serde::{Deserialize, Serialize};

/// What an agent is currently doing.
///
/// Targets are registry keys, never owning handles. A target may die at any
/// time; the targeting pass notices and falls back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AiState {
    #[default]
    Idle,
    Pursuing { target: EntityId },
    /// Entered on damage; the aggressor is chased regardless of diet
    Aggro { aggressor: EntityId },
}

impl AiState {
    pub fn target(&self) -> Option<EntityId> {
        match self {
            AiState::Idle => None,
            AiState::Pursuing { target } => Some(*target),
            AiState::Aggro { aggressor } => Some(*aggressor),
        }
    }
}

/// A living actor in the world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    species: Species,
    pub position: Position,
    pub size: u32,
    pub health: Option<u32>,
    state: AiState,
    pub alive: bool,
}

impl Entity {
    pub fn new(id: EntityId, species: Species, position: Position, config: &SpeciesConfig) -> Self {
        Self {
            id,
            species,
            position,
            size: config.initial_size,
            health: config.max_health,
            state: AiState::Idle,
            alive: true,
        }
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn state(&self) -> AiState {
        self.state
    }

    pub fn target_id(&self) -> Option<EntityId> {
        self.state.target()
    }

    pub fn is_aggro(&self) -> bool {
        matches!(self.state, AiState::Aggro { .. })
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn grow(&mut self, amount: u32) {
        self.size = self.size.saturating_add(amount);
    }

    /// Apply damage and return the remaining health.
    ///
    /// Entities without health cannot be damaged and report `None`.
    pub fn take_damage(&mut self, amount: u32) -> Option<u32> {
        let health = self.health.as_mut()?;
        *health = health.saturating_sub(amount);
        Some(*health)
    }

    pub fn clear_target(&mut self) {
        self.state = AiState::Idle;
    }

    /// Berries never act, so they never hold a target.
    pub fn set_state(&mut self, state: AiState) {
        if self.species == Species::Berry {
            return;
        }
        self.state = state;
    }
}
