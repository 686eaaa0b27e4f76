//! Score aggregation for UI consumers.

use crate::events::SimEvent;
use crate::types::Species;
use serde::{Deserialize, Serialize};

/// Running totals folded from simulation events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub berries_eaten_by_mongoose: u32,
    pub berries_eaten_by_snakes: u32,
    pub berries_eaten_by_rats: u32,
    pub rats_eaten_by_mongoose: u32,
    pub rats_eaten_by_snakes: u32,
    pub rats_escaped: u32,
    pub snakes_killed: u32,
    pub snakes_escaped: u32,
    pub bites_taken: u32,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a single event into the totals
    pub fn record(&mut self, event: &SimEvent) {
        match event {
            SimEvent::Consumed {
                predator_species,
                prey_species,
                ..
            } => match (predator_species, prey_species) {
                (Species::Mongoose, Species::Berry) => self.berries_eaten_by_mongoose += 1,
                (Species::Snake, Species::Berry) => self.berries_eaten_by_snakes += 1,
                (Species::Rat, Species::Berry) => self.berries_eaten_by_rats += 1,
                (Species::Mongoose, Species::Rat) => self.rats_eaten_by_mongoose += 1,
                (Species::Snake, Species::Rat) => self.rats_eaten_by_snakes += 1,
                _ => {}
            },
            SimEvent::Killed {
                target_species: Species::Snake,
                ..
            } => self.snakes_killed += 1,
            SimEvent::Escaped { species, .. } => match species {
                Species::Rat => self.rats_escaped += 1,
                Species::Snake => self.snakes_escaped += 1,
                _ => {}
            },
            SimEvent::Bitten { .. } => self.bites_taken += 1,
            _ => {}
        }
    }

    pub fn record_all<'a>(&mut self, events: impl IntoIterator<Item = &'a SimEvent>) {
        for event in events {
            self.record(event);
        }
    }

    /// The headline score: everything the mongoose ate or killed
    pub fn player_score(&self) -> u32 {
        self.berries_eaten_by_mongoose + self.rats_eaten_by_mongoose + self.snakes_killed
    }
}
