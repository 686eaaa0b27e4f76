//! Configuration types for the simulation.

use crate::error::{Error, Result};
use crate::types::Species;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Ticks per simulated second. Interval defaults below are derived from it.
pub const TICKS_PER_SECOND: u64 = 64;

/// World configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Width of the world
    pub width: f32,
    /// Height of the world
    pub height: f32,
    /// Nothing spawns closer than this to the mongoose
    pub player_clearance: f32,
    /// Rejected samples before a spawn attempt is abandoned
    pub max_spawn_samples: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 20.0,
            height: 20.0,
            player_clearance: 3.0,
            max_spawn_samples: 100,
        }
    }
}

/// Periodic spawning for one species
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Ticks between spawn attempts
    pub interval_ticks: u64,
    /// Carrying capacity; `None` means unbounded
    pub capacity: Option<usize>,
    /// Spawn probability when the population is empty (0.0 to 1.0)
    pub base_probability: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            interval_ticks: TICKS_PER_SECOND,
            capacity: None,
            base_probability: 1.0,
        }
    }
}

/// What an agent does while it has nothing to pursue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdleBehavior {
    #[default]
    Stay,
    /// Random step of `speed` in a uniformly chosen direction
    Wander,
}

/// Per-species behaviour parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeciesConfig {
    /// Periodic spawning; `None` for species that are never spawned by the clock
    pub spawn: Option<SpawnConfig>,
    /// How far an agent can see prey
    pub perception_radius: f32,
    /// Distance moved per tick
    pub speed: f32,
    /// Prey strictly closer than this is eaten
    pub consumption_radius: f32,
    /// Size at creation
    pub initial_size: u32,
    /// Flat size gained per meal
    pub growth_per_meal: u32,
    /// Extra size gained per unit of prey size
    pub growth_per_prey_size: f32,
    /// Health for damageable species
    pub max_health: Option<u32>,
    pub idle: IdleBehavior,
}

impl Default for SpeciesConfig {
    fn default() -> Self {
        Self {
            spawn: None,
            perception_radius: 5.0,
            speed: 0.05,
            consumption_radius: 0.5,
            initial_size: 1,
            growth_per_meal: 1,
            growth_per_prey_size: 0.0,
            max_health: None,
            idle: IdleBehavior::Stay,
        }
    }
}

impl SpeciesConfig {
    pub fn mongoose() -> Self {
        Self {
            perception_radius: 0.0,
            speed: 0.0,
            initial_size: 3,
            ..Default::default()
        }
    }

    pub fn snake() -> Self {
        Self {
            spawn: Some(SpawnConfig {
                interval_ticks: 5 * TICKS_PER_SECOND,
                capacity: Some(4),
                base_probability: 1.0,
            }),
            perception_radius: 8.0,
            // One tile every half second
            speed: 2.0 / TICKS_PER_SECOND as f32,
            initial_size: 2,
            max_health: Some(3),
            ..Default::default()
        }
    }

    pub fn rat() -> Self {
        Self {
            spawn: Some(SpawnConfig {
                interval_ticks: 4 * TICKS_PER_SECOND,
                capacity: Some(6),
                base_probability: 0.8,
            }),
            perception_radius: 5.0,
            speed: 3.0 / TICKS_PER_SECOND as f32,
            idle: IdleBehavior::Wander,
            ..Default::default()
        }
    }

    pub fn berry() -> Self {
        Self {
            spawn: Some(SpawnConfig {
                interval_ticks: 3 * TICKS_PER_SECOND,
                capacity: Some(12),
                base_probability: 1.0,
            }),
            perception_radius: 0.0,
            speed: 0.0,
            consumption_radius: 0.0,
            ..Default::default()
        }
    }

    fn validate(&self, species: Species) -> Result<()> {
        let invalid = |msg: &str| -> Result<()> {
            Err(Error::Validation(format!("{species}: {msg}")))
        };

        if !(self.perception_radius >= 0.0) {
            return invalid("perception_radius must be non-negative");
        }
        if !(self.speed >= 0.0) {
            return invalid("speed must be non-negative");
        }
        if !(self.consumption_radius >= 0.0) {
            return invalid("consumption_radius must be non-negative");
        }
        // Contact is strictly inside the radius, so zero would never eat
        if !species.diet().is_empty() && !(self.consumption_radius > 0.0) {
            return invalid("consumption_radius must be positive for species that eat");
        }
        if !(self.growth_per_prey_size >= 0.0) {
            return invalid("growth_per_prey_size must be non-negative");
        }
        if self.max_health == Some(0) {
            return invalid("max_health must be positive when set");
        }
        if let Some(spawn) = &self.spawn {
            if species == Species::Mongoose {
                return invalid("the mongoose is created by the player, not spawned");
            }
            if spawn.interval_ticks == 0 {
                return invalid("spawn interval must be at least one tick");
            }
            if !(0.0..=1.0).contains(&spawn.base_probability) {
                return invalid("base_probability must be within [0, 1]");
            }
        }
        Ok(())
    }
}

/// Behaviour table indexed by species
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeciesTable {
    pub mongoose: SpeciesConfig,
    pub snake: SpeciesConfig,
    pub rat: SpeciesConfig,
    pub berry: SpeciesConfig,
}

impl Default for SpeciesTable {
    fn default() -> Self {
        Self {
            mongoose: SpeciesConfig::mongoose(),
            snake: SpeciesConfig::snake(),
            rat: SpeciesConfig::rat(),
            berry: SpeciesConfig::berry(),
        }
    }
}

impl SpeciesTable {
    pub fn get(&self, species: Species) -> &SpeciesConfig {
        match species {
            Species::Mongoose => &self.mongoose,
            Species::Snake => &self.snake,
            Species::Rat => &self.rat,
            Species::Berry => &self.berry,
        }
    }

    pub fn get_mut(&mut self, species: Species) -> &mut SpeciesConfig {
        match species {
            Species::Mongoose => &mut self.mongoose,
            Species::Snake => &mut self.snake,
            Species::Rat => &mut self.rat,
            Species::Berry => &mut self.berry,
        }
    }
}

/// Mongoose attacks on snakes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Reach of a mongoose attack
    pub attack_radius: f32,
    /// Health removed per attack
    pub attack_damage: u32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            attack_radius: 1.5,
            attack_damage: 1,
        }
    }
}

/// Full simulation configuration, loaded once before the first tick
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Number of ticks for a batch run
    pub num_ticks: u64,
    /// Ticks between population metric snapshots; 0 disables them
    pub metrics_interval: u64,
    pub world: WorldConfig,
    pub species: SpeciesTable,
    pub combat: CombatConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            num_ticks: 60 * TICKS_PER_SECOND,
            metrics_interval: 10 * TICKS_PER_SECOND,
            world: WorldConfig::default(),
            species: SpeciesTable::default(),
            combat: CombatConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading simulation config");
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.world.width > 0.0) || !(self.world.height > 0.0) {
            return Err(Error::Validation(
                "world bounds must be positive".to_string(),
            ));
        }
        if !(self.world.player_clearance >= 0.0) {
            return Err(Error::Validation(
                "player_clearance must be non-negative".to_string(),
            ));
        }
        if !(self.combat.attack_radius >= 0.0) {
            return Err(Error::Validation(
                "attack_radius must be non-negative".to_string(),
            ));
        }
        for species in Species::all() {
            self.species.get(species).validate(species)?;
        }
        Ok(())
    }
}
