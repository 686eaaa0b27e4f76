//! Simulation clock: runs the passes in fixed order, once per tick.

use crate::interaction;
use crate::movement;
use crate::registry::Registry;
use crate::spawner::Spawner;
use crate::targeting;
use mongoose_core::{
    EntityFilter, EntityId, Error, Position, Result, Scoreboard, SimConfig, SimEvent, Species,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

pub struct Simulation {
    registry: Registry,
    spawner: Spawner,
    config: SimConfig,
    rng: ChaCha8Rng,
    tick: u64,
    attack_queued: bool,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let registry = Registry::new(config.species.clone());
        let spawner = Spawner::new(&config.species);

        Ok(Self {
            registry,
            spawner,
            config,
            rng,
            tick: 0,
            attack_queued: false,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Direct registry access for scenario setup
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn population(&self, species: Species) -> usize {
        self.registry.population(species)
    }

    pub fn populations(&self) -> BTreeMap<Species, usize> {
        Species::all()
            .into_iter()
            .map(|species| (species, self.registry.population(species)))
            .collect()
    }

    /// Create the player's mongoose. Called once at game start.
    pub fn spawn_player(&mut self, position: Position) -> Result<EntityId> {
        let world = &self.config.world;
        let position = position.clamp(world.width, world.height);
        let id = self.registry.create(Species::Mongoose, position)?;
        info!(entity_id = %id, %position, "Player spawned");
        Ok(id)
    }

    pub fn player_id(&self) -> Option<EntityId> {
        self.registry.player().map(|p| p.id)
    }

    /// Move the mongoose; positions outside the world are clamped to it
    pub fn set_player_position(&mut self, position: Position) -> Result<()> {
        if !position.is_finite() {
            return Err(Error::InvalidPosition {
                x: position.x,
                y: position.y,
            });
        }
        let world = &self.config.world;
        let position = position.clamp(world.width, world.height);
        let id = self.player_id().ok_or_else(|| {
            Error::Validation("no player: call spawn_player first".to_string())
        })?;
        let player = self.registry.get_mut(id).ok_or(Error::NotFound(id))?;
        player.position = position;
        Ok(())
    }

    /// Request an attack on the next tick
    pub fn queue_attack(&mut self) {
        self.attack_queued = true;
    }

    /// Advance one tick and return everything that happened in it.
    pub fn step(&mut self) -> Vec<SimEvent> {
        self.tick += 1;

        let mut events = self
            .spawner
            .run(1, &mut self.registry, &self.config.world, &mut self.rng);

        targeting::run(&mut self.registry);

        events.extend(movement::run(
            &mut self.registry,
            &self.config.world,
            &mut self.rng,
        ));

        let attacker = if std::mem::take(&mut self.attack_queued) {
            self.player_id()
        } else {
            None
        };
        events.extend(interaction::resolve(
            &mut self.registry,
            &self.config.combat,
            attacker,
        ));

        let interval = self.config.metrics_interval;
        if interval > 0 && self.tick % interval == 0 {
            self.emit_population_metrics();
        }

        events
    }

    /// Run the configured number of ticks without player input
    #[instrument(skip(self), fields(num_ticks = self.config.num_ticks, seed = self.config.seed))]
    pub fn run(&mut self) -> SimulationResult {
        info!("Starting simulation for {} ticks", self.config.num_ticks);

        let mut scoreboard = Scoreboard::new();
        let mut total_events = 0;
        for _ in 0..self.config.num_ticks {
            let events = self.step();
            total_events += events.len();
            scoreboard.record_all(&events);
        }

        let result = SimulationResult {
            total_ticks: self.tick,
            total_events,
            populations: self.populations(),
            scoreboard,
        };
        result.log_summary();
        result
    }

    fn emit_population_metrics(&self) {
        let populations = self.populations();
        let agents: Vec<_> = self
            .registry
            .iter(EntityFilter::All)
            .filter(|e| e.species().is_agent())
            .collect();
        let pursuing = agents.iter().filter(|e| e.target_id().is_some()).count();
        let aggro = agents.iter().filter(|e| e.is_aggro()).count();
        let max_snake_size = self
            .registry
            .iter(Species::Snake)
            .map(|e| e.size)
            .max()
            .unwrap_or(0);

        info!(
            event = "population_metrics",
            tick = self.tick,
            snakes = populations[&Species::Snake],
            rats = populations[&Species::Rat],
            berries = populations[&Species::Berry],
            pursuing,
            aggro,
            max_snake_size,
            "Population metrics snapshot"
        );
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub total_ticks: u64,
    pub total_events: usize,
    pub populations: BTreeMap<Species, usize>,
    pub scoreboard: Scoreboard,
}

impl SimulationResult {
    pub fn log_summary(&self) {
        let board = &self.scoreboard;
        info!(
            event = "episode_summary",
            total_ticks = self.total_ticks,
            total_events = self.total_events,
            snakes = self.populations.get(&Species::Snake).copied().unwrap_or(0),
            rats = self.populations.get(&Species::Rat).copied().unwrap_or(0),
            berries = self.populations.get(&Species::Berry).copied().unwrap_or(0),
            berries_eaten_by_mongoose = board.berries_eaten_by_mongoose,
            berries_eaten_by_snakes = board.berries_eaten_by_snakes,
            berries_eaten_by_rats = board.berries_eaten_by_rats,
            rats_eaten_by_snakes = board.rats_eaten_by_snakes,
            rats_escaped = board.rats_escaped,
            snakes_killed = board.snakes_killed,
            "Simulation complete"
        );
        debug!(score = board.player_score(), "Player score");
    }
}
