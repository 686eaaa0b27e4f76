//! Periodic, population-aware spawning of berries, rats and snakes.

use crate::registry::Registry;
use mongoose_core::{Position, SimEvent, SpawnConfig, Species, SpeciesTable, WorldConfig};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

/// Spawn probability for the current population.
///
/// Falls linearly from `base_probability` at an empty population to zero at
/// `capacity`. Without a capacity the base probability applies unchanged.
pub fn spawn_probability(population: usize, capacity: Option<usize>, base_probability: f32) -> f32 {
    let base = base_probability.clamp(0.0, 1.0);
    match capacity {
        None => base,
        Some(capacity) if population >= capacity => 0.0,
        Some(capacity) => base * (1.0 - population as f32 / capacity as f32),
    }
}

/// Repeating tick counter
#[derive(Debug, Clone)]
pub struct SpawnTimer {
    interval: u64,
    elapsed: u64,
}

impl SpawnTimer {
    pub fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
            elapsed: 0,
        }
    }

    /// Advance by `ticks` and return how many intervals finished
    pub fn tick(&mut self, ticks: u64) -> u64 {
        self.elapsed += ticks;
        let finished = self.elapsed / self.interval;
        self.elapsed %= self.interval;
        finished
    }
}

#[derive(Debug, Clone)]
struct SpeciesSpawner {
    species: Species,
    config: SpawnConfig,
    timer: SpawnTimer,
}

/// Drives one timer per spawnable species
#[derive(Debug, Clone)]
pub struct Spawner {
    spawners: Vec<SpeciesSpawner>,
}

impl Spawner {
    pub fn new(table: &SpeciesTable) -> Self {
        // Fixed order keeps the RNG stream reproducible
        let spawners = [Species::Berry, Species::Rat, Species::Snake]
            .into_iter()
            .filter_map(|species| {
                table.get(species).spawn.clone().map(|config| SpeciesSpawner {
                    species,
                    timer: SpawnTimer::new(config.interval_ticks),
                    config,
                })
            })
            .collect();

        Self { spawners }
    }

    /// Advance all timers by `elapsed_ticks` and attempt the spawns that fall due.
    ///
    /// Attempts at capacity, failed probability rolls and attempts without a
    /// clear spawn position are skipped silently.
    pub fn run(
        &mut self,
        elapsed_ticks: u64,
        registry: &mut Registry,
        world: &WorldConfig,
        rng: &mut ChaCha8Rng,
    ) -> Vec<SimEvent> {
        let mut events = Vec::new();

        for spawner in &mut self.spawners {
            let attempts = spawner.timer.tick(elapsed_ticks);
            for _ in 0..attempts {
                let species = spawner.species;
                let population = registry.population(species);
                let probability = spawn_probability(
                    population,
                    spawner.config.capacity,
                    spawner.config.base_probability,
                );

                if probability <= 0.0 {
                    trace!(%species, population, "Spawn skipped: at capacity");
                    continue;
                }
                if rng.gen::<f32>() >= probability {
                    trace!(%species, population, probability, "Spawn skipped: roll failed");
                    continue;
                }

                let Some(position) = pick_spawn_position(registry, world, rng) else {
                    debug!(%species, "Spawn skipped: no clear position found");
                    continue;
                };

                match registry.create(species, position) {
                    Ok(id) => {
                        debug!(entity_id = %id, %species, %position, population = population + 1, "Spawned");
                        events.push(SimEvent::Spawned {
                            id,
                            species,
                            position,
                        });
                    }
                    Err(e) => debug!(%species, error = %e, "Spawn rejected by registry"),
                }
            }
        }

        events
    }
}

/// Uniform position inside the world, away from the player
pub fn pick_spawn_position(
    registry: &Registry,
    world: &WorldConfig,
    rng: &mut ChaCha8Rng,
) -> Option<Position> {
    let player = registry.player().map(|p| p.position);

    for _ in 0..world.max_spawn_samples {
        let position = Position::new(
            rng.gen_range(0.0..world.width),
            rng.gen_range(0.0..world.height),
        );
        let clear = player.map_or(true, |p| p.distance(&position) >= world.player_clearance);
        if clear {
            return Some(position);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongoose_core::SpeciesConfig;
    use rand::SeedableRng;

    fn berry_only(capacity: Option<usize>, interval: u64) -> SpeciesTable {
        let mut table = SpeciesTable::default();
        table.snake.spawn = None;
        table.rat.spawn = None;
        table.berry = SpeciesConfig {
            spawn: Some(SpawnConfig {
                interval_ticks: interval,
                capacity,
                base_probability: 1.0,
            }),
            ..SpeciesConfig::berry()
        };
        table
    }

    #[test]
    fn test_spawn_probability_bounds() {
        assert_eq!(spawn_probability(0, Some(10), 0.8), 0.8);
        assert_eq!(spawn_probability(10, Some(10), 0.8), 0.0);
        assert_eq!(spawn_probability(15, Some(10), 0.8), 0.0);
        assert_eq!(spawn_probability(5, Some(10), 1.0), 0.5);
        assert_eq!(spawn_probability(1_000, None, 0.3), 0.3);
        assert_eq!(spawn_probability(0, Some(0), 1.0), 0.0);
    }

    #[test]
    fn test_spawn_probability_is_monotonic() {
        let mut previous = f32::INFINITY;
        for population in 0..=20 {
            let p = spawn_probability(population, Some(20), 0.9);
            assert!(p <= previous);
            assert!((0.0..=1.0).contains(&p));
            previous = p;
        }
    }

    #[test]
    fn test_timer() {
        let mut timer = SpawnTimer::new(3);
        assert_eq!(timer.tick(1), 0);
        assert_eq!(timer.tick(1), 0);
        assert_eq!(timer.tick(1), 1);
        assert_eq!(timer.tick(7), 2);
        assert_eq!(timer.tick(2), 1);
    }

    #[test]
    fn test_capacity_stops_spawning() {
        let table = berry_only(Some(1), 1);
        let mut registry = Registry::new(table.clone());
        let mut spawner = Spawner::new(&table);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let world = WorldConfig::default();

        let events = spawner.run(1, &mut registry, &world, &mut rng);
        assert_eq!(events.len(), 1);
        assert_eq!(registry.population(Species::Berry), 1);

        let events = spawner.run(1, &mut registry, &world, &mut rng);
        assert!(events.is_empty());
        assert_eq!(registry.population(Species::Berry), 1);
    }

    #[test]
    fn test_spawn_respects_player_clearance() {
        let table = berry_only(None, 1);
        let mut registry = Registry::new(table.clone());
        let player = Position::new(10.0, 10.0);
        registry.create(Species::Mongoose, player).unwrap();

        let mut spawner = Spawner::new(&table);
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let world = WorldConfig::default();

        spawner.run(50, &mut registry, &world, &mut rng);
        assert_eq!(registry.population(Species::Berry), 50);
        for berry in registry.iter(Species::Berry) {
            assert!(berry.position.distance(&player) >= world.player_clearance);
            assert!(berry.position.within_bounds(world.width, world.height));
        }
    }

    #[test]
    fn test_no_clear_position_skips_spawn() {
        let table = berry_only(None, 1);
        let mut registry = Registry::new(table.clone());
        registry.create(Species::Mongoose, Position::new(1.0, 1.0)).unwrap();

        let world = WorldConfig {
            width: 2.0,
            height: 2.0,
            player_clearance: 10.0,
            max_spawn_samples: 5,
        };
        let mut spawner = Spawner::new(&table);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let events = spawner.run(3, &mut registry, &world, &mut rng);
        assert!(events.is_empty());
        assert_eq!(registry.population(Species::Berry), 0);
    }
}
