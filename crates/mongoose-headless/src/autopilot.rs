//! Scripted stand-in for the keyboard: chases food and fights snakes.

use mongoose_core::{EntityFilter, Position, Species};
use mongoose_world::Registry;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Input for a single tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerInput {
    pub position: Position,
    pub attack: bool,
}

#[derive(Debug, Clone)]
pub struct Autopilot {
    /// Distance covered per tick
    pub speed: f32,
    /// Attack whenever a snake is this close
    pub attack_radius: f32,
}

impl Autopilot {
    pub fn new(speed: f32, attack_radius: f32) -> Self {
        Self {
            speed,
            attack_radius,
        }
    }

    /// Head for the nearest edible entity, striking any snake within reach.
    /// With nothing to eat, drift randomly.
    pub fn next_input(&self, registry: &Registry, rng: &mut ChaCha8Rng) -> Option<PlayerInput> {
        let player = registry.player()?;
        let origin = player.position;

        let attack = registry
            .iter(Species::Snake)
            .any(|snake| snake.position.distance(&origin) <= self.attack_radius);

        let food = registry.nearest(&origin, |e, _| {
            Species::Mongoose.can_eat(e.species()) && e.id != player.id
        });
        let position = match food {
            Some(food) => origin.step_toward(&food.position, self.speed),
            None => origin.add(
                rng.gen_range(-self.speed..=self.speed),
                rng.gen_range(-self.speed..=self.speed),
            ),
        };

        Some(PlayerInput { position, attack })
    }
}

/// Number of live entities, for progress logging
pub fn live_count(registry: &Registry) -> usize {
    registry.iter(EntityFilter::All).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_autopilot_chases_food_and_attacks() {
        let mut registry = Registry::default();
        registry.create(Species::Mongoose, Position::new(5.0, 5.0)).unwrap();
        registry.create(Species::Berry, Position::new(8.0, 5.0)).unwrap();
        registry.create(Species::Snake, Position::new(5.0, 6.0)).unwrap();

        let pilot = Autopilot::new(1.0, 1.5);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let input = pilot.next_input(&registry, &mut rng).unwrap();

        assert_eq!(input.position, Position::new(6.0, 5.0));
        assert!(input.attack);
        assert_eq!(live_count(&registry), 3);
    }

    #[test]
    fn test_autopilot_without_player() {
        let registry = Registry::default();
        let pilot = Autopilot::new(1.0, 1.5);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(pilot.next_input(&registry, &mut rng).is_none());
    }
}
