//! Direct steering toward targets, idle wandering and escapes.

use crate::entity::AiState;
use crate::registry::Registry;
use mongoose_core::{EntityFilter, EntityId, IdleBehavior, Position, SimEvent, WorldConfig};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::f32::consts::TAU;
use tracing::debug;

/// Plan every agent's next position, then apply the moves in id order.
///
/// Agents that end up outside the world have escaped and are removed.
pub fn run(registry: &mut Registry, world: &WorldConfig, rng: &mut ChaCha8Rng) -> Vec<SimEvent> {
    let moves = plan(registry, rng);
    let mut events = Vec::new();

    for (id, position) in moves {
        if !position.within_bounds(world.width, world.height) {
            if let Some(entity) = registry.destroy(id) {
                debug!(entity_id = %id, species = %entity.species(), %position, "Escaped");
                events.push(SimEvent::Escaped {
                    id,
                    species: entity.species(),
                });
            }
            continue;
        }
        if let Some(entity) = registry.get_mut(id) {
            entity.position = position;
        }
    }

    events
}

fn plan(registry: &Registry, rng: &mut ChaCha8Rng) -> Vec<(EntityId, Position)> {
    let table = registry.species_config();
    let mut moves = Vec::new();

    for agent in registry.iter(EntityFilter::All).filter(|e| e.species().is_agent()) {
        let config = table.get(agent.species());
        let next = match agent.state() {
            AiState::Pursuing { target: goal } | AiState::Aggro { aggressor: goal } => {
                match registry.get(goal) {
                    Some(goal) => agent.position.step_toward(&goal.position, config.speed),
                    // Stale, the next targeting pass will clear it
                    None => continue,
                }
            }
            AiState::Idle => match config.idle {
                IdleBehavior::Stay => continue,
                IdleBehavior::Wander => {
                    let angle = rng.gen_range(0.0..TAU);
                    agent
                        .position
                        .add(angle.cos() * config.speed, angle.sin() * config.speed)
                }
            },
        };
        if next != agent.position {
            moves.push((agent.id, next));
        }
    }

    moves
}
