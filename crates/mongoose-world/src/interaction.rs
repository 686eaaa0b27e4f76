//! Contact resolution: attacks, meals and bites.

use crate::entity::AiState;
use crate::registry::Registry;
use crate::targeting;
use mongoose_core::{CombatConfig, EntityFilter, EntityId, SimEvent, Species, SpeciesConfig};
use tracing::debug;

/// Size gained by a predator eating prey of `prey_size`. Never less than one.
pub fn growth_increment(config: &SpeciesConfig, prey_size: u32) -> u32 {
    let from_size = (prey_size as f32 * config.growth_per_prey_size).floor() as u32;
    config.growth_per_meal.saturating_add(from_size).max(1)
}

/// Resolve all interactions for this tick, after movement.
///
/// `attacker` is the mongoose when the player asked for an attack this tick.
pub fn resolve(
    registry: &mut Registry,
    combat: &CombatConfig,
    attacker: Option<EntityId>,
) -> Vec<SimEvent> {
    let mut events = Vec::new();

    if let Some(attacker) = attacker {
        resolve_attack(registry, combat, attacker, &mut events);
    }
    resolve_meals(registry, &mut events);
    resolve_bites(registry, &mut events);

    events
}

/// The attacker strikes the nearest snake within reach
fn resolve_attack(
    registry: &mut Registry,
    combat: &CombatConfig,
    attacker: EntityId,
    events: &mut Vec<SimEvent>,
) {
    let Some(origin) = registry.get(attacker).map(|a| a.position) else {
        return;
    };
    let Some(victim) = registry
        .nearest(&origin, |e, distance| {
            e.id != attacker && e.health.is_some() && distance <= combat.attack_radius
        })
        .map(|e| e.id)
    else {
        debug!(attacker = %attacker, "Attack hit nothing");
        return;
    };

    let Some(entity) = registry.get_mut(victim) else {
        return;
    };
    let target_species = entity.species();
    let Some(remaining_health) = entity.take_damage(combat.attack_damage) else {
        return;
    };

    events.push(SimEvent::Damaged {
        target: victim,
        target_species,
        attacker,
        remaining_health,
    });

    if remaining_health == 0 {
        registry.destroy(victim);
        debug!(target = %victim, %target_species, killer = %attacker, "Killed");
        events.push(SimEvent::Killed {
            target: victim,
            target_species,
            killer: attacker,
            killer_species: Species::Mongoose,
        });
    } else {
        debug!(target = %victim, remaining_health, "Damaged, now aggro");
        targeting::provoke(registry, victim, attacker);
    }
}

/// Every predator eats at most one prey strictly inside its consumption radius
fn resolve_meals(registry: &mut Registry, events: &mut Vec<SimEvent>) {
    for predator_id in registry.snapshot(EntityFilter::All) {
        let Some(predator) = registry.get(predator_id) else {
            // Eaten earlier in this pass
            continue;
        };
        let predator_species = predator.species();
        if predator_species.diet().is_empty() {
            continue;
        }
        let radius = registry
            .species_config()
            .get(predator_species)
            .consumption_radius;
        let origin = predator.position;

        let Some(prey_id) = registry
            .nearest(&origin, |e, distance| {
                e.id != predator_id && predator_species.can_eat(e.species()) && distance < radius
            })
            .map(|e| e.id)
        else {
            continue;
        };

        let Some(prey) = registry.destroy(prey_id) else {
            continue;
        };
        let increment = growth_increment(registry.species_config().get(predator_species), prey.size);

        let Some(predator) = registry.get_mut(predator_id) else {
            continue;
        };
        predator.grow(increment);
        if let AiState::Pursuing { .. } = predator.state() {
            predator.clear_target();
        }
        let predator_size = predator.size;

        debug!(
            predator = %predator_id,
            %predator_species,
            prey = %prey_id,
            prey_species = %prey.species(),
            predator_size,
            "Consumed"
        );
        events.push(SimEvent::Consumed {
            predator: predator_id,
            predator_species,
            prey: prey_id,
            prey_species: prey.species(),
            predator_size,
        });
    }
}

/// Aggro snakes in contact with their aggressor bite it
fn resolve_bites(registry: &Registry, events: &mut Vec<SimEvent>) {
    for entity in registry.iter(EntityFilter::All) {
        let AiState::Aggro { aggressor } = entity.state() else {
            continue;
        };
        let Some(victim) = registry.get(aggressor) else {
            continue;
        };
        let reach = registry
            .species_config()
            .get(entity.species())
            .consumption_radius;
        if entity.position.distance(&victim.position) < reach {
            debug!(attacker = %entity.id, victim = %aggressor, "Bitten");
            events.push(SimEvent::Bitten {
                attacker: entity.id,
                victim: aggressor,
            });
        }
    }
}
