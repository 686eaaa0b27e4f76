//! Target selection for snakes and rats.
//!
//! Each pass plans against a read-only view of the registry and then commits
//! the resulting state changes in ascending id order. Planning never mutates,
//! so the outcome does not depend on the order agents are looked at.

use crate::entity::{AiState, Entity};
use crate::registry::Registry;
use mongoose_core::{EntityFilter, EntityId, Species};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use tracing::trace;

/// A state change decided during planning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub entity: EntityId,
    pub from: AiState,
    pub to: AiState,
}

/// Run one targeting pass and return the transitions that were applied.
pub fn run(registry: &mut Registry) -> Vec<Transition> {
    let transitions = plan(registry);
    for transition in &transitions {
        if let Some(entity) = registry.get_mut(transition.entity) {
            entity.set_state(transition.to);
        }
    }
    transitions
}

/// Decide state changes without touching the registry.
///
/// Existing targets are validated first. Pursued prey is claimed by its
/// pursuer, so no two agents chase the same prey. Idle agents are then
/// matched to unclaimed prey greedily, closest pair first, ties broken by
/// agent id then prey id.
///
/// This is a matching, not a per-agent nearest search: an agent whose nearest
/// prey is already claimed takes its next nearest unclaimed prey, and stays
/// idle when there is none in range.
pub fn plan(registry: &Registry) -> Vec<Transition> {
    let table = registry.species_config();
    let mut transitions = Vec::new();
    let mut claimed: BTreeSet<EntityId> = BTreeSet::new();
    let mut idle: Vec<&Entity> = Vec::new();

    for agent in registry.iter(EntityFilter::All).filter(|e| e.species().is_agent()) {
        let perception = table.get(agent.species()).perception_radius;
        let keep = match agent.state() {
            AiState::Idle => false,
            AiState::Pursuing { target } => registry.get(target).is_some_and(|prey| {
                agent.species().can_eat(prey.species())
                    && agent.position.distance(&prey.position) <= perception
            }),
            AiState::Aggro { aggressor } => registry
                .get(aggressor)
                .is_some_and(|a| agent.position.distance(&a.position) <= perception),
        };

        if keep {
            if let AiState::Pursuing { target } = agent.state() {
                claimed.insert(target);
            }
            continue;
        }

        if agent.state() != AiState::Idle {
            trace!(
                entity_id = %agent.id,
                species = %agent.species(),
                lost_target = ?agent.target_id(),
                "Target lost, back to idle"
            );
        }
        idle.push(agent);
    }

    let mut candidates: Vec<(f32, EntityId, EntityId)> = Vec::new();
    for agent in &idle {
        let perception = table.get(agent.species()).perception_radius;
        for prey in registry.iter(EntityFilter::All) {
            if prey.id == agent.id
                || !is_prey(agent.species(), prey.species())
                || claimed.contains(&prey.id)
            {
                continue;
            }
            let distance_squared = agent.position.distance_squared(&prey.position);
            if distance_squared.sqrt() <= perception {
                candidates.push((distance_squared, agent.id, prey.id));
            }
        }
    }
    candidates.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(Ordering::Equal)
            .then(a.1.cmp(&b.1))
            .then(a.2.cmp(&b.2))
    });

    let mut assigned: BTreeSet<EntityId> = BTreeSet::new();
    let mut acquired: Vec<(EntityId, EntityId)> = Vec::new();
    for (_, agent, prey) in candidates {
        if assigned.contains(&agent) || claimed.contains(&prey) {
            continue;
        }
        assigned.insert(agent);
        claimed.insert(prey);
        acquired.push((agent, prey));
    }

    for agent in idle {
        let to = acquired
            .iter()
            .find(|(a, _)| *a == agent.id)
            .map_or(AiState::Idle, |(_, prey)| AiState::Pursuing { target: *prey });
        if to != agent.state() {
            trace!(entity_id = %agent.id, species = %agent.species(), ?to, "Targeting transition");
            transitions.push(Transition {
                entity: agent.id,
                from: agent.state(),
                to,
            });
        }
    }

    transitions.sort_by_key(|t| t.entity);
    transitions
}

/// Put a damaged entity into aggro against its attacker.
///
/// Only species with health can be provoked. Returns whether the state changed.
pub fn provoke(registry: &mut Registry, target: EntityId, aggressor: EntityId) -> bool {
    if !registry.contains(aggressor) {
        return false;
    }
    let Some(entity) = registry.get_mut(target) else {
        return false;
    };
    if entity.health.is_none() || !entity.species().is_agent() {
        return false;
    }
    let state = AiState::Aggro { aggressor };
    if entity.state() == state {
        return false;
    }
    trace!(entity_id = %target, aggressor = %aggressor, "Aggro");
    entity.set_state(state);
    true
}

/// Whether `predator` would consider `prey` food at all
pub fn is_prey(predator: Species, prey: Species) -> bool {
    predator.is_agent() && predator.can_eat(prey)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongoose_core::{Position, SpeciesTable};

    fn registry() -> Registry {
        let mut table = SpeciesTable::default();
        table.snake.perception_radius = 5.0;
        table.rat.perception_radius = 5.0;
        Registry::new(table)
    }

    #[test]
    fn test_idle_acquires_nearest_prey() {
        let mut registry = registry();
        let snake = registry.create(Species::Snake, Position::new(0.0, 0.0)).unwrap();
        let _far = registry.create(Species::Rat, Position::new(4.0, 0.0)).unwrap();
        let near = registry.create(Species::Berry, Position::new(2.0, 0.0)).unwrap();

        run(&mut registry);
        // The rat is as close to the berry as the snake; the lower agent id wins
        assert_eq!(registry.get(snake).unwrap().target_id(), Some(near));
    }

    #[test]
    fn test_prey_outside_perception_is_ignored() {
        let mut registry = registry();
        let snake = registry.create(Species::Snake, Position::new(0.0, 0.0)).unwrap();
        registry.create(Species::Rat, Position::new(6.0, 0.0)).unwrap();

        let transitions = run(&mut registry);
        assert!(transitions.is_empty());
        assert_eq!(registry.get(snake).unwrap().state(), AiState::Idle);
    }

    #[test]
    fn test_equidistant_prey_goes_to_lowest_id() {
        let mut registry = registry();
        let snake = registry.create(Species::Snake, Position::new(5.0, 5.0)).unwrap();
        let low = registry.create(Species::Rat, Position::new(3.0, 5.0)).unwrap();
        let _high = registry.create(Species::Rat, Position::new(7.0, 5.0)).unwrap();

        run(&mut registry);
        assert_eq!(registry.get(snake).unwrap().target_id(), Some(low));
    }

    #[test]
    fn test_claims_are_exclusive() {
        let mut registry = registry();
        let rat_a = registry.create(Species::Rat, Position::new(0.0, 0.0)).unwrap();
        let rat_b = registry.create(Species::Rat, Position::new(4.0, 0.0)).unwrap();
        let berry = registry.create(Species::Berry, Position::new(3.0, 0.0)).unwrap();

        run(&mut registry);
        // rat_b is closer, so it wins even with the higher id
        assert_eq!(registry.get(rat_b).unwrap().target_id(), Some(berry));
        assert_eq!(registry.get(rat_a).unwrap().target_id(), None);
    }

    #[test]
    fn test_claimed_prey_leaves_other_agent_idle() {
        let mut registry = registry();
        let snake_a = registry.create(Species::Snake, Position::new(5.0, 5.0)).unwrap();
        let snake_b = registry.create(Species::Snake, Position::new(9.0, 5.0)).unwrap();
        let rat = registry.create(Species::Rat, Position::new(7.0, 5.0)).unwrap();

        run(&mut registry);
        assert_eq!(
            registry.get(snake_a).unwrap().state(),
            AiState::Pursuing { target: rat }
        );
        assert_eq!(registry.get(snake_b).unwrap().state(), AiState::Idle);
    }

    #[test]
    fn test_stale_target_is_cleared() {
        let mut registry = registry();
        let snake = registry.create(Species::Snake, Position::new(0.0, 0.0)).unwrap();
        let rat = registry.create(Species::Rat, Position::new(1.0, 0.0)).unwrap();

        run(&mut registry);
        assert_eq!(registry.get(snake).unwrap().target_id(), Some(rat));

        registry.destroy(rat);
        let transitions = run(&mut registry);
        assert_eq!(
            transitions,
            vec![Transition {
                entity: snake,
                from: AiState::Pursuing { target: rat },
                to: AiState::Idle,
            }]
        );
    }

    #[test]
    fn test_lost_target_reacquires_same_pass() {
        let mut registry = registry();
        let snake = registry.create(Species::Snake, Position::new(0.0, 0.0)).unwrap();
        let rat = registry.create(Species::Rat, Position::new(1.0, 0.0)).unwrap();
        let berry = registry.create(Species::Berry, Position::new(0.0, 3.0)).unwrap();

        run(&mut registry);
        assert_eq!(registry.get(snake).unwrap().target_id(), Some(rat));

        registry.destroy(rat);
        run(&mut registry);
        assert_eq!(registry.get(snake).unwrap().target_id(), Some(berry));
    }

    #[test]
    fn test_target_leaving_perception_drops_pursuit() {
        let mut registry = registry();
        let snake = registry.create(Species::Snake, Position::new(0.0, 0.0)).unwrap();
        let rat = registry.create(Species::Rat, Position::new(3.0, 0.0)).unwrap();

        run(&mut registry);
        registry.get_mut(rat).unwrap().position = Position::new(9.0, 0.0);
        run(&mut registry);
        assert_eq!(registry.get(snake).unwrap().state(), AiState::Idle);
    }

    #[test]
    fn test_provoke_and_revert() {
        let mut registry = registry();
        let mongoose = registry.create(Species::Mongoose, Position::new(0.0, 0.0)).unwrap();
        let snake = registry.create(Species::Snake, Position::new(1.0, 0.0)).unwrap();
        let rat = registry.create(Species::Rat, Position::new(1.5, 0.0)).unwrap();

        assert!(provoke(&mut registry, snake, mongoose));
        assert!(!provoke(&mut registry, rat, mongoose));
        assert!(!provoke(&mut registry, snake, mongoose));

        // Aggro overrides diet: the rat is right there, but the snake keeps
        // chasing the mongoose
        run(&mut registry);
        assert_eq!(
            registry.get(snake).unwrap().state(),
            AiState::Aggro { aggressor: mongoose }
        );

        registry.get_mut(mongoose).unwrap().position = Position::new(15.0, 15.0);
        run(&mut registry);
        assert_eq!(
            registry.get(snake).unwrap().state(),
            AiState::Pursuing { target: rat }
        );
    }

    #[test]
    fn test_berries_and_mongoose_never_target() {
        let mut registry = registry();
        let mongoose = registry.create(Species::Mongoose, Position::new(0.0, 0.0)).unwrap();
        let berry = registry.create(Species::Berry, Position::new(0.5, 0.0)).unwrap();

        run(&mut registry);
        assert_eq!(registry.get(mongoose).unwrap().target_id(), None);
        assert_eq!(registry.get(berry).unwrap().target_id(), None);
        assert!(!is_prey(Species::Mongoose, Species::Berry));
        assert!(is_prey(Species::Rat, Species::Berry));
    }
}
