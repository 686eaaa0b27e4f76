//! Entity registry: the arena that owns every live entity.

use crate::entity::Entity;
use mongoose_core::{EntityFilter, EntityId, Error, Position, Result, Species, SpeciesTable};
use std::collections::BTreeMap;
use tracing::trace;

/// Owns all live entities, keyed by id.
///
/// Ids increase monotonically and are never handed out twice. Iteration is
/// always in ascending id order, which every pass relies on for determinism.
#[derive(Debug, Clone)]
pub struct Registry {
    entities: BTreeMap<EntityId, Entity>,
    next_id: u64,
    species: SpeciesTable,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(SpeciesTable::default())
    }
}

impl Registry {
    pub fn new(species: SpeciesTable) -> Self {
        Self {
            entities: BTreeMap::new(),
            next_id: 0,
            species,
        }
    }

    pub fn species_config(&self) -> &SpeciesTable {
        &self.species
    }

    /// Create a new entity and return its id.
    ///
    /// Only one mongoose may exist at a time.
    pub fn create(&mut self, species: Species, position: Position) -> Result<EntityId> {
        if !position.is_finite() {
            return Err(Error::InvalidPosition {
                x: position.x,
                y: position.y,
            });
        }
        if species == Species::Mongoose && self.population(Species::Mongoose) > 0 {
            return Err(Error::AlreadyExists(Species::Mongoose));
        }

        let id = EntityId(self.next_id);
        self.next_id += 1;
        let entity = Entity::new(id, species, position, self.species.get(species));
        self.entities.insert(id, entity);
        trace!(entity_id = %id, %species, %position, "Entity created");
        Ok(id)
    }

    /// Create an entity from a species name, as read from scripts or config
    pub fn create_named(&mut self, species: &str, position: Position) -> Result<EntityId> {
        let species: Species = species.parse()?;
        self.create(species, position)
    }

    /// Remove an entity from the world.
    ///
    /// Returns the final record, marked dead, on the first call and `None`
    /// afterwards. Back-references held by other entities are left alone.
    pub fn destroy(&mut self, id: EntityId) -> Option<Entity> {
        let mut entity = self.entities.remove(&id)?;
        entity.alive = false;
        trace!(entity_id = %id, species = %entity.species(), "Entity destroyed");
        Some(entity)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Live entities matching `filter`, in ascending id order
    pub fn iter(&self, filter: impl Into<EntityFilter>) -> impl Iterator<Item = &Entity> + '_ {
        self.iter_filtered(filter.into())
    }

    fn iter_filtered(&self, filter: EntityFilter) -> impl Iterator<Item = &Entity> + '_ {
        self.entities
            .values()
            .filter(move |entity| filter.matches(entity.species()))
    }

    /// Ids alive right now. Passes walk this list and re-check each id with
    /// [`Registry::get`], so entities destroyed mid-pass are skipped.
    pub fn snapshot(&self, filter: impl Into<EntityFilter>) -> Vec<EntityId> {
        self.iter(filter).map(|entity| entity.id).collect()
    }

    /// Count live entities of a species. Always derived, never cached.
    pub fn population(&self, species: Species) -> usize {
        self.iter(species).count()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The player's mongoose, if it has been created
    pub fn player(&self) -> Option<&Entity> {
        self.iter(Species::Mongoose).next()
    }

    /// Closest entity accepted by `accept`, which also receives the distance.
    /// Ties go to the lowest id.
    pub fn nearest(
        &self,
        origin: &Position,
        mut accept: impl FnMut(&Entity, f32) -> bool,
    ) -> Option<&Entity> {
        let mut best: Option<(&Entity, f32)> = None;
        for entity in self.entities.values() {
            let distance_squared = origin.distance_squared(&entity.position);
            if !accept(entity, distance_squared.sqrt()) {
                continue;
            }
            // Strictly closer only: ascending iteration keeps the lowest id on ties
            if best.map_or(true, |(_, d)| distance_squared < d) {
                best = Some((entity, distance_squared));
            }
        }
        best.map(|(entity, _)| entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_get() {
        let mut registry = Registry::default();
        let a = registry.create(Species::Rat, Position::new(1.0, 2.0)).unwrap();
        let b = registry.create(Species::Berry, Position::new(3.0, 4.0)).unwrap();

        assert_ne!(a, b);
        assert!(a < b);
        assert_eq!(registry.get(a).unwrap().species(), Species::Rat);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.population(Species::Rat), 1);
        assert_eq!(registry.population(Species::Snake), 0);
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut registry = Registry::default();
        let id = registry.create(Species::Berry, Position::new(0.0, 0.0)).unwrap();
        let keep = registry.create(Species::Berry, Position::new(1.0, 0.0)).unwrap();

        let removed = registry.destroy(id).unwrap();
        assert!(!removed.is_alive());
        assert!(registry.get(id).is_none());

        assert!(registry.destroy(id).is_none());
        assert_eq!(registry.population(Species::Berry), 1);
        assert!(registry.contains(keep));
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut registry = Registry::default();
        let first = registry.create(Species::Rat, Position::default()).unwrap();
        registry.destroy(first);
        let second = registry.create(Species::Rat, Position::default()).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_single_mongoose() {
        let mut registry = Registry::default();
        registry.create(Species::Mongoose, Position::new(5.0, 5.0)).unwrap();
        let err = registry
            .create(Species::Mongoose, Position::new(6.0, 6.0))
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(Species::Mongoose)));
        assert!(registry.player().is_some());
    }

    #[test]
    fn test_rejects_bad_input() {
        let mut registry = Registry::default();
        assert!(matches!(
            registry.create(Species::Rat, Position::new(f32::NAN, 0.0)),
            Err(Error::InvalidPosition { .. })
        ));
        assert!(matches!(
            registry.create_named("unicorn", Position::default()),
            Err(Error::UnknownSpecies(_))
        ));
        assert!(registry.create_named("mouse", Position::default()).is_ok());
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_snapshot_skips_destroyed() {
        let mut registry = Registry::default();
        let ids: Vec<_> = (0..3)
            .map(|i| registry.create(Species::Rat, Position::new(i as f32, 0.0)).unwrap())
            .collect();

        let snapshot = registry.snapshot(EntityFilter::All);
        registry.destroy(ids[1]);

        let visited: Vec<_> = snapshot
            .into_iter()
            .filter_map(|id| registry.get(id))
            .map(|entity| entity.id)
            .collect();
        assert_eq!(visited, vec![ids[0], ids[2]]);
    }

    #[test]
    fn test_nearest_tie_breaks_on_lowest_id() {
        let mut registry = Registry::default();
        let origin = Position::new(5.0, 5.0);
        let low = registry.create(Species::Berry, Position::new(4.0, 5.0)).unwrap();
        let high = registry.create(Species::Berry, Position::new(6.0, 5.0)).unwrap();
        registry.create(Species::Berry, Position::new(9.0, 9.0)).unwrap();

        let found = registry.nearest(&origin, |_, _| true).unwrap();
        assert_eq!(found.id, low);

        let found = registry.nearest(&origin, |e, _| e.id != low).unwrap();
        assert_eq!(found.id, high);

        assert!(registry.nearest(&origin, |_, d| d < 0.5).is_none());
    }
}
