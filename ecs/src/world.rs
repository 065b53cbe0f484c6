use std::any::TypeId;
use std::collections::HashMap;

use crate::entity::{Entity, EntityAllocator};
use crate::error::EcsError;
use crate::resource::Resources;
use crate::sparse_set::{ErasedStorage, SparseSet};

/// An independent entity store containing entities, components, and
/// resources.
///
/// Each World is fully self-contained. Multiple worlds can coexist in the
/// same process, sharing no data between them. Component storages are
/// created lazily on the first insert of a type.
///
/// # Example
///
/// ```
/// use mosaic_ecs::World;
///
/// struct Position { x: f32, y: f32 }
///
/// let mut world = World::new();
/// let entity = world.spawn();
/// world.insert(entity, Position { x: 0.0, y: 0.0 }).unwrap();
///
/// for (entity, pos) in world.iter::<Position>() {
///     println!("{entity}: ({}, {})", pos.x, pos.y);
/// }
/// ```
pub struct World {
    entities: EntityAllocator,
    components: HashMap<TypeId, Box<dyn ErasedStorage>>,
    resources: Resources,
}

impl World {
    /// Creates a new empty world.
    pub fn new() -> Self {
        Self {
            entities: EntityAllocator::new(),
            components: HashMap::new(),
            resources: Resources::new(),
        }
    }

    // ---- Entity management ----

    /// Spawns a new entity and returns its handle.
    pub fn spawn(&mut self) -> Entity {
        self.entities.allocate()
    }

    /// Despawns an entity, removing all its components.
    ///
    /// Returns `true` if the entity was alive and is now despawned.
    /// Returns `false` if the entity was already dead.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if !self.entities.deallocate(entity) {
            return false;
        }

        for storage in self.components.values_mut() {
            storage.remove_entity(entity);
        }
        true
    }

    /// Returns whether the entity is currently alive.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Returns the number of alive entities.
    pub fn entity_count(&self) -> u32 {
        self.entities.count()
    }

    /// Iterates over all currently alive entities.
    pub fn iter_entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter_alive()
    }

    /// Returns the number of component types stored on `entity`.
    pub fn component_count_of(&self, entity: Entity) -> usize {
        self.components
            .values()
            .filter(|storage| storage.contains_entity(entity))
            .count()
    }

    // ---- Components ----

    fn storage<T: 'static>(&self) -> Option<&SparseSet<T>> {
        self.components
            .get(&TypeId::of::<T>())?
            .as_any()
            .downcast_ref::<SparseSet<T>>()
    }

    fn storage_mut<T: 'static>(&mut self) -> Option<&mut SparseSet<T>> {
        self.components
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<SparseSet<T>>()
    }

    /// Inserts a component on an entity.
    ///
    /// Returns the previous value of that type, if any.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::DeadEntity`] if the entity is not alive.
    pub fn insert<T: 'static>(&mut self, entity: Entity, component: T) -> Result<Option<T>, EcsError> {
        if !self.entities.is_alive(entity) {
            return Err(EcsError::DeadEntity(entity));
        }

        let storage = self
            .components
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(SparseSet::<T>::new()));

        match storage.as_any_mut().downcast_mut::<SparseSet<T>>() {
            Some(set) => Ok(set.insert(entity, component)),
            None => Err(EcsError::DeadEntity(entity)),
        }
    }

    /// Removes a component from an entity.
    ///
    /// Returns the removed value, or `None` if the entity did not have it.
    pub fn remove<T: 'static>(&mut self, entity: Entity) -> Option<T> {
        self.storage_mut::<T>()?.remove(entity)
    }

    /// Returns a reference to a component on an entity.
    pub fn get<T: 'static>(&self, entity: Entity) -> Option<&T> {
        self.storage::<T>()?.get(entity)
    }

    /// Returns a mutable reference to a component on an entity.
    pub fn get_mut<T: 'static>(&mut self, entity: Entity) -> Option<&mut T> {
        self.storage_mut::<T>()?.get_mut(entity)
    }

    /// Returns whether the entity has a component of type T.
    pub fn has<T: 'static>(&self, entity: Entity) -> bool {
        self.storage::<T>().is_some_and(|set| set.contains(entity))
    }

    /// Iterates over every `(entity, &T)` pair.
    pub fn iter<T: 'static>(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.storage::<T>().into_iter().flat_map(|set| set.iter())
    }

    /// Iterates over every `(entity, &mut T)` pair.
    pub fn iter_mut<T: 'static>(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.storage_mut::<T>()
            .into_iter()
            .flat_map(|set| set.iter_mut())
    }

    /// Returns the entities holding a component of type T.
    pub fn entities_with<T: 'static>(&self) -> Vec<Entity> {
        self.storage::<T>()
            .map(|set| set.entities().to_vec())
            .unwrap_or_default()
    }

    /// Returns the number of entities holding a component of type T.
    pub fn count<T: 'static>(&self) -> usize {
        self.storage::<T>().map_or(0, SparseSet::len)
    }

    /// Returns the first entity (in storage order) holding a T.
    pub fn first<T: 'static>(&self) -> Option<(Entity, &T)> {
        self.iter::<T>().next()
    }

    // ---- Resources ----

    /// Inserts or replaces a resource, returning the previous value.
    pub fn insert_resource<T: 'static>(&mut self, value: T) -> Option<T> {
        self.resources.insert(value)
    }

    /// Removes a resource and returns it.
    pub fn remove_resource<T: 'static>(&mut self) -> Option<T> {
        self.resources.remove::<T>()
    }

    /// Returns whether a resource of type T exists.
    pub fn has_resource<T: 'static>(&self) -> bool {
        self.resources.contains::<T>()
    }

    /// Returns a shared reference to a resource.
    pub fn resource<T: 'static>(&self) -> Option<&T> {
        self.resources.get::<T>()
    }

    /// Returns an exclusive reference to a resource.
    pub fn resource_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.resources.get_mut::<T>()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
