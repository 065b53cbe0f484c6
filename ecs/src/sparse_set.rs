use std::any::Any;

use crate::entity::Entity;

/// Typed sparse set storing components of type T.
///
/// Uses a sparse array (entity index → dense index) and a dense array
/// (contiguous component data + entity mapping) for O(1) insert/remove/get
/// and cache-friendly iteration. Removal swaps the last element into the
/// freed slot, so dense order is not insertion order.
pub struct SparseSet<T: 'static> {
    /// Sparse array: `entity_index -> dense_index`. `None` means the entity
    /// does not have this component.
    sparse: Vec<Option<u32>>,
    /// Dense array of component values (contiguous for iteration).
    dense: Vec<T>,
    /// Entities corresponding to each dense element.
    entities: Vec<Entity>,
}

impl<T: 'static> SparseSet<T> {
    /// Creates a new empty sparse set.
    pub fn new() -> Self {
        Self {
            sparse: Vec::new(),
            dense: Vec::new(),
            entities: Vec::new(),
        }
    }

    /// Inserts a component for the given entity.
    ///
    /// If the entity's slot already holds a component, it is replaced and
    /// the previous value is returned.
    pub fn insert(&mut self, entity: Entity, value: T) -> Option<T> {
        let idx = entity.index() as usize;

        if idx >= self.sparse.len() {
            self.sparse.resize(idx + 1, None);
        }

        if let Some(dense_idx) = self.sparse[idx] {
            let di = dense_idx as usize;
            self.entities[di] = entity;
            Some(std::mem::replace(&mut self.dense[di], value))
        } else {
            let dense_idx = self.dense.len() as u32;
            self.sparse[idx] = Some(dense_idx);
            self.dense.push(value);
            self.entities.push(entity);
            None
        }
    }

    /// Removes the component for the given entity.
    /// Returns the removed value, or `None` if the entity did not have this component.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let dense_idx = self.dense_index(entity)?;
        self.sparse[entity.index() as usize] = None;

        let last_dense = self.dense.len() - 1;
        if dense_idx != last_dense {
            // Swap-remove: move last element into the removed slot
            let swapped = self.entities[last_dense];
            self.sparse[swapped.index() as usize] = Some(dense_idx as u32);
            self.entities[dense_idx] = swapped;
        }

        self.entities.pop();
        Some(self.dense.swap_remove(dense_idx))
    }

    fn dense_index(&self, entity: Entity) -> Option<usize> {
        let dense_idx = (*self.sparse.get(entity.index() as usize)?)? as usize;
        (self.entities[dense_idx] == entity).then_some(dense_idx)
    }

    /// Returns a reference to the component for the given entity.
    pub fn get(&self, entity: Entity) -> Option<&T> {
        let dense_idx = self.dense_index(entity)?;
        Some(&self.dense[dense_idx])
    }

    /// Returns a mutable reference to the component for the given entity.
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        let dense_idx = self.dense_index(entity)?;
        Some(&mut self.dense[dense_idx])
    }

    /// Returns whether the entity has this component.
    pub fn contains(&self, entity: Entity) -> bool {
        self.dense_index(entity).is_some()
    }

    /// Returns the number of components stored.
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Returns whether this sparse set is empty.
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Iterates over `(entity, &component)` pairs in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.entities.iter().copied().zip(self.dense.iter())
    }

    /// Iterates over `(entity, &mut component)` pairs in dense order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.entities.iter().copied().zip(self.dense.iter_mut())
    }

    /// Returns the entities in dense order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }
}

impl<T: 'static> Default for SparseSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased view of a [`SparseSet`], used by the world to drop an
/// entity's components without knowing their types.
pub(crate) trait ErasedStorage: Any {
    fn remove_entity(&mut self, entity: Entity);
    fn contains_entity(&self, entity: Entity) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: 'static> ErasedStorage for SparseSet<T> {
    fn remove_entity(&mut self, entity: Entity) {
        self.remove(entity);
    }

    fn contains_entity(&self, entity: Entity) -> bool {
        self.contains(entity)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
