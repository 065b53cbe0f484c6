use std::hash::{Hash, Hasher};

/// A generational entity handle.
///
/// Layout: `u32 index` + `u32 generation`.
///
/// - **index**: slot index in the entity allocator
/// - **generation**: bumped every time the slot is freed, so a handle to a
///   despawned entity never matches the entity that later reuses its slot
///
/// Two entities are equal if they have the same `(index, generation)`.
#[derive(Clone, Copy)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Returns the slot index of this entity.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Returns the generation of this entity.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl Eq for Entity {}

impl Hash for Entity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

/// Allocates and recycles entity slots with generation tracking.
///
/// When an entity is despawned, its slot's generation is bumped and the slot
/// is pushed to a free list. The next allocation reuses the slot, so old
/// handles stay dead.
pub struct EntityAllocator {
    /// Generation for each slot. Index = entity index.
    generations: Vec<u32>,
    /// Alive flag per slot.
    alive: Vec<bool>,
    /// Free list of recyclable indices (LIFO stack).
    free_list: Vec<u32>,
    /// Total number of currently alive entities.
    count: u32,
}

impl EntityAllocator {
    /// Creates a new empty allocator.
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            alive: Vec::new(),
            free_list: Vec::new(),
            count: 0,
        }
    }

    /// Allocates a new entity, reusing a recycled slot if available.
    pub fn allocate(&mut self) -> Entity {
        self.count += 1;

        if let Some(index) = self.free_list.pop() {
            let idx = index as usize;
            self.alive[idx] = true;
            Entity::new(index, self.generations[idx])
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            self.alive.push(true);
            Entity::new(index, 0)
        }
    }

    /// Deallocates an entity. Returns false if already dead or the
    /// generation does not match.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }

        let idx = entity.index() as usize;
        self.alive[idx] = false;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.free_list.push(entity.index());
        self.count -= 1;
        true
    }

    /// Returns whether the entity is currently alive.
    pub fn is_alive(&self, entity: Entity) -> bool {
        let idx = entity.index() as usize;
        idx < self.alive.len() && self.alive[idx] && self.generations[idx] == entity.generation()
    }

    /// Returns the number of alive entities.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Returns the alive entity at the given index, or `None` if the slot is
    /// free.
    pub fn entity_at_index(&self, index: u32) -> Option<Entity> {
        let idx = index as usize;
        if idx < self.alive.len() && self.alive[idx] {
            Some(Entity::new(index, self.generations[idx]))
        } else {
            None
        }
    }

    /// Iterates over all currently alive entities in slot order.
    pub fn iter_alive(&self) -> impl Iterator<Item = Entity> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(|(idx, _)| Entity::new(idx as u32, self.generations[idx]))
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_sequential() {
        let mut alloc = EntityAllocator::new();
        let e0 = alloc.allocate();
        let e1 = alloc.allocate();
        let e2 = alloc.allocate();

        assert_eq!(e0.index(), 0);
        assert_eq!(e1.index(), 1);
        assert_eq!(e2.index(), 2);
        assert_eq!(e0.generation(), 0);
    }

    #[test]
    fn deallocate_makes_dead() {
        let mut alloc = EntityAllocator::new();
        let entity = alloc.allocate();
        assert!(alloc.is_alive(entity));
        assert!(alloc.deallocate(entity));
        assert!(!alloc.is_alive(entity));
    }

    #[test]
    fn deallocate_stale_entity() {
        let mut alloc = EntityAllocator::new();
        let entity = alloc.allocate();
        assert!(alloc.deallocate(entity));
        // Deallocating again returns false
        assert!(!alloc.deallocate(entity));
    }

    #[test]
    fn recycled_slot_new_generation() {
        let mut alloc = EntityAllocator::new();
        let old = alloc.allocate();
        alloc.deallocate(old);
        let new = alloc.allocate();

        assert_eq!(new.index(), 0);
        assert_eq!(new.generation(), 1);
        assert_ne!(old, new);
        assert!(!alloc.is_alive(old));
        assert!(alloc.is_alive(new));
    }

    #[test]
    fn count_tracks_alive() {
        let mut alloc = EntityAllocator::new();
        assert_eq!(alloc.count(), 0);

        let e0 = alloc.allocate();
        let _e1 = alloc.allocate();
        assert_eq!(alloc.count(), 2);

        alloc.deallocate(e0);
        assert_eq!(alloc.count(), 1);
    }

    #[test]
    fn iter_alive_correctness() {
        let mut alloc = EntityAllocator::new();
        let entities: Vec<_> = (0..5).map(|_| alloc.allocate()).collect();

        alloc.deallocate(entities[1]);
        alloc.deallocate(entities[3]);

        let alive: Vec<_> = alloc.iter_alive().collect();
        assert_eq!(alive, vec![entities[0], entities[2], entities[4]]);
    }

    #[test]
    fn entity_at_index() {
        let mut alloc = EntityAllocator::new();
        let entity = alloc.allocate();
        assert_eq!(alloc.entity_at_index(0), Some(entity));
        alloc.deallocate(entity);
        assert_eq!(alloc.entity_at_index(0), None);
        assert_eq!(alloc.entity_at_index(7), None);
    }

    #[test]
    fn debug_format() {
        let entity = Entity::new(42, 3);
        assert_eq!(format!("{:?}", entity), "Entity(42v3)");
        assert_eq!(format!("{}", entity), "Entity(42v3)");
    }
}
