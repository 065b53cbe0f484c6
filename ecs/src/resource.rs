use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Container for typed singleton resources.
///
/// Resources are values stored once per World, keyed by their type. Access
/// goes through `&self`/`&mut self` on the owning world, so no runtime
/// borrow tracking is needed.
pub(crate) struct Resources {
    entries: HashMap<TypeId, Box<dyn Any>>,
}

impl Resources {
    /// Creates a new empty resource container.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Inserts or replaces a resource of type T, returning the old value.
    pub fn insert<T: 'static>(&mut self, value: T) -> Option<T> {
        self.entries
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    /// Removes a resource of type T, returning it if present.
    pub fn remove<T: 'static>(&mut self) -> Option<T> {
        let entry = self.entries.remove(&TypeId::of::<T>())?;
        entry.downcast::<T>().ok().map(|value| *value)
    }

    /// Returns whether a resource of type T exists.
    pub fn contains<T: 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.entries.get(&TypeId::of::<T>())?.downcast_ref::<T>()
    }

    pub fn get_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.entries.get_mut(&TypeId::of::<T>())?.downcast_mut::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Gravity(f32);

    #[test]
    fn insert_get_remove() {
        let mut resources = Resources::new();
        assert!(!resources.contains::<Gravity>());

        assert_eq!(resources.insert(Gravity(9.8)), None);
        assert_eq!(resources.get::<Gravity>(), Some(&Gravity(9.8)));

        resources.get_mut::<Gravity>().unwrap().0 = 1.6;
        assert_eq!(resources.insert(Gravity(3.7)), Some(Gravity(1.6)));

        assert_eq!(resources.remove::<Gravity>(), Some(Gravity(3.7)));
        assert!(resources.get::<Gravity>().is_none());
    }
}
