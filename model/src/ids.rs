//! Identifiers used throughout the document model.
//!
//! Context ids are runtime handles: they are generated per document session,
//! never persisted, and only unique within the document that issued them.
//! Layer, object, tileset and component ids are document ids and survive
//! snapshot/restore unchanged.

use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Identifies an attribute context within one document session.
    ContextId(u32)
);
id_type!(
    /// Identifies a component definition.
    ComponentId(u32)
);
id_type!(LayerId(i32));
id_type!(ObjectId(i32));
id_type!(TilesetId(u32));
id_type!(
    /// A global tile identifier. Zero is the empty tile.
    TileId(i32)
);

impl TileId {
    pub const EMPTY: Self = Self(0);

    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }
}

/// A cell position in the tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TilePos {
    pub row: usize,
    pub col: usize,
}

impl TilePos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Generator for [`ContextId`]s, stored as a resource of each document's
/// world.
#[derive(Debug, Clone)]
pub struct ContextIdGenerator {
    next: u32,
}

impl ContextIdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Returns the id the next allocation will hand out.
    pub fn peek(&self) -> ContextId {
        ContextId(self.next)
    }

    /// Returns the current id and advances the counter.
    pub fn allocate(&mut self) -> ContextId {
        let id = ContextId(self.next);
        self.next += 1;
        id
    }

    /// Restarts the sequence at 1.
    pub fn reset(&mut self) {
        self.next = 1;
    }
}

impl Default for ContextIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Generator for [`ComponentId`]s, stored as a resource of each document's
/// world.
#[derive(Debug, Clone)]
pub struct ComponentIdGenerator {
    next: u32,
}

impl ComponentIdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn allocate(&mut self) -> ComponentId {
        let id = ComponentId(self.next);
        self.next += 1;
        id
    }

    /// Makes sure future allocations never hand out `id` again.
    pub fn observe(&mut self, id: ComponentId) {
        self.next = self.next.max(id.0 + 1);
    }
}

impl Default for ComponentIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
