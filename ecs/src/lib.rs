//! # Mosaic ECS
//!
//! A small single-threaded entity store used as the document model of the
//! Mosaic map editor.
//!
//! ## Core Types
//!
//! - [`Entity`] — Lightweight generational entity identifier
//! - [`EntityAllocator`] — Slot allocator with generation tracking
//! - [`SparseSet`] — Per-type component storage
//! - [`World`] — Container owning entities, components, and resources
//! - [`EcsError`] — Errors from world operations

mod entity;
mod error;
mod resource;
mod sparse_set;
mod world;

pub use entity::{Entity, EntityAllocator};
pub use error::EcsError;
pub use sparse_set::SparseSet;
pub use world::World;
