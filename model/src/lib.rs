//! # Mosaic Model
//!
//! The map document edited by Mosaic: layers, objects, tilesets and the
//! attribute contexts attached to them, all stored in a
//! [`mosaic_ecs::World`]. Every user-visible edit is a command in
//! [`commands`] and goes through the document's undo history.
//!
//! ## Core Types
//!
//! - [`MapDocument`] — A document together with its command history
//! - [`DocumentModel`] — The command target: world plus texture loader
//! - [`Settings`] — Editor settings read from a TOML file
//! - [`ModelError`] — Errors from model operations

pub mod commands;
pub mod component;
pub mod components;
pub mod context;
pub mod document;
pub mod error;
pub mod ids;
pub mod layer;
pub mod map;
pub mod object;
pub mod settings;
pub mod snapshot;
pub mod texture;
pub mod tileset;

pub use commands::CommandKind;
pub use document::{DocumentModel, MapDocument, create_document_world};
pub use error::{ModelError, ModelResult};
pub use ids::{ComponentId, ContextId, LayerId, ObjectId, TileId, TilePos, TilesetId};
pub use settings::{Settings, SettingsError};
pub use texture::{InMemoryTextureLoader, TextureInfo, TextureLoader};
