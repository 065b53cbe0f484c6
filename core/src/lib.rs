//! # Mosaic Core
//!
//! Typed attribute values and the undo/redo command engine shared by the
//! Mosaic map editor crates.

pub mod attribute;
pub mod command;

pub use attribute::{AttributeError, AttributeType, AttributeValue, Color, ObjectRef};
pub use command::{Command, CommandError, CommandResult, CommandStack, Editable};

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
