//! Undo/redo command engine.
//!
//! This module is decoupled from any concrete document type so that
//! higher-level crates can implement their own commands:
//!
//! - [`Editable`] — implemented by the type commands operate on
//! - [`Command`] — a reversible edit operation (Command pattern)
//! - [`CommandStack`] — bounded undo/redo history with merging and
//!   clean-state tracking
//!
//! # Merging
//!
//! When a command is recorded, the current top entry is offered the new
//! command through [`Command::merge_with`]. A top entry that accepts it
//! absorbs its effect, so a drag that produced a hundred small edits undoes
//! in a single step.
//!
//! # Clean state
//!
//! [`CommandStack::mark_as_clean`] remembers the current position as the
//! saved state. [`CommandStack::is_clean`] reports whether undo/redo has
//! brought the history back to exactly that position.

mod contract;
mod stack;

pub use contract::{AsAny, Command, CommandError, CommandResult, Editable};
pub use stack::{CommandStack, DEFAULT_CAPACITY};
