//! Edit targets and reversible commands.
//!
//! - [`Editable`] — implemented by the type commands operate on
//! - [`Command`] — a reversible edit operation (Command pattern)
//! - [`CommandError`] / [`CommandResult`] — error handling for commands
//!
//! Commands are self-contained: each implementation stores whatever data it
//! needs to redo and undo itself (target identifiers, old/new values,
//! snapshots of destroyed state, and so on).

use std::any::Any;
use std::fmt;

/// Helper trait for downcasting trait objects to concrete types.
///
/// Automatically implemented for all `'static` types. Used by
/// [`Command::merge_with`] to downcast `&dyn Command<T>` to the concrete
/// command type once the [`kind`](Command::kind) tags have matched.
pub trait AsAny: 'static {
    /// Returns a reference to `self` as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<T: 'static> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A type that serves as the target of commands.
///
/// The associated [`CommandKind`](Editable::CommandKind) is the closed set of
/// tags the target's commands report from [`Command::kind`].
pub trait Editable: 'static {
    type CommandKind: Copy + Eq + fmt::Debug;
}

/// Error type for command execution failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// `undo` was called while there was nothing to undo.
    #[error("nothing to undo")]
    NothingToUndo,
    /// `redo` was called while there was nothing to redo.
    #[error("nothing to redo")]
    NothingToRedo,
    /// The object the command refers to does not exist.
    #[error("target not found: {0}")]
    TargetNotFound(String),
    /// The target is in an invalid state for this command.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// A custom error with a description.
    #[error("{0}")]
    Custom(String),
}

/// Result type for command operations.
pub type CommandResult<T = ()> = Result<T, CommandError>;

/// A reversible editor command.
///
/// A command is constructed unexecuted, applied with [`redo`](Self::redo)
/// and reverted with [`undo`](Self::undo). `undo` is only ever called on a
/// command whose most recent call was a successful `redo`.
///
/// # Merging
///
/// Commands that represent incremental changes (each step of a slider drag,
/// each keystroke of a rename) can override [`merge_with`](Self::merge_with)
/// so that consecutive commands coalesce into one undo step. An
/// implementation compares [`kind`](Self::kind) first and only then
/// downcasts `other` through [`AsAny::as_any`].
///
/// # Example
///
/// ```ignore
/// impl Command<Scene> for SetOpacity {
///     fn redo(&mut self, scene: &mut Scene) -> CommandResult {
///         self.old = Some(scene.set_opacity(self.layer, self.new)?);
///         Ok(())
///     }
///
///     fn undo(&mut self, scene: &mut Scene) -> CommandResult {
///         let old = self.old.ok_or_else(|| CommandError::InvalidState("not applied".into()))?;
///         scene.set_opacity(self.layer, old)?;
///         Ok(())
///     }
///
///     fn description(&self) -> &str {
///         "Set Layer Opacity"
///     }
///
///     fn kind(&self) -> SceneCommand {
///         SceneCommand::SetOpacity
///     }
///
///     fn merge_with(&mut self, other: &dyn Command<Scene>) -> bool {
///         if other.kind() == self.kind()
///             && let Some(other) = other.as_any().downcast_ref::<Self>()
///             && other.layer == self.layer
///         {
///             self.new = other.new;
///             return true;
///         }
///         false
///     }
/// }
/// ```
pub trait Command<T: Editable>: fmt::Debug + AsAny + Send {
    /// Applies the command to the target (forward direction).
    fn redo(&mut self, target: &mut T) -> CommandResult;

    /// Reverses the command.
    ///
    /// Must restore the target to the state before the matching
    /// [`redo`](Self::redo) was called.
    fn undo(&mut self, target: &mut T) -> CommandResult;

    /// A short, human-readable label for the undo/redo menu.
    fn description(&self) -> &str;

    /// The stable tag identifying the concrete command type.
    fn kind(&self) -> T::CommandKind;

    /// Tries to absorb `other` into `self`.
    ///
    /// Returns `true` if `other`'s effect was folded into this command, in
    /// which case the caller drops `other`. Default: never merges.
    fn merge_with(&mut self, _other: &dyn Command<T>) -> bool {
        false
    }
}
