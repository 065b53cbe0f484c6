//! Bounded undo/redo command history.
//!
//! [`CommandStack`] keeps a single linear list of [`Command`] trait objects
//! and an index to the most recently applied one. Entries after the index
//! are the redo future; pushing a new command discards them.

use std::collections::VecDeque;
use std::fmt;

use super::contract::{Command, CommandError, CommandResult, Editable};

/// Default maximum number of entries kept in the history.
pub const DEFAULT_CAPACITY: usize = 100;

/// Where the last saved state sits relative to the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SavePoint {
    /// The saved state is the state after applying the entry at this index,
    /// or the state before any entry when `None`.
    Index(Option<usize>),
    /// The saved state can no longer be reached by undo/redo (it was
    /// evicted, discarded with the redo future, or a merge rewrote it).
    Lost,
}

/// A bounded, mergeable undo/redo history.
///
/// Entries are kept in a [`VecDeque`]. When the number of entries exceeds
/// the capacity, the oldest entry is dropped from the front and every index
/// shifts down by one. The state reached after such an eviction becomes the
/// new floor: nothing can be undone past it.
///
/// # Example
///
/// ```ignore
/// let mut history = CommandStack::new(50);
/// let mut scene = MyScene::new();
///
/// history.push(Box::new(my_command), &mut scene)?;
/// history.undo(&mut scene)?;
/// history.redo(&mut scene)?;
/// ```
pub struct CommandStack<T: Editable> {
    entries: VecDeque<Box<dyn Command<T>>>,
    current: Option<usize>,
    save_point: SavePoint,
    capacity: usize,
}

impl<T: Editable> CommandStack<T> {
    /// Creates an empty, clean history holding at most `capacity` entries.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            current: None,
            save_point: SavePoint::Index(None),
            capacity: capacity.max(1),
        }
    }

    /// Applies `command` to `target` and records it.
    ///
    /// The redo future is discarded first. The command is then offered to
    /// the current top entry through [`Command::merge_with`]; if the top
    /// entry absorbs it, no new entry is created. Otherwise the command is
    /// appended and the oldest entries are evicted while the history is
    /// over capacity.
    ///
    /// If `redo` fails, nothing is recorded and the history is unchanged.
    pub fn push(&mut self, mut command: Box<dyn Command<T>>, target: &mut T) -> CommandResult {
        command.redo(target)?;
        self.record(command);
        Ok(())
    }

    /// Records a command whose effect has already been applied to the
    /// target.
    ///
    /// Same bookkeeping as [`push`](Self::push) without calling `redo`.
    pub fn push_without_redo(&mut self, command: Box<dyn Command<T>>) {
        self.record(command);
    }

    fn record(&mut self, command: Box<dyn Command<T>>) {
        self.truncate_redo_future();

        if let Some(index) = self.current
            && let Some(top) = self.entries.get_mut(index)
            && top.merge_with(command.as_ref())
        {
            if self.save_point == SavePoint::Index(Some(index)) {
                self.save_point = SavePoint::Lost;
            }
            return;
        }

        self.entries.push_back(command);
        self.current = Some(self.entries.len() - 1);
        while self.entries.len() > self.capacity {
            self.evict_oldest();
        }
    }

    fn truncate_redo_future(&mut self) {
        let keep = self.current.map_or(0, |index| index + 1);
        if self.entries.len() > keep {
            self.entries.truncate(keep);
            if let SavePoint::Index(Some(index)) = self.save_point
                && index >= keep
            {
                self.save_point = SavePoint::Lost;
            }
        }
    }

    fn evict_oldest(&mut self) {
        if let Some(evicted) = self.entries.pop_front() {
            log::trace!("Evicting oldest command: {}", evicted.description());
        }
        self.current = match self.current {
            Some(0) | None => None,
            Some(index) => Some(index - 1),
        };
        self.save_point = match self.save_point {
            SavePoint::Index(None) | SavePoint::Lost => SavePoint::Lost,
            SavePoint::Index(Some(0)) => SavePoint::Index(None),
            SavePoint::Index(Some(index)) => SavePoint::Index(Some(index - 1)),
        };
    }

    /// Undoes the most recently applied command.
    ///
    /// Returns [`CommandError::NothingToUndo`] if nothing is applied. If the
    /// command's own `undo` fails, the index is left unchanged.
    pub fn undo(&mut self, target: &mut T) -> CommandResult {
        let index = self.current.ok_or(CommandError::NothingToUndo)?;
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(CommandError::NothingToUndo)?;
        entry.undo(target)?;
        self.current = index.checked_sub(1);
        Ok(())
    }

    /// Redoes the command right after the current index.
    ///
    /// Returns [`CommandError::NothingToRedo`] if the redo future is empty.
    /// If the command's own `redo` fails, the index is left unchanged.
    pub fn redo(&mut self, target: &mut T) -> CommandResult {
        let next = self.current.map_or(0, |index| index + 1);
        let entry = self
            .entries
            .get_mut(next)
            .ok_or(CommandError::NothingToRedo)?;
        entry.redo(target)?;
        self.current = Some(next);
        Ok(())
    }

    /// Returns `true` if a command is currently applied.
    pub fn can_undo(&self) -> bool {
        self.current.is_some()
    }

    /// Returns `true` if there is an entry after the current index.
    pub fn can_redo(&self) -> bool {
        self.current.map_or(0, |index| index + 1) < self.entries.len()
    }

    /// Label of the command [`undo`](Self::undo) would revert.
    pub fn undo_text(&self) -> Option<&str> {
        self.current
            .and_then(|index| self.entries.get(index))
            .map(|entry| entry.description())
    }

    /// Label of the command [`redo`](Self::redo) would reapply.
    pub fn redo_text(&self) -> Option<&str> {
        self.entries
            .get(self.current.map_or(0, |index| index + 1))
            .map(|entry| entry.description())
    }

    /// Marks the current state as the saved state.
    pub fn mark_as_clean(&mut self) {
        self.save_point = SavePoint::Index(self.current);
    }

    /// Forgets the saved state.
    ///
    /// Afterwards the history is clean only at the pre-history state.
    pub fn reset_clean(&mut self) {
        self.save_point = SavePoint::Index(None);
    }

    /// Returns `true` if the current state is the saved state.
    ///
    /// A freshly created history is clean.
    pub fn is_clean(&self) -> bool {
        self.save_point == SavePoint::Index(self.current)
    }

    /// Index of the entry whose state was last marked clean.
    ///
    /// `None` if the clean state is the pre-history state or can no longer
    /// be reached.
    pub fn clean_index(&self) -> Option<usize> {
        match self.save_point {
            SavePoint::Index(index) => index,
            SavePoint::Lost => None,
        }
    }

    /// Index of the most recently applied entry.
    pub fn index(&self) -> Option<usize> {
        self.current
    }

    /// Number of entries, applied or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Changes the capacity, evicting the oldest entries that no longer fit.
    ///
    /// The redo future is kept. A capacity of zero is treated as one.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.entries.len() > self.capacity {
            self.evict_oldest();
        }
    }

    /// Removes every entry.
    ///
    /// The current state stays the saved state if it was; otherwise the
    /// saved state becomes unreachable.
    pub fn clear(&mut self) {
        let was_clean = self.is_clean();
        self.entries.clear();
        self.current = None;
        self.save_point = if was_clean {
            SavePoint::Index(None)
        } else {
            SavePoint::Lost
        };
    }
}

impl<T: Editable> Default for CommandStack<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<T: Editable> fmt::Debug for CommandStack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandStack")
            .field("len", &self.entries.len())
            .field("current", &self.current)
            .field("save_point", &self.save_point)
            .field("capacity", &self.capacity)
            .finish()
    }
}
