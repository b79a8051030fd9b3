// Undo/Redo Command System
//
// Implements the Command pattern for committed moves. Commands do not touch
// the store themselves; they produce candidate updates that go back through
// the optimistic coordinator like any drag.

use crate::drag::positioner::SiblingKey;
use crate::models::item::{ItemId, ItemPlacement};
use crate::mutation::{CandidateUpdate, PendingMutation};

/// Trait for undoable commands
pub trait Command: std::fmt::Debug {
    /// Update that re-applies the command (redo)
    fn execute(&self) -> CandidateUpdate;

    /// Update that reverts the command
    fn undo(&self) -> CandidateUpdate;

    /// Get a human-readable description of the command
    fn description(&self) -> String;
}

/// Command for a confirmed move, resize or reorder
#[derive(Debug, Clone, PartialEq)]
pub struct MoveItemCommand {
    pub item_id: ItemId,
    pub title: String,
    pub before: ItemPlacement,
    pub after: ItemPlacement,
    /// Sibling keys before the bucket was renumbered
    pub siblings_before: Vec<SiblingKey>,
    pub siblings_after: Vec<SiblingKey>,
}

impl MoveItemCommand {
    /// Build the command for an applied mutation, using its snapshot as the
    /// "before" state.
    pub fn from_pending(pending: &PendingMutation) -> Option<Self> {
        let snapshot = pending.snapshot();
        let update = pending.update();
        let item = snapshot.get(update.item_id)?;

        let siblings_before = update
            .rekeyed
            .iter()
            .filter_map(|sibling| {
                snapshot
                    .get(sibling.id)
                    .and_then(|s| s.order_key())
                    .map(|key| SiblingKey::new(sibling.id, key))
            })
            .collect();

        Some(Self {
            item_id: update.item_id,
            title: item.title.clone(),
            before: item.placement.clone(),
            after: update.placement.clone(),
            siblings_before,
            siblings_after: update.rekeyed.clone(),
        })
    }
}

impl Command for MoveItemCommand {
    fn execute(&self) -> CandidateUpdate {
        CandidateUpdate::new(self.item_id, self.after.clone())
            .with_rekeyed(self.siblings_after.clone())
    }

    fn undo(&self) -> CandidateUpdate {
        CandidateUpdate::new(self.item_id, self.before.clone())
            .with_rekeyed(self.siblings_before.clone())
    }

    fn description(&self) -> String {
        format!("Move \"{}\"", self.title)
    }
}

/// Identifies a command for as long as it stays in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HistoryId(u64);

#[derive(Debug)]
struct HistoryEntry {
    id: HistoryId,
    command: Box<dyn Command + Send + Sync>,
}

/// Manager for undo/redo stacks
#[derive(Debug)]
pub struct UndoManager {
    /// Stack of commands that can be undone
    undo_stack: Vec<HistoryEntry>,
    /// Stack of commands that can be redone
    redo_stack: Vec<HistoryEntry>,
    /// Maximum number of commands to keep in history
    max_history: usize,
    next_id: u64,
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoManager {
    pub fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_history: 50,
            next_id: 0,
        }
    }

    /// Push a command onto the undo stack once the store has confirmed it
    pub fn push(&mut self, command: Box<dyn Command + Send + Sync>) -> HistoryId {
        // Clear redo stack when a new command is executed
        self.redo_stack.clear();

        self.next_id += 1;
        let id = HistoryId(self.next_id);
        self.undo_stack.push(HistoryEntry { id, command });

        while self.undo_stack.len() > self.max_history {
            self.undo_stack.remove(0);
        }
        id
    }

    /// Pop the last command and return the update that reverts it
    pub fn undo(&mut self) -> Option<(HistoryId, CandidateUpdate)> {
        let entry = self.undo_stack.pop()?;
        let step = (entry.id, entry.command.undo());
        self.redo_stack.push(entry);
        Some(step)
    }

    /// Pop the last undone command and return the update that re-applies it
    pub fn redo(&mut self) -> Option<(HistoryId, CandidateUpdate)> {
        let entry = self.redo_stack.pop()?;
        let step = (entry.id, entry.command.execute());
        self.undo_stack.push(entry);
        Some(step)
    }

    /// Put back the command of an undo that could not be saved.
    ///
    /// Other undos may have finished since, so the command is looked up by
    /// id rather than taken from the top. Returns false if it already left
    /// history.
    pub fn requeue_undo(&mut self, id: HistoryId) -> bool {
        Self::transfer(&mut self.redo_stack, &mut self.undo_stack, id)
    }

    /// Put back the command of a redo that could not be saved
    pub fn requeue_redo(&mut self, id: HistoryId) -> bool {
        Self::transfer(&mut self.undo_stack, &mut self.redo_stack, id)
    }

    fn transfer(from: &mut Vec<HistoryEntry>, to: &mut Vec<HistoryEntry>, id: HistoryId) -> bool {
        match from.iter().position(|entry| entry.id == id) {
            Some(index) => {
                to.push(from.remove(index));
                true
            }
            None => {
                log::debug!("History entry {:?} is gone; nothing to requeue", id);
                false
            }
        }
    }

    /// Check if there are commands to undo
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if there are commands to redo
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the description of the next command to undo (owned string for menu display)
    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.last().map(|entry| entry.command.description())
    }

    /// Get the description of the next command to redo (owned string for menu display)
    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(|entry| entry.command.description())
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
