//! Bounded undo/redo stacks over [`EditorCommand`].

use std::collections::VecDeque;

use crate::{
    foundation::core::HISTORY_CAP, history::command::EditorCommand, model::track::EditorData,
};

/// Snapshot of the history state, delivered to subscribers after each change.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HistoryStatus {
    /// Whether an undo step is available.
    pub can_undo: bool,
    /// Whether a redo step is available.
    pub can_redo: bool,
    /// Description of the command `undo` would revert.
    pub undo_description: Option<String>,
    /// Description of the command `redo` would re-apply.
    pub redo_description: Option<String>,
}

type StatusListener = Box<dyn Fn(&HistoryStatus) + Send>;

/// Undo/redo command history with a fixed capacity.
///
/// When the undo stack is full the oldest entry is evicted, so the most
/// recent 200 edits stay reachable. Any new `execute` clears the redo stack.
pub struct CommandHistory {
    undo_stack: VecDeque<EditorCommand>,
    redo_stack: Vec<EditorCommand>,
    cap: usize,
    listeners: Vec<(u64, StatusListener)>,
    next_listener: u64,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CommandHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHistory")
            .field("undo_depth", &self.undo_stack.len())
            .field("redo_depth", &self.redo_stack.len())
            .field("cap", &self.cap)
            .finish()
    }
}

impl CommandHistory {
    /// History with the standard capacity.
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAP)
    }

    /// History with a custom capacity (at least 1).
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            cap: cap.max(1),
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// Apply a command to `data` and record it for undo.
    #[tracing::instrument(skip(self, command, data), fields(command = %command.id()))]
    pub fn execute(&mut self, command: EditorCommand, data: &mut EditorData) {
        command.apply(data);
        if self.undo_stack.len() == self.cap {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(command);
        self.redo_stack.clear();
        self.notify();
    }

    /// Revert the most recent command. Returns false when nothing to undo.
    pub fn undo(&mut self, data: &mut EditorData) -> bool {
        let Some(command) = self.undo_stack.pop_back() else {
            return false;
        };
        tracing::debug!(command = %command.id(), "undo '{}'", command.description());
        command.revert(data);
        self.redo_stack.push(command);
        self.notify();
        true
    }

    /// Re-apply the most recently undone command. Returns false when empty.
    pub fn redo(&mut self, data: &mut EditorData) -> bool {
        let Some(command) = self.redo_stack.pop() else {
            return false;
        };
        tracing::debug!(command = %command.id(), "redo '{}'", command.description());
        command.apply(data);
        if self.undo_stack.len() == self.cap {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(command);
        self.notify();
        true
    }

    /// Whether an undo step is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether a redo step is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Description of the command `undo` would revert.
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|c| c.description())
    }

    /// Description of the command `redo` would re-apply.
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|c| c.description())
    }

    /// Number of undoable commands currently held.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Drop both stacks (e.g. after loading a different project).
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.notify();
    }

    /// Current status snapshot.
    pub fn status(&self) -> HistoryStatus {
        HistoryStatus {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            undo_description: self.undo_description().map(str::to_owned),
            redo_description: self.redo_description().map(str::to_owned),
        }
    }

    /// Register a listener called after every history change. Returns a token
    /// for [`Self::unsubscribe`].
    pub fn subscribe(&mut self, listener: impl Fn(&HistoryStatus) + Send + 'static) -> u64 {
        let token = self.next_listener;
        self.next_listener += 1;
        self.listeners.push((token, Box::new(listener)));
        token
    }

    /// Remove a listener registered with [`Self::subscribe`].
    pub fn unsubscribe(&mut self, token: u64) {
        self.listeners.retain(|(t, _)| *t != token);
    }

    fn notify(&self) {
        let status = self.status();
        for (_, listener) in &self.listeners {
            listener(&status);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/history/stack.rs"]
mod tests;
