//! Active-selection state.

use crate::foundation::core::TrackId;

type SelectionListener = Box<dyn Fn(Option<&TrackId>) + Send>;

/// Holds the single actively selected track, if any.
///
/// Re-selecting the current selection does not notify, so subscribers only
/// see real changes.
#[derive(Default)]
pub struct SelectionManager {
    selected: Option<TrackId>,
    listeners: Vec<(u64, SelectionListener)>,
    next_listener: u64,
}

impl std::fmt::Debug for SelectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionManager")
            .field("selected", &self.selected)
            .finish()
    }
}

impl SelectionManager {
    /// Empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently selected track id, if any.
    pub fn selected(&self) -> Option<&TrackId> {
        self.selected.as_ref()
    }

    /// Whether `id` is the current selection.
    pub fn is_selected(&self, id: &TrackId) -> bool {
        self.selected.as_ref() == Some(id)
    }

    /// Select a track. No-op (and no notification) if already selected.
    pub fn select(&mut self, id: TrackId) {
        if self.selected.as_ref() == Some(&id) {
            return;
        }
        self.selected = Some(id);
        self.notify();
    }

    /// Clear the selection. No-op if already empty.
    pub fn clear(&mut self) {
        if self.selected.is_none() {
            return;
        }
        self.selected = None;
        self.notify();
    }

    /// Register a listener called with the new selection after every change.
    /// Returns a token for [`Self::unsubscribe`].
    pub fn subscribe(&mut self, listener: impl Fn(Option<&TrackId>) + Send + 'static) -> u64 {
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
        for (_, listener) in &self.listeners {
            listener(self.selected.as_ref());
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interact/selection.rs"]
mod tests;
