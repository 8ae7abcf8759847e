//! Flat lookup projection of [`EditorData`].
//!
//! The nested track list is canonical; hot paths that need O(log n) entity
//! lookup (timeline rows, hit testing, the interpolation sweep) project it
//! into flat id-keyed tables and write back through [`denormalize`].

use std::collections::BTreeMap;

use crate::{
    foundation::core::{ActionId, TrackId},
    model::track::{ActionBlock, EditorData, Track},
};

/// A track with its actions lifted out into the flat `actions` table.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedTrack {
    /// The track, its `actions` list emptied.
    pub track: Track,
    /// Ids of the track's actions, in stored order.
    pub action_ids: Vec<ActionId>,
}

/// Id-keyed projection of the editor document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizedEditorState {
    /// Tracks by id.
    pub tracks: BTreeMap<TrackId, NormalizedTrack>,
    /// Actions by id, across all tracks.
    pub actions: BTreeMap<ActionId, ActionBlock>,
    /// Track display order.
    pub track_order: Vec<TrackId>,
}

impl NormalizedEditorState {
    /// Look up a track by id.
    pub fn track(&self, id: &TrackId) -> Option<&Track> {
        self.tracks.get(id).map(|n| &n.track)
    }

    /// Look up an action by id.
    pub fn action(&self, id: &ActionId) -> Option<&ActionBlock> {
        self.actions.get(id)
    }

    /// The track that owns `action_id`.
    pub fn owner_of(&self, action_id: &ActionId) -> Option<&TrackId> {
        self.tracks
            .iter()
            .find(|(_, n)| n.action_ids.contains(action_id))
            .map(|(id, _)| id)
    }

    /// All actions of one track, in stored order.
    pub fn actions_of(&self, track_id: &TrackId) -> Vec<&ActionBlock> {
        let Some(normalized) = self.tracks.get(track_id) else {
            return Vec::new();
        };
        normalized
            .action_ids
            .iter()
            .filter_map(|id| self.actions.get(id))
            .collect()
    }
}

/// Project nested editor data into flat id-keyed tables.
pub fn normalize(data: &EditorData) -> NormalizedEditorState {
    let mut state = NormalizedEditorState::default();
    for track in &data.tracks {
        let mut flat = track.clone();
        let actions = std::mem::take(&mut flat.actions);
        let action_ids = actions.iter().map(|a| a.id.clone()).collect();
        for action in actions {
            state.actions.insert(action.id.clone(), action);
        }
        state.track_order.push(track.id.clone());
        state.tracks.insert(
            track.id.clone(),
            NormalizedTrack {
                track: flat,
                action_ids,
            },
        );
    }
    state
}

/// Rebuild nested editor data from the flat tables.
///
/// `denormalize(&normalize(d)) == d` for any sanitized document.
pub fn denormalize(state: &NormalizedEditorState) -> EditorData {
    let mut data = EditorData::empty();
    for track_id in &state.track_order {
        let Some(normalized) = state.tracks.get(track_id) else {
            continue;
        };
        let mut track = normalized.track.clone();
        track.actions = normalized
            .action_ids
            .iter()
            .filter_map(|id| state.actions.get(id).cloned())
            .collect();
        data.tracks.push(track);
    }
    data
}

#[cfg(test)]
#[path = "../../tests/unit/model/normalize.rs"]
mod tests;
