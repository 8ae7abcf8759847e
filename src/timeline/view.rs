//! Timeline row projection.
//!
//! Pure function from document state to the rows a timeline panel draws.
//! No widget state lives here; the projection is deterministic, so the host
//! can re-run it after every document change and diff the result.

use crate::{
    animation::interp::Keyframe,
    foundation::core::TrackId,
    model::track::{ActionBlock, Channel, EditorData, Track},
};

/// Which timeline perspective to project.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimelineView {
    /// One row per track, compound blocks spanning each track's actions.
    MainScene,
    /// One track exploded into per-z-index action lanes.
    CharacterEdit(TrackId),
}

/// Row payload variants.
#[derive(Clone, Debug, PartialEq)]
pub enum RowKind {
    /// A whole track collapsed to its action span.
    Compound {
        /// Earliest action start (0 for empty tracks).
        start: f64,
        /// Latest action end (0 for empty tracks).
        end: f64,
    },
    /// A read-only keyframe strip for one transform channel.
    Channel {
        /// The channel shown.
        channel: Channel,
        /// That channel's keyframes, time ascending.
        keyframes: Vec<Keyframe>,
    },
    /// One packed lane of non-overlapping action blocks.
    Lane {
        /// Stacking order shared by the lane's blocks.
        z_index: i32,
        /// Blocks in the lane, start ascending.
        actions: Vec<ActionBlock>,
    },
}

/// One drawable timeline row.
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineRow {
    /// Stable row id, unique within one projection.
    pub id: String,
    /// Owning track.
    pub track_id: TrackId,
    /// Display label.
    pub label: String,
    /// Row payload.
    pub kind: RowKind,
}

/// Project the document into timeline rows for `view`.
pub fn timeline_rows(data: &EditorData, view: &TimelineView) -> Vec<TimelineRow> {
    match view {
        TimelineView::MainScene => main_scene_rows(data),
        TimelineView::CharacterEdit(track_id) => data
            .track(track_id)
            .map(character_edit_rows)
            .unwrap_or_default(),
    }
}

fn main_scene_rows(data: &EditorData) -> Vec<TimelineRow> {
    let mut rows = Vec::new();
    for track in &data.tracks {
        let (start, end) = track.action_span();
        rows.push(TimelineRow {
            id: format!("{}_compound", track.id),
            track_id: track.id.clone(),
            label: track.name.clone(),
            kind: RowKind::Compound { start, end },
        });
        if track.is_expanded {
            for channel in Channel::PRIMARY {
                rows.push(TimelineRow {
                    id: format!("nested_{}_{}", track.id, channel.name()),
                    track_id: track.id.clone(),
                    label: channel.name().to_owned(),
                    kind: RowKind::Channel {
                        channel,
                        keyframes: track.transform.channel(channel).to_vec(),
                    },
                });
            }
        }
    }
    rows
}

fn character_edit_rows(track: &Track) -> Vec<TimelineRow> {
    let mut sorted: Vec<&ActionBlock> = track.actions.iter().collect();
    sorted.sort_by(|a, b| {
        b.z_index
            .cmp(&a.z_index)
            .then(a.start.total_cmp(&b.start))
            .then(a.id.as_str().cmp(b.id.as_str()))
    });

    // Greedy interval packing per z group: each block lands in the first
    // lane of its z level whose last block ends at or before it starts.
    let mut rows: Vec<TimelineRow> = Vec::new();
    let mut lane_counts_at_z: Vec<(i32, usize)> = Vec::new();
    for action in sorted {
        let lane = rows.iter_mut().find(|row| match &row.kind {
            RowKind::Lane { z_index, actions } => {
                *z_index == action.z_index
                    && actions.last().is_some_and(|last| last.end <= action.start)
            }
            _ => false,
        });
        match lane {
            Some(row) => {
                if let RowKind::Lane { actions, .. } = &mut row.kind {
                    actions.push(action.clone());
                }
            }
            None => {
                let ordinal = match lane_counts_at_z.iter_mut().find(|(z, _)| *z == action.z_index)
                {
                    Some((_, count)) => {
                        *count += 1;
                        *count - 1
                    }
                    None => {
                        lane_counts_at_z.push((action.z_index, 1));
                        0
                    }
                };
                rows.push(TimelineRow {
                    id: format!("{}_z{}_lane{}", track.id, action.z_index, ordinal),
                    track_id: track.id.clone(),
                    label: format!("Layer z{}", action.z_index),
                    kind: RowKind::Lane {
                        z_index: action.z_index,
                        actions: vec![action.clone()],
                    },
                });
            }
        }
    }
    rows
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/view.rs"]
mod tests;
