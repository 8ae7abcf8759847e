//! Canvas drag snapping and drag-commit plumbing.

use smallvec::SmallVec;

use crate::{
    animation::ease::Easing,
    foundation::core::{Canvas, KEYFRAME_EPSILON, SNAP_RADIUS, TrackId},
    foundation::error::CeltimeResult,
    history::{command::EditorCommand, stack::CommandHistory},
    model::track::{Channel, EditorData},
};

/// Direction of a snap guide line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuideOrientation {
    /// A vertical line at an x position.
    Vertical,
    /// A horizontal line at a y position.
    Horizontal,
}

/// One alignment guide to draw while a snap is active.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapGuide {
    /// Line direction.
    pub orientation: GuideOrientation,
    /// Line position along the perpendicular axis, in logical units.
    pub position: f64,
}

/// Result of snapping a drag position.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapped {
    /// Possibly adjusted x.
    pub x: f64,
    /// Possibly adjusted y.
    pub y: f64,
    /// Guides that fired, at most one per axis.
    pub guides: SmallVec<[SnapGuide; 2]>,
}

/// Snap a drag position to the canvas center guides.
///
/// Each axis snaps independently when within [`SNAP_RADIUS`] logical units
/// of the canvas center line.
pub fn snap_to_guides(x: f64, y: f64, canvas: Canvas) -> Snapped {
    let mut guides = SmallVec::new();
    let mut snapped_x = x;
    let mut snapped_y = y;

    let center_x = canvas.center_x();
    if (x - center_x).abs() < SNAP_RADIUS {
        snapped_x = center_x;
        guides.push(SnapGuide {
            orientation: GuideOrientation::Vertical,
            position: center_x,
        });
    }

    let center_y = canvas.center_y();
    if (y - center_y).abs() < SNAP_RADIUS {
        snapped_y = center_y;
        guides.push(SnapGuide {
            orientation: GuideOrientation::Horizontal,
            position: center_y,
        });
    }

    Snapped {
        x: snapped_x,
        y: snapped_y,
        guides,
    }
}

/// Tracks an in-flight canvas drag and commits its result through history.
///
/// Live drag positions update transient guide state for the UI overlay; the
/// document is only touched on commit, and only via [`CommandHistory`].
#[derive(Debug, Default)]
pub struct TransformManager {
    guides: SmallVec<[SnapGuide; 2]>,
}

impl TransformManager {
    /// Manager with no active drag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a live drag position: snap it and remember the fired guides.
    pub fn drag(&mut self, x: f64, y: f64, canvas: Canvas) -> Snapped {
        let snapped = snap_to_guides(x, y, canvas);
        self.guides = snapped.guides.clone();
        snapped
    }

    /// Guides fired by the most recent [`Self::drag`] call.
    pub fn active_guides(&self) -> &[SnapGuide] {
        &self.guides
    }

    /// Commit a finished drag as one undoable step.
    ///
    /// The final position is snapped, then turned into x and y keyframe
    /// commands batched together. Keyframe placement follows the
    /// auto-keyframe policy: drags at time 0 edit the base pose, drags over
    /// an existing keyframe overwrite it, and otherwise auto-keyframe decides
    /// between a new keyframe at the playhead and a base-pose edit.
    #[tracing::instrument(skip(self, data, history), fields(track = %track_id))]
    pub fn commit_drag(
        &mut self,
        data: &mut EditorData,
        history: &mut CommandHistory,
        track_id: &TrackId,
        time: f64,
        x: f64,
        y: f64,
        canvas: Canvas,
        auto_keyframe: bool,
    ) -> CeltimeResult<()> {
        let snapped = snap_to_guides(x, y, canvas);
        self.guides.clear();

        let x_time = keyframe_target(data, track_id, Channel::X, time, auto_keyframe);
        let y_time = keyframe_target(data, track_id, Channel::Y, time, auto_keyframe);
        let ease = Easing::Linear;
        let commands = vec![
            EditorCommand::add_keyframe(data, track_id, Channel::X, x_time, snapped.x, ease)?,
            EditorCommand::add_keyframe(data, track_id, Channel::Y, y_time, snapped.y, ease)?,
        ];
        history.execute(EditorCommand::batch("Move track", commands), data);
        Ok(())
    }
}

/// Time the auto-keyframe policy writes a channel edit to: the playhead when
/// it lands on time 0, an existing keyframe, or auto-keyframe is on;
/// otherwise the base keyframe at 0.
fn keyframe_target(
    data: &EditorData,
    track_id: &TrackId,
    channel: Channel,
    time: f64,
    auto_keyframe: bool,
) -> f64 {
    if time == 0.0 || auto_keyframe {
        return time;
    }
    let has_existing = data
        .track(track_id)
        .is_some_and(|t| {
            t.transform
                .channel(channel)
                .iter()
                .any(|k| (k.time - time).abs() < KEYFRAME_EPSILON)
        });
    if has_existing { time } else { 0.0 }
}

#[cfg(test)]
#[path = "../../tests/unit/interact/snap.rs"]
mod tests;
