//! Celtime is the timeline animation engine behind a 2D cutout-character
//! animation studio.
//!
//! It owns everything between the document and the renderer: keyframe
//! interpolation, the track/action data model, undoable editing, the
//! playback clock, and an off-thread interpolation worker that feeds frame
//! state to a host-supplied [`RenderSink`].
//!
//! # Architecture
//!
//! 1. **Model**: [`EditorData`] holds tracks of keyframed transform channels
//!    and action blocks; it is the single canonical document fragment.
//! 2. **Edit**: every mutation is an [`EditorCommand`] executed through
//!    [`CommandHistory`], which makes all editing undoable by construction.
//! 3. **Play**: [`PlaybackClock`] advances the playhead from wall-clock
//!    deltas and [`InterpolationWorker`] sweeps frames on its own thread,
//!    dropping stale frames so the newest time always wins.
//! 4. **Output**: interpolated [`FrameState`] leaves through the
//!    [`RenderSink`] trait; the engine never draws anything itself.
//!
//! Key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **No globals**: hosts construct one [`StudioEngine`] and pass it around.
//! - **Deterministic projections**: interpolation, timeline rows, and the
//!   normalized state are pure functions of the document.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod animation;
pub mod engine;
pub mod foundation;
pub mod history;
pub mod interact;
pub mod model;
pub mod playback;
pub mod timeline;

pub use animation::ease::Easing;
pub use animation::interp::{Keyframe, interpolate};
pub use engine::{SpawnLayer, StudioEngine};
pub use foundation::core::{
    ActionId, BASE_EXTENT, Canvas, Fps, HISTORY_CAP, KEYFRAME_EPSILON, MIN_DURATION, SNAP_RADIUS,
    TAIL_SECONDS, TrackId,
};
pub use foundation::error::{CeltimeError, CeltimeResult};
pub use history::command::{CommandId, EditorCommand};
pub use history::stack::{CommandHistory, HistoryStatus};
pub use interact::selection::SelectionManager;
pub use interact::snap::{
    GuideOrientation, SnapGuide, Snapped, TransformManager, snap_to_guides,
};
pub use model::document::ProjectDocument;
pub use model::normalize::{NormalizedEditorState, denormalize, normalize};
pub use model::track::{
    ActionBlock, BlendMode, Channel, EditorData, SeedLayer, Track, Transform,
};
pub use playback::clock::{ClockStatus, LoopMode, PlaybackClock};
pub use playback::sink::{FrameState, RenderSink};
pub use playback::worker::{FrameRequest, InterpolationWorker, deliver_frame, sweep_frame};
pub use timeline::view::{RowKind, TimelineRow, TimelineView, timeline_rows};
