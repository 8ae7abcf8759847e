//! The studio engine: one explicitly constructed object owning all moving
//! parts.
//!
//! There is no global state; hosts build a [`StudioEngine`] with their canvas
//! and render sink and talk to it directly. Everything that edits the
//! document flows through the command history, everything that moves the
//! playhead flows through the clock, and all frame output leaves through the
//! sink.

use std::sync::Arc;

use crate::{
    foundation::core::{ActionId, Canvas, TrackId},
    foundation::error::CeltimeResult,
    history::{
        command::EditorCommand,
        stack::CommandHistory,
    },
    interact::{
        selection::SelectionManager,
        snap::{Snapped, TransformManager},
    },
    model::{
        document::ProjectDocument,
        track::{EditorData, SeedLayer, Track},
    },
    playback::{
        clock::PlaybackClock,
        sink::RenderSink,
        worker::{FrameRequest, InterpolationWorker, deliver_frame},
    },
    timeline::view::{TimelineRow, TimelineView, timeline_rows},
};

/// A layer of a base character used when spawning a track.
#[derive(Clone, Debug)]
pub struct SpawnLayer {
    /// Asset hash of the layer image.
    pub asset_hash: String,
    /// Stacking order of the layer.
    pub z_index: i32,
}

/// Owns the document, history, playback, worker, and interaction state.
pub struct StudioEngine {
    canvas: Canvas,
    data: EditorData,
    history: CommandHistory,
    clock: PlaybackClock,
    worker: InterpolationWorker,
    sink: Arc<dyn RenderSink>,
    selection: SelectionManager,
    transform: TransformManager,
    auto_keyframe: bool,
    next_entity: u64,
}

impl std::fmt::Debug for StudioEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudioEngine")
            .field("canvas", &self.canvas)
            .field("tracks", &self.data.tracks.len())
            .field("auto_keyframe", &self.auto_keyframe)
            .finish()
    }
}

impl StudioEngine {
    /// Build an engine with an empty document and start its worker thread.
    #[tracing::instrument(skip(sink))]
    pub fn new(canvas: Canvas, sink: Arc<dyn RenderSink>) -> Self {
        let worker = InterpolationWorker::spawn(Arc::clone(&sink));
        Self {
            canvas,
            data: EditorData::empty(),
            history: CommandHistory::new(),
            clock: PlaybackClock::new(),
            worker,
            sink,
            selection: SelectionManager::new(),
            transform: TransformManager::new(),
            auto_keyframe: true,
            next_entity: 1,
        }
    }

    /// The canvas the engine was built for.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Read access to the document.
    pub fn data(&self) -> &EditorData {
        &self.data
    }

    /// Read access to the command history.
    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    /// Mutable access to the command history (for subscriptions).
    pub fn history_mut(&mut self) -> &mut CommandHistory {
        &mut self.history
    }

    /// Read access to the playback clock.
    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    /// Mutable access to the playback clock (loop mode, selection range,
    /// subscriptions).
    pub fn clock_mut(&mut self) -> &mut PlaybackClock {
        &mut self.clock
    }

    /// Read access to the selection.
    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    /// Mutable access to the selection.
    pub fn selection_mut(&mut self) -> &mut SelectionManager {
        &mut self.selection
    }

    /// Whether transform edits away from keyframes create new keyframes.
    pub fn auto_keyframe(&self) -> bool {
        self.auto_keyframe
    }

    /// Flip the auto-keyframe toggle, returning the new state.
    pub fn toggle_auto_keyframe(&mut self) -> bool {
        self.auto_keyframe = !self.auto_keyframe;
        self.auto_keyframe
    }

    /// Apply a command and record it for undo.
    pub fn execute(&mut self, command: EditorCommand) {
        self.history.execute(command, &mut self.data);
    }

    /// Undo the most recent command. Returns false when nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.data)
    }

    /// Redo the most recently undone command. Returns false when empty.
    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.data)
    }

    /// Replace the document from project JSON.
    ///
    /// History is cleared, the selection dropped, and the playhead rewound
    /// to 0 with a synchronous frame delivered to the sink.
    #[tracing::instrument(skip(self, json))]
    pub fn load_document(&mut self, json: &str) -> CeltimeResult<()> {
        let document = ProjectDocument::from_json(json)?;
        self.canvas = document.canvas;
        self.data = document.editor;
        self.history.clear();
        self.selection.clear();
        self.clock.pause();
        self.seek(0.0);
        Ok(())
    }

    /// Serialize the current document as project JSON.
    pub fn save_document(&self, name: &str) -> CeltimeResult<String> {
        ProjectDocument {
            name: name.to_owned(),
            canvas: self.canvas,
            fps: Default::default(),
            editor: self.data.clone(),
        }
        .to_json()
    }

    /// Spawn a character track at the playhead as one undoable step.
    ///
    /// The track is seeded with a base keyframe per channel and one action
    /// block per visible layer, all starting at the current time.
    pub fn spawn_character(
        &mut self,
        name: &str,
        character_id: Option<String>,
        layers: Vec<SpawnLayer>,
    ) -> TrackId {
        let track_id = TrackId(format!("track-{}", self.fresh_entity()));
        let seed_layers: Vec<SeedLayer> = layers
            .into_iter()
            .map(|layer| SeedLayer {
                id: ActionId(format!("action-{}", self.fresh_entity())),
                asset_hash: layer.asset_hash,
                z_index: layer.z_index,
            })
            .collect();
        let track = Track::seeded(
            track_id.clone(),
            name,
            character_id,
            self.clock.current_time(),
            self.canvas,
            seed_layers,
        );
        self.execute(EditorCommand::add_track(track));
        self.selection.select(track_id.clone());
        track_id
    }

    /// Start playback.
    pub fn play(&mut self) {
        self.clock.play();
    }

    /// Stop playback.
    pub fn pause(&mut self) {
        self.clock.pause();
    }

    /// Advance playback by one render-synchronized frame.
    ///
    /// The new time is handed to the interpolation worker (latest-wins) and
    /// clock subscribers are notified afterwards. Never blocks on the worker.
    pub fn tick(&mut self) {
        let Self {
            clock,
            worker,
            data,
            canvas,
            ..
        } = self;
        let data = &*data;
        clock.tick(data, |time| {
            worker.request(FrameRequest {
                time,
                data: data.clone(),
                canvas: *canvas,
            });
        });
    }

    /// Jump the playhead to `time`.
    ///
    /// Frame state for exactly the clamped time is swept synchronously into
    /// the sink before this returns, so export-style callers can read the
    /// sink immediately after.
    pub fn seek(&mut self, time: f64) {
        let Self {
            clock,
            data,
            canvas,
            sink,
            ..
        } = self;
        let data = &*data;
        clock.seek(time, |t| {
            deliver_frame(t, data, *canvas, sink.as_ref());
        });
    }

    /// Process a live canvas drag position, snapping to center guides.
    pub fn drag(&mut self, x: f64, y: f64) -> Snapped {
        self.transform.drag(x, y, self.canvas)
    }

    /// Guides fired by the most recent drag position.
    pub fn active_guides(&self) -> &[crate::interact::snap::SnapGuide] {
        self.transform.active_guides()
    }

    /// Commit a finished canvas drag as one undoable step.
    pub fn commit_drag(&mut self, track_id: &TrackId, x: f64, y: f64) -> CeltimeResult<()> {
        let time = self.clock.current_time();
        self.transform.commit_drag(
            &mut self.data,
            &mut self.history,
            track_id,
            time,
            x,
            y,
            self.canvas,
            self.auto_keyframe,
        )
    }

    /// Project the document into timeline rows.
    pub fn timeline_rows(&self, view: &TimelineView) -> Vec<TimelineRow> {
        timeline_rows(&self.data, view)
    }

    /// Timeline duration derived from the document's content.
    pub fn duration(&self) -> f64 {
        self.data.dynamic_duration()
    }

    /// Stop the interpolation worker and wait for it.
    pub fn shutdown(&mut self) {
        self.worker.shutdown();
    }

    fn fresh_entity(&mut self) -> u64 {
        let id = self.next_entity;
        self.next_entity += 1;
        id
    }
}

#[cfg(test)]
#[path = "../tests/unit/engine.rs"]
mod tests;
