//! Off-thread frame interpolation with a latest-wins drop-frame policy.

use std::{
    sync::{Arc, Condvar, Mutex},
    thread::JoinHandle,
};

use crate::{
    foundation::core::{BASE_EXTENT, Canvas, TrackId},
    model::track::{Channel, EditorData},
    playback::sink::{FrameState, RenderSink},
};

/// One frame's worth of interpolation work.
#[derive(Clone, Debug)]
pub struct FrameRequest {
    /// Timeline time to interpolate at, in seconds.
    pub time: f64,
    /// Snapshot of the document to interpolate.
    pub data: EditorData,
    /// Canvas dimensions for fallbacks and culling.
    pub canvas: Canvas,
}

/// Interpolate every track at `time`.
///
/// Per track, a speed ramp remaps sampling time relative to the track's first
/// action start; action visibility is still judged against wall timeline
/// time, so ramps retime motion without sliding block activation.
pub fn sweep_frame(time: f64, data: &EditorData, canvas: Canvas) -> Vec<(TrackId, FrameState)> {
    data.tracks
        .iter()
        .map(|track| {
            let speed = track.speed();
            let track_start = track.start_time();
            let effective = if speed != 1.0 {
                track_start + (time - track_start) * speed
            } else {
                time
            };

            let x = track.transform.sample(Channel::X, effective, canvas);
            let y = track.transform.sample(Channel::Y, effective, canvas);
            let scale = track.transform.sample(Channel::Scale, effective, canvas);

            // Scale-aware frustum cull: bigger sprites get a wider margin
            // before they are considered off-canvas.
            let padding = BASE_EXTENT * scale.max(1.0);
            let width = f64::from(canvas.width);
            let height = f64::from(canvas.height);
            let in_viewport = x > -padding
                && x < width + padding
                && y > -padding
                && y < height + padding;

            let mut visible_assets: Vec<_> = track
                .actions
                .iter()
                .filter(|a| in_viewport && !a.hidden && a.active_at(time))
                .collect();
            visible_assets.sort_by(|a, b| {
                a.z_index
                    .cmp(&b.z_index)
                    .then(a.start.total_cmp(&b.start))
                    .then(a.id.as_str().cmp(b.id.as_str()))
            });

            let state = FrameState {
                x,
                y,
                scale_x: scale,
                scale_y: scale,
                rotation: track.transform.sample(Channel::Rotation, effective, canvas),
                opacity: track.transform.sample(Channel::Opacity, effective, canvas) / 100.0,
                anchor: kurbo::Vec2::new(
                    track.transform.sample(Channel::AnchorX, effective, canvas),
                    track.transform.sample(Channel::AnchorY, effective, canvas),
                ),
                in_viewport,
                visible_assets: visible_assets.into_iter().map(|a| a.id.clone()).collect(),
            };
            (track.id.clone(), state)
        })
        .collect()
}

/// Deliver one swept frame straight to the sink.
///
/// Used by the worker thread and by synchronous seeks.
pub fn deliver_frame(time: f64, data: &EditorData, canvas: Canvas, sink: &dyn RenderSink) {
    for (track_id, state) in sweep_frame(time, data, canvas) {
        sink.apply_frame_state(&track_id, &state);
    }
    sink.frame_complete(time);
}

#[derive(Default)]
struct Slot {
    pending: Option<FrameRequest>,
    shutdown: bool,
}

struct Shared {
    slot: Mutex<Slot>,
    wake: Condvar,
}

/// Dedicated interpolation thread fed through a single-request slot.
///
/// The slot holds at most one pending frame: a new request overwrites any
/// request the thread has not picked up yet, so under load intermediate
/// frames are dropped and the newest time always wins. The playback clock
/// never blocks on the worker.
pub struct InterpolationWorker {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for InterpolationWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterpolationWorker")
            .field("running", &self.handle.is_some())
            .finish()
    }
}

impl InterpolationWorker {
    /// Start the worker thread, delivering frames into `sink`.
    #[tracing::instrument(skip(sink))]
    pub fn spawn(sink: Arc<dyn RenderSink>) -> Self {
        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot::default()),
            wake: Condvar::new(),
        });
        let thread_shared = Arc::clone(&shared);
        let handle = std::thread::Builder::new()
            .name("celtime-interp".into())
            .spawn(move || worker_loop(thread_shared, sink))
            .ok();
        if handle.is_none() {
            tracing::error!("failed to spawn interpolation worker thread");
        }
        Self {
            shared,
            handle,
        }
    }

    /// Queue a frame for interpolation, replacing any not-yet-started one.
    pub fn request(&self, request: FrameRequest) {
        let Ok(mut slot) = self.shared.slot.lock() else {
            return;
        };
        if slot.pending.replace(request).is_some() {
            tracing::trace!("dropped stale frame request");
        }
        drop(slot);
        self.shared.wake.notify_one();
    }

    /// Stop the worker thread and wait for it to finish.
    pub fn shutdown(&mut self) {
        if let Ok(mut slot) = self.shared.slot.lock() {
            slot.shutdown = true;
        }
        self.shared.wake.notify_one();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("interpolation worker panicked during shutdown");
            }
        }
    }
}

impl Drop for InterpolationWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(shared: Arc<Shared>, sink: Arc<dyn RenderSink>) {
    loop {
        let request = {
            let Ok(mut slot) = shared.slot.lock() else {
                return;
            };
            loop {
                if slot.shutdown {
                    return;
                }
                if let Some(request) = slot.pending.take() {
                    break request;
                }
                slot = match shared.wake.wait(slot) {
                    Ok(guard) => guard,
                    Err(_) => return,
                };
            }
        };
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            deliver_frame(request.time, &request.data, request.canvas, sink.as_ref());
        }));
        if outcome.is_err() {
            tracing::error!(time = request.time, "frame interpolation panicked, skipping frame");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/worker.rs"]
mod tests;
