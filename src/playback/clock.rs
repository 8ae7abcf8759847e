//! Playback time state machine.

use std::time::Instant;

use crate::model::track::EditorData;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// What happens when playback reaches the end of its range.
pub enum LoopMode {
    /// Stop at the end of the timeline.
    #[default]
    Off,
    /// Wrap to 0 at the end of the timeline.
    LoopAll,
    /// Wrap to the in point at the selection's out point.
    LoopSelection,
}

impl LoopMode {
    /// Next mode in the toolbar cycle: off, loop all, loop selection.
    pub fn cycled(self) -> Self {
        match self {
            LoopMode::Off => LoopMode::LoopAll,
            LoopMode::LoopAll => LoopMode::LoopSelection,
            LoopMode::LoopSelection => LoopMode::Off,
        }
    }
}

/// Snapshot of the clock, delivered to subscribers after each change.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClockStatus {
    /// Whether playback is running.
    pub playing: bool,
    /// Whether the user is scrubbing the playhead.
    pub scrubbing: bool,
    /// Current playhead time in seconds.
    pub current_time: f64,
    /// Active loop mode.
    pub loop_mode: LoopMode,
}

type ClockListener = Box<dyn Fn(&ClockStatus) + Send>;

/// Drives the playhead from wall-clock deltas.
///
/// The host calls [`PlaybackClock::tick`] once per render-synchronized frame.
/// Each tick advances time by the elapsed wall time, applies the loop policy
/// against the document's dynamic duration, hands the new time to the frame
/// callback, and only then notifies subscribers. The playhead is transient
/// state and never participates in undo history.
pub struct PlaybackClock {
    playing: bool,
    scrubbing: bool,
    current_time: f64,
    last_tick: Option<Instant>,
    loop_mode: LoopMode,
    in_point: f64,
    out_point: Option<f64>,
    listeners: Vec<(u64, ClockListener)>,
    next_listener: u64,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PlaybackClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackClock")
            .field("playing", &self.playing)
            .field("current_time", &self.current_time)
            .field("loop_mode", &self.loop_mode)
            .finish()
    }
}

impl PlaybackClock {
    /// A stopped clock at time 0.
    pub fn new() -> Self {
        Self {
            playing: false,
            scrubbing: false,
            current_time: 0.0,
            last_tick: None,
            loop_mode: LoopMode::Off,
            in_point: 0.0,
            out_point: None,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// Whether playback is running.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether the playhead is being scrubbed.
    pub fn is_scrubbing(&self) -> bool {
        self.scrubbing
    }

    /// Current playhead time in seconds.
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Active loop mode.
    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    /// Set the loop mode.
    pub fn set_loop_mode(&mut self, mode: LoopMode) {
        if self.loop_mode != mode {
            self.loop_mode = mode;
            self.notify();
        }
    }

    /// Advance the loop mode one step in the toolbar cycle.
    pub fn cycle_loop_mode(&mut self) -> LoopMode {
        self.loop_mode = self.loop_mode.cycled();
        self.notify();
        self.loop_mode
    }

    /// Loop-selection in point in seconds.
    pub fn in_point(&self) -> f64 {
        self.in_point
    }

    /// Loop-selection out point, if one is set.
    pub fn out_point(&self) -> Option<f64> {
        self.out_point
    }

    /// Set the loop-selection range. Non-finite or inverted ranges are
    /// ignored; `out_point = None` falls back to the dynamic duration.
    pub fn set_selection_range(&mut self, in_point: f64, out_point: Option<f64>) {
        if !in_point.is_finite() {
            return;
        }
        let in_point = in_point.max(0.0);
        if let Some(out) = out_point {
            if !out.is_finite() || out <= in_point {
                tracing::warn!(in_point, out, "ignoring inverted selection range");
                return;
            }
        }
        self.in_point = in_point;
        self.out_point = out_point;
    }

    /// Mark the playhead as scrubbed. Only allowed while stopped; returns
    /// whether the flag changed.
    pub fn set_scrubbing(&mut self, scrubbing: bool) -> bool {
        if scrubbing && self.playing {
            return false;
        }
        if self.scrubbing != scrubbing {
            self.scrubbing = scrubbing;
            self.notify();
        }
        true
    }

    /// Start playback. No-op while already playing; always re-anchors the
    /// wall-clock delta origin so the next tick starts from zero elapsed.
    pub fn play(&mut self) {
        self.last_tick = Some(Instant::now());
        if !self.playing {
            self.playing = true;
            self.scrubbing = false;
            self.notify();
        }
    }

    /// Stop playback, discarding any pending wall-clock delta. Idempotent.
    pub fn pause(&mut self) {
        self.last_tick = None;
        if self.playing {
            self.playing = false;
            self.notify();
        }
    }

    /// Advance the playhead by the elapsed wall time.
    ///
    /// `request_frame` receives the post-advance time for asynchronous
    /// interpolation before subscribers are notified. Does nothing while
    /// stopped.
    pub fn tick(&mut self, data: &EditorData, mut request_frame: impl FnMut(f64)) {
        if !self.playing {
            return;
        }
        let now = Instant::now();
        let delta = self
            .last_tick
            .map(|t| now.duration_since(t).as_secs_f64())
            .unwrap_or(0.0);
        self.last_tick = Some(now);

        let duration = data.dynamic_duration();
        let mut time = self.current_time + delta;
        match self.loop_mode {
            LoopMode::Off => {
                if time >= duration {
                    time = duration;
                    self.playing = false;
                    self.last_tick = None;
                }
            }
            LoopMode::LoopAll => {
                if time >= duration {
                    time = 0.0;
                }
            }
            LoopMode::LoopSelection => {
                let out = self.out_point.unwrap_or(duration).min(duration);
                if time >= out {
                    time = self.in_point;
                }
            }
        }
        self.current_time = time;
        request_frame(time);
        self.notify();
    }

    /// Jump the playhead to `time`.
    ///
    /// `deliver` runs synchronously with the clamped time before subscribers
    /// are notified; the engine uses it to sweep a frame straight into the
    /// render sink, so when `seek` returns the sink holds exactly this frame.
    pub fn seek(&mut self, time: f64, deliver: impl FnOnce(f64)) {
        if !time.is_finite() {
            tracing::warn!(time, "ignoring non-finite seek");
            return;
        }
        let time = time.max(0.0);
        self.current_time = time;
        if self.playing {
            self.last_tick = Some(Instant::now());
        }
        deliver(time);
        self.notify();
    }

    /// Current status snapshot.
    pub fn status(&self) -> ClockStatus {
        ClockStatus {
            playing: self.playing,
            scrubbing: self.scrubbing,
            current_time: self.current_time,
            loop_mode: self.loop_mode,
        }
    }

    /// Register a listener called after every clock change. Returns a token
    /// for [`Self::unsubscribe`].
    pub fn subscribe(&mut self, listener: impl Fn(&ClockStatus) + Send + 'static) -> u64 {
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
#[path = "../../tests/unit/playback/clock.rs"]
mod tests;
