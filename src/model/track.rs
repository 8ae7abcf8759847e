//! The canonical document fragment: tracks, transforms, and action blocks.

use crate::{
    animation::ease::Easing,
    animation::interp::{Keyframe, interpolate},
    foundation::core::{ActionId, Canvas, KEYFRAME_EPSILON, MIN_DURATION, TAIL_SECONDS, TrackId},
    foundation::error::{CeltimeError, CeltimeResult},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// One of the seven independently keyframed transform channels.
pub enum Channel {
    /// Horizontal position in logical units.
    X,
    /// Vertical position in logical units.
    Y,
    /// Uniform scale factor.
    Scale,
    /// Rotation in degrees.
    Rotation,
    /// Opacity in percent (0..100).
    Opacity,
    /// Horizontal anchor offset in local space.
    AnchorX,
    /// Vertical anchor offset in local space.
    AnchorY,
}

impl Channel {
    /// All seven channels in canonical order.
    pub const ALL: [Channel; 7] = [
        Channel::X,
        Channel::Y,
        Channel::Scale,
        Channel::Rotation,
        Channel::Opacity,
        Channel::AnchorX,
        Channel::AnchorY,
    ];

    /// The five channels exposed as timeline sub-rows when a track is expanded.
    pub const PRIMARY: [Channel; 5] = [
        Channel::X,
        Channel::Y,
        Channel::Scale,
        Channel::Rotation,
        Channel::Opacity,
    ];

    /// Default value when the channel has no keyframes.
    pub fn fallback(self, canvas: Canvas) -> f64 {
        match self {
            Channel::X => canvas.center_x(),
            Channel::Y => canvas.center_y(),
            Channel::Scale => 1.0,
            Channel::Rotation => 0.0,
            Channel::Opacity => 100.0,
            Channel::AnchorX | Channel::AnchorY => 0.0,
        }
    }

    /// Stable lowercase channel name used in row labels and ids.
    pub fn name(self) -> &'static str {
        match self {
            Channel::X => "x",
            Channel::Y => "y",
            Channel::Scale => "scale",
            Channel::Rotation => "rotation",
            Channel::Opacity => "opacity",
            Channel::AnchorX => "anchorX",
            Channel::AnchorY => "anchorY",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// The keyframed transform of one track: seven independent channels.
///
/// Channels are ordered by time ascending. Editing one channel never perturbs
/// another.
pub struct Transform {
    /// Horizontal position keyframes.
    #[serde(default)]
    pub x: Vec<Keyframe>,
    /// Vertical position keyframes.
    #[serde(default)]
    pub y: Vec<Keyframe>,
    /// Scale keyframes.
    #[serde(default)]
    pub scale: Vec<Keyframe>,
    /// Rotation keyframes.
    #[serde(default)]
    pub rotation: Vec<Keyframe>,
    /// Opacity keyframes (percent).
    #[serde(default)]
    pub opacity: Vec<Keyframe>,
    /// Anchor-x keyframes.
    #[serde(default, rename = "anchorX")]
    pub anchor_x: Vec<Keyframe>,
    /// Anchor-y keyframes.
    #[serde(default, rename = "anchorY")]
    pub anchor_y: Vec<Keyframe>,
}

impl Transform {
    /// Borrow one channel's keyframes.
    pub fn channel(&self, channel: Channel) -> &[Keyframe] {
        match channel {
            Channel::X => &self.x,
            Channel::Y => &self.y,
            Channel::Scale => &self.scale,
            Channel::Rotation => &self.rotation,
            Channel::Opacity => &self.opacity,
            Channel::AnchorX => &self.anchor_x,
            Channel::AnchorY => &self.anchor_y,
        }
    }

    /// Mutably borrow one channel's keyframes.
    pub fn channel_mut(&mut self, channel: Channel) -> &mut Vec<Keyframe> {
        match channel {
            Channel::X => &mut self.x,
            Channel::Y => &mut self.y,
            Channel::Scale => &mut self.scale,
            Channel::Rotation => &mut self.rotation,
            Channel::Opacity => &mut self.opacity,
            Channel::AnchorX => &mut self.anchor_x,
            Channel::AnchorY => &mut self.anchor_y,
        }
    }

    /// Interpolate one channel at `time`, falling back to the channel default.
    pub fn sample(&self, channel: Channel, time: f64, canvas: Canvas) -> f64 {
        interpolate(self.channel(channel), time, channel.fallback(canvas))
    }

    /// Latest keyframe time across all channels, 0 when empty.
    pub fn last_key_time(&self) -> f64 {
        let mut max = 0.0f64;
        for channel in Channel::ALL {
            for key in self.channel(channel) {
                if key.time > max {
                    max = key.time;
                }
            }
        }
        max
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
/// Blend mode used when compositing a track's layers.
pub enum BlendMode {
    /// Standard source-over.
    #[default]
    Normal,
    /// Multiply blend.
    Multiply,
    /// Screen blend.
    Screen,
    /// Overlay blend.
    Overlay,
    /// Additive blend.
    Add,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// One visible layer-image instance, active during `[start, end]`.
pub struct ActionBlock {
    /// Action identifier, unique within the document.
    pub id: ActionId,
    /// Content hash referencing an externally resolved image asset.
    pub asset_hash: String,
    /// Activation start in seconds.
    pub start: f64,
    /// Activation end in seconds, must be > `start`.
    pub end: f64,
    /// Stacking order within the track (higher renders in front).
    pub z_index: i32,
    /// Temporarily hidden in the scene.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
    /// Locked against interactive edits.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub locked: bool,
}

impl ActionBlock {
    /// Validate the `start < end` invariant and finiteness.
    pub fn validate(&self) -> CeltimeResult<()> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(CeltimeError::validation(format!(
                "action '{}' has non-finite bounds",
                self.id
            )));
        }
        if self.start >= self.end {
            return Err(CeltimeError::validation(format!(
                "action '{}' must have start < end",
                self.id
            )));
        }
        Ok(())
    }

    /// Whether the block is active (inclusive) at `time`.
    pub fn active_at(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }

    /// Block length in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// One layer used when seeding a freshly spawned track.
#[derive(Clone, Debug)]
pub struct SeedLayer {
    /// Id for the seeded action block.
    pub id: ActionId,
    /// Asset hash of the layer image.
    pub asset_hash: String,
    /// Stacking order of the layer.
    pub z_index: i32,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// One animated character instance on the canvas.
pub struct Track {
    /// Track identifier, unique within the document.
    pub id: TrackId,
    /// Display name.
    pub name: String,
    /// Reference to the external base-character template, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_id: Option<String>,
    /// Keyframed transform channels.
    #[serde(default)]
    pub transform: Transform,
    /// Compositing blend mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blend_mode: Option<BlendMode>,
    /// Playback speed ramp relative to the track's own first action start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_multiplier: Option<f64>,
    /// Visible layer instances owned by this track.
    #[serde(default)]
    pub actions: Vec<ActionBlock>,
    /// Whether the timeline shows per-channel sub-rows for this track.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_expanded: bool,
}

impl Track {
    /// Build a track seeded the way spawning a character does: one keyframe
    /// per channel at `time` (channel defaults) and one action block per
    /// visible base layer, active from `time` for the default tail length.
    pub fn seeded(
        id: TrackId,
        name: impl Into<String>,
        character_id: Option<String>,
        time: f64,
        canvas: Canvas,
        layers: impl IntoIterator<Item = SeedLayer>,
    ) -> Self {
        let time = time.max(0.0);
        let mut transform = Transform::default();
        for channel in Channel::ALL {
            transform.channel_mut(channel).push(Keyframe::new(
                time,
                channel.fallback(canvas),
                Easing::Linear,
            ));
        }
        let actions = layers
            .into_iter()
            .map(|layer| ActionBlock {
                id: layer.id,
                asset_hash: layer.asset_hash,
                start: time,
                end: time + TAIL_SECONDS,
                z_index: layer.z_index,
                hidden: false,
                locked: false,
            })
            .collect();
        Self {
            id,
            name: name.into(),
            character_id,
            transform,
            blend_mode: None,
            speed_multiplier: None,
            actions,
            is_expanded: false,
        }
    }

    /// Look up one action block by id.
    pub fn action(&self, id: &ActionId) -> Option<&ActionBlock> {
        self.actions.iter().find(|a| &a.id == id)
    }

    /// Mutably look up one action block by id.
    pub fn action_mut(&mut self, id: &ActionId) -> Option<&mut ActionBlock> {
        self.actions.iter_mut().find(|a| &a.id == id)
    }

    /// Earliest action start, 0 when the track has no actions.
    ///
    /// Speed ramps remap time relative to this instant, not global zero.
    pub fn start_time(&self) -> f64 {
        let min = self
            .actions
            .iter()
            .map(|a| a.start)
            .fold(f64::INFINITY, f64::min);
        if min.is_finite() { min } else { 0.0 }
    }

    /// Span `[min start, max end]` over all actions, `(0, 0)` when empty.
    pub fn action_span(&self) -> (f64, f64) {
        if self.actions.is_empty() {
            return (0.0, 0.0);
        }
        let start = self
            .actions
            .iter()
            .map(|a| a.start)
            .fold(f64::INFINITY, f64::min);
        let end = self
            .actions
            .iter()
            .map(|a| a.end)
            .fold(f64::NEG_INFINITY, f64::max);
        (start, end)
    }

    /// The acting speed multiplier (1.0 when unset).
    pub fn speed(&self) -> f64 {
        self.speed_multiplier.unwrap_or(1.0)
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
/// The canonical document fragment: ordered list of character tracks.
///
/// All edits flow through the mutation surface here (usually via
/// [`crate::history::command::EditorCommand`]); UI code never assigns fields
/// directly. Serializes as a plain JSON array of tracks.
pub struct EditorData {
    /// Tracks in display order.
    pub tracks: Vec<Track>,
}

impl EditorData {
    /// Document with no tracks.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Look up a track by id.
    pub fn track(&self, id: &TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| &t.id == id)
    }

    /// Mutably look up a track by id.
    pub fn track_mut(&mut self, id: &TrackId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| &t.id == id)
    }

    /// Position of a track in display order.
    pub fn track_index(&self, id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| &t.id == id)
    }

    /// Append a track. Ignored if the id already exists.
    pub fn add_track(&mut self, track: Track) {
        if self.track(&track.id).is_some() {
            tracing::warn!(track = %track.id, "ignoring add of duplicate track id");
            return;
        }
        self.tracks.push(track);
    }

    /// Insert a track at `index` (clamped). Ignored if the id already exists.
    pub fn insert_track(&mut self, index: usize, track: Track) {
        if self.track(&track.id).is_some() {
            return;
        }
        let index = index.min(self.tracks.len());
        self.tracks.insert(index, track);
    }

    /// Remove a track and all of its actions (cascade).
    pub fn delete_track(&mut self, id: &TrackId) -> Option<Track> {
        let index = self.track_index(id)?;
        Some(self.tracks.remove(index))
    }

    /// Add an action block to a track. Returns false if the track is missing
    /// or the block is invalid.
    pub fn add_action(&mut self, track_id: &TrackId, action: ActionBlock) -> bool {
        if action.validate().is_err() {
            tracing::warn!(action = %action.id, "rejecting invalid action block");
            return false;
        }
        match self.track_mut(track_id) {
            Some(track) => {
                if track.action(&action.id).is_some() {
                    return false;
                }
                track.actions.push(action);
                true
            }
            None => false,
        }
    }

    /// Remove an action block by id, returning it with its owning track.
    pub fn remove_action(&mut self, action_id: &ActionId) -> Option<(TrackId, ActionBlock)> {
        for track in &mut self.tracks {
            if let Some(pos) = track.actions.iter().position(|a| &a.id == action_id) {
                let removed = track.actions.remove(pos);
                return Some((track.id.clone(), removed));
            }
        }
        None
    }

    /// Keep only the actions that satisfy `predicate`, across all tracks.
    pub fn retain_actions(&mut self, mut predicate: impl FnMut(&TrackId, &ActionBlock) -> bool) {
        for track in &mut self.tracks {
            let id = track.id.clone();
            track.actions.retain(|a| predicate(&id, a));
        }
    }

    /// Set or overwrite a keyframe on one channel.
    ///
    /// A keyframe already within [`KEYFRAME_EPSILON`] of `time` is overwritten
    /// in place (later write wins on value; its easing is preserved unless an
    /// explicit one is given). Otherwise a new keyframe is inserted and the
    /// channel re-sorted. NaN values are rejected, leaving state unchanged.
    pub fn set_or_add_keyframe(
        &mut self,
        track_id: &TrackId,
        channel: Channel,
        time: f64,
        value: f64,
        easing: Option<Easing>,
    ) -> bool {
        if value.is_nan() || !time.is_finite() {
            tracing::warn!(track = %track_id, channel = channel.name(), "rejecting NaN keyframe");
            return false;
        }
        let time = time.max(0.0);
        let Some(track) = self.track_mut(track_id) else {
            return false;
        };
        let keys = track.transform.channel_mut(channel);
        if let Some(existing) = keys
            .iter_mut()
            .find(|k| (k.time - time).abs() < KEYFRAME_EPSILON)
        {
            existing.value = value;
            if let Some(easing) = easing {
                existing.easing = easing;
            }
        } else {
            keys.push(Keyframe::new(time, value, easing.unwrap_or_default()));
            keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        }
        true
    }

    /// Remove any keyframe within [`KEYFRAME_EPSILON`] of `time` on a channel.
    pub fn remove_keyframe_near(
        &mut self,
        track_id: &TrackId,
        channel: Channel,
        time: f64,
    ) -> Option<Keyframe> {
        let track = self.track_mut(track_id)?;
        let keys = track.transform.channel_mut(channel);
        let pos = keys
            .iter()
            .position(|k| (k.time - time).abs() < KEYFRAME_EPSILON)?;
        Some(keys.remove(pos))
    }

    /// Find the keyframe within [`KEYFRAME_EPSILON`] of `time` on a channel.
    pub fn keyframe_near(
        &self,
        track_id: &TrackId,
        channel: Channel,
        time: f64,
    ) -> Option<Keyframe> {
        self.track(track_id)?
            .transform
            .channel(channel)
            .iter()
            .find(|k| (k.time - time).abs() < KEYFRAME_EPSILON)
            .copied()
    }

    /// Apply an interactive transform edit under the auto-keyframe policy.
    ///
    /// - at time 0 the base keyframe is overwritten (created if missing)
    /// - at time > 0 an existing keyframe within tolerance is overwritten
    /// - otherwise, with auto-keyframe on a new keyframe is created at `time`;
    ///   with it off the base (time 0) keyframe is overwritten instead, so the
    ///   edit adjusts the baseline rather than adding history
    pub fn apply_transform_edit(
        &mut self,
        track_id: &TrackId,
        channel: Channel,
        time: f64,
        value: f64,
        auto_keyframe: bool,
    ) -> bool {
        if value.is_nan() || !time.is_finite() {
            return false;
        }
        let time = time.max(0.0);
        let Some(track) = self.track_mut(track_id) else {
            return false;
        };
        let keys = track.transform.channel_mut(channel);

        let target = if time == 0.0 {
            BaseOrAt::Base
        } else if keys
            .iter()
            .any(|k| (k.time - time).abs() < KEYFRAME_EPSILON)
        {
            BaseOrAt::At(time)
        } else if auto_keyframe {
            BaseOrAt::At(time)
        } else {
            BaseOrAt::Base
        };

        match target {
            BaseOrAt::Base => {
                if let Some(base) = keys.iter_mut().find(|k| k.time == 0.0) {
                    base.value = value;
                } else {
                    keys.push(Keyframe::new(0.0, value, Easing::Linear));
                }
            }
            BaseOrAt::At(t) => {
                if let Some(existing) = keys
                    .iter_mut()
                    .find(|k| (k.time - t).abs() < KEYFRAME_EPSILON)
                {
                    existing.value = value;
                } else {
                    keys.push(Keyframe::new(t, value, Easing::Linear));
                }
            }
        }
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        true
    }

    /// Razor-split an action block at `at`, keeping the left half under the
    /// original id. No-op unless `start < at < end`.
    pub fn split_action(&mut self, action_id: &ActionId, at: f64, right_id: ActionId) -> bool {
        for track in &mut self.tracks {
            if let Some(action) = track.action_mut(action_id) {
                if !(action.start < at && at < action.end) {
                    return false;
                }
                let mut right = action.clone();
                action.end = at;
                right.id = right_id;
                right.start = at;
                track.actions.push(right);
                return true;
            }
        }
        false
    }

    /// Move an action block by `delta` seconds, preserving its duration and
    /// clamping the start at 0.
    pub fn shift_action(&mut self, action_id: &ActionId, delta: f64) -> bool {
        if !delta.is_finite() {
            return false;
        }
        for track in &mut self.tracks {
            if let Some(action) = track.action_mut(action_id) {
                let duration = action.duration();
                let start = (action.start + delta).max(0.0);
                action.start = start;
                action.end = start + duration;
                return true;
            }
        }
        false
    }

    /// Toggle the per-channel sub-row expansion flag of a track.
    pub fn toggle_track_expanded(&mut self, track_id: &TrackId) {
        if let Some(track) = self.track_mut(track_id) {
            track.is_expanded = !track.is_expanded;
        }
    }

    /// Set a track's speed ramp. Rejects non-finite or non-positive values.
    pub fn set_speed_multiplier(&mut self, track_id: &TrackId, speed: f64) -> CeltimeResult<()> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(CeltimeError::validation(
                "speed multiplier must be finite and > 0",
            ));
        }
        let track = self
            .track_mut(track_id)
            .ok_or_else(|| CeltimeError::validation(format!("unknown track '{track_id}'")))?;
        track.speed_multiplier = Some(speed);
        Ok(())
    }

    /// Set a track's blend mode.
    pub fn set_blend_mode(&mut self, track_id: &TrackId, blend_mode: BlendMode) {
        if let Some(track) = self.track_mut(track_id) {
            track.blend_mode = Some(blend_mode);
        }
    }

    /// Timeline duration derived from content: the latest action end or
    /// keyframe time plus a fixed tail of empty runway, floored at the
    /// minimum duration.
    pub fn dynamic_duration(&self) -> f64 {
        let mut max_time = 0.0f64;
        for track in &self.tracks {
            for action in &track.actions {
                if action.end > max_time {
                    max_time = action.end;
                }
            }
            let last = track.transform.last_key_time();
            if last > max_time {
                max_time = last;
            }
        }
        MIN_DURATION.max(max_time + TAIL_SECONDS)
    }
}

enum BaseOrAt {
    Base,
    At(f64),
}

#[cfg(test)]
#[path = "../../tests/unit/model/track.rs"]
mod tests;
