//! Undoable editor commands.
//!
//! Every command captures absolute before/after payloads at construction, so
//! `apply` and `revert` are pure replays that need no closures over live
//! state. Factories validate input up front and return errors the UI can
//! surface; once constructed, `apply`/`revert` never fail. When a command's
//! target entity has since disappeared the replay degrades to a logged no-op.

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::{
    animation::ease::Easing,
    animation::interp::Keyframe,
    foundation::core::{ActionId, TrackId},
    foundation::error::{CeltimeError, CeltimeResult},
    model::track::{ActionBlock, BlendMode, Channel, EditorData, Track},
};

static NEXT_COMMAND_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique command identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CommandId(u64);

impl CommandId {
    fn next() -> Self {
        Self(NEXT_COMMAND_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cmd-{}", self.0)
    }
}

#[derive(Clone, Debug)]
enum CommandKind {
    AddTrack {
        track: Track,
    },
    DeleteTrack {
        index: usize,
        track: Track,
    },
    AddAction {
        track_id: TrackId,
        action: ActionBlock,
    },
    RemoveActions {
        removed: Vec<(TrackId, ActionBlock)>,
    },
    MoveAction {
        action_id: ActionId,
        before: (f64, f64),
        after: (f64, f64),
    },
    UpdateAction {
        before: ActionBlock,
        after: ActionBlock,
    },
    AddKeyframe {
        track_id: TrackId,
        channel: Channel,
        key: Keyframe,
        replaced: Option<Keyframe>,
    },
    RemoveKeyframe {
        track_id: TrackId,
        channel: Channel,
        key: Keyframe,
    },
    UpdateKeyframe {
        track_id: TrackId,
        channel: Channel,
        before: Keyframe,
        after: Keyframe,
    },
    SetSpeedMultiplier {
        track_id: TrackId,
        before: Option<f64>,
        after: f64,
    },
    SetBlendMode {
        track_id: TrackId,
        before: Option<BlendMode>,
        after: BlendMode,
    },
    Batch {
        commands: Vec<EditorCommand>,
    },
}

/// One undoable edit against [`EditorData`].
#[derive(Clone, Debug)]
pub struct EditorCommand {
    id: CommandId,
    description: String,
    kind: CommandKind,
}

impl EditorCommand {
    fn new(description: impl Into<String>, kind: CommandKind) -> Self {
        Self {
            id: CommandId::next(),
            description: description.into(),
            kind,
        }
    }

    /// Unique identifier of this command instance.
    pub fn id(&self) -> CommandId {
        self.id
    }

    /// Human-readable description, shown on the undo/redo menu entries.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Add a new track.
    pub fn add_track(track: Track) -> Self {
        let description = format!("Add track '{}'", track.name);
        Self::new(description, CommandKind::AddTrack { track })
    }

    /// Delete a track and everything on it.
    pub fn delete_track(data: &EditorData, id: &TrackId) -> CeltimeResult<Self> {
        let index = data
            .track_index(id)
            .ok_or_else(|| CeltimeError::history(format!("unknown track '{id}'")))?;
        let track = data.tracks[index].clone();
        let description = format!("Delete track '{}'", track.name);
        Ok(Self::new(
            description,
            CommandKind::DeleteTrack { index, track },
        ))
    }

    /// Add an action block to a track.
    pub fn add_action(
        data: &EditorData,
        track_id: &TrackId,
        action: ActionBlock,
    ) -> CeltimeResult<Self> {
        action.validate().map_err(|e| CeltimeError::history(e.to_string()))?;
        if data.track(track_id).is_none() {
            return Err(CeltimeError::history(format!("unknown track '{track_id}'")));
        }
        Ok(Self::new(
            "Add action",
            CommandKind::AddAction {
                track_id: track_id.clone(),
                action,
            },
        ))
    }

    /// Remove one or more action blocks as a single undoable step.
    pub fn remove_actions(data: &EditorData, ids: &[ActionId]) -> CeltimeResult<Self> {
        let mut removed = Vec::with_capacity(ids.len());
        for id in ids {
            let (track_id, action) = data
                .tracks
                .iter()
                .find_map(|t| t.action(id).map(|a| (t.id.clone(), a.clone())))
                .ok_or_else(|| CeltimeError::history(format!("unknown action '{id}'")))?;
            removed.push((track_id, action));
        }
        let description = if removed.len() == 1 {
            "Remove action".to_owned()
        } else {
            format!("Remove {} actions", removed.len())
        };
        Ok(Self::new(description, CommandKind::RemoveActions { removed }))
    }

    /// Move an action block to a new start time, keeping its duration.
    pub fn move_action(
        data: &EditorData,
        action_id: &ActionId,
        new_start: f64,
    ) -> CeltimeResult<Self> {
        if !new_start.is_finite() {
            return Err(CeltimeError::history("action start must be finite"));
        }
        let action = data
            .tracks
            .iter()
            .find_map(|t| t.action(action_id))
            .ok_or_else(|| CeltimeError::history(format!("unknown action '{action_id}'")))?;
        let start = new_start.max(0.0);
        Ok(Self::new(
            "Move action",
            CommandKind::MoveAction {
                action_id: action_id.clone(),
                before: (action.start, action.end),
                after: (start, start + action.duration()),
            },
        ))
    }

    /// Replace an action block's fields wholesale (same id).
    pub fn update_action(data: &EditorData, after: ActionBlock) -> CeltimeResult<Self> {
        after.validate().map_err(|e| CeltimeError::history(e.to_string()))?;
        let before = data
            .tracks
            .iter()
            .find_map(|t| t.action(&after.id))
            .cloned()
            .ok_or_else(|| CeltimeError::history(format!("unknown action '{}'", after.id)))?;
        Ok(Self::new(
            "Update action",
            CommandKind::UpdateAction { before, after },
        ))
    }

    /// Set or overwrite a keyframe on one channel.
    pub fn add_keyframe(
        data: &EditorData,
        track_id: &TrackId,
        channel: Channel,
        time: f64,
        value: f64,
        easing: Easing,
    ) -> CeltimeResult<Self> {
        if value.is_nan() || !time.is_finite() {
            return Err(CeltimeError::history("keyframe time and value must be finite"));
        }
        if data.track(track_id).is_none() {
            return Err(CeltimeError::history(format!("unknown track '{track_id}'")));
        }
        let time = time.max(0.0);
        let replaced = data.keyframe_near(track_id, channel, time);
        Ok(Self::new(
            format!("Set {} keyframe", channel.name()),
            CommandKind::AddKeyframe {
                track_id: track_id.clone(),
                channel,
                key: Keyframe::new(time, value, easing),
                replaced,
            },
        ))
    }

    /// Remove the keyframe nearest `time` on one channel.
    pub fn remove_keyframe(
        data: &EditorData,
        track_id: &TrackId,
        channel: Channel,
        time: f64,
    ) -> CeltimeResult<Self> {
        let key = data
            .keyframe_near(track_id, channel, time)
            .ok_or_else(|| CeltimeError::history("no keyframe at that time"))?;
        Ok(Self::new(
            format!("Remove {} keyframe", channel.name()),
            CommandKind::RemoveKeyframe {
                track_id: track_id.clone(),
                channel,
                key,
            },
        ))
    }

    /// Retime or revalue an existing keyframe.
    pub fn update_keyframe(
        data: &EditorData,
        track_id: &TrackId,
        channel: Channel,
        old_time: f64,
        after: Keyframe,
    ) -> CeltimeResult<Self> {
        if after.value.is_nan() || !after.time.is_finite() {
            return Err(CeltimeError::history("keyframe time and value must be finite"));
        }
        let before = data
            .keyframe_near(track_id, channel, old_time)
            .ok_or_else(|| CeltimeError::history("no keyframe at that time"))?;
        Ok(Self::new(
            format!("Update {} keyframe", channel.name()),
            CommandKind::UpdateKeyframe {
                track_id: track_id.clone(),
                channel,
                before,
                after,
            },
        ))
    }

    /// Change a track's speed ramp.
    pub fn set_speed_multiplier(
        data: &EditorData,
        track_id: &TrackId,
        speed: f64,
    ) -> CeltimeResult<Self> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(CeltimeError::history("speed multiplier must be finite and > 0"));
        }
        let track = data
            .track(track_id)
            .ok_or_else(|| CeltimeError::history(format!("unknown track '{track_id}'")))?;
        Ok(Self::new(
            format!("Set speed \u{00d7}{speed:.2}"),
            CommandKind::SetSpeedMultiplier {
                track_id: track_id.clone(),
                before: track.speed_multiplier,
                after: speed,
            },
        ))
    }

    /// Change a track's blend mode.
    pub fn set_blend_mode(
        data: &EditorData,
        track_id: &TrackId,
        blend_mode: BlendMode,
    ) -> CeltimeResult<Self> {
        let track = data
            .track(track_id)
            .ok_or_else(|| CeltimeError::history(format!("unknown track '{track_id}'")))?;
        Ok(Self::new(
            "Set blend mode",
            CommandKind::SetBlendMode {
                track_id: track_id.clone(),
                before: track.blend_mode,
                after: blend_mode,
            },
        ))
    }

    /// Group several commands into one indivisible undo step.
    ///
    /// Applied in order, reverted in reverse order.
    pub fn batch(description: impl Into<String>, commands: Vec<EditorCommand>) -> Self {
        Self::new(description, CommandKind::Batch { commands })
    }

    /// Apply the command's after-state to `data`.
    pub fn apply(&self, data: &mut EditorData) {
        match &self.kind {
            CommandKind::AddTrack { track } => data.add_track(track.clone()),
            CommandKind::DeleteTrack { track, .. } => {
                if data.delete_track(&track.id).is_none() {
                    self.missing("track", &track.id.0);
                }
            }
            CommandKind::AddAction { track_id, action } => {
                if !data.add_action(track_id, action.clone()) {
                    self.missing("track", &track_id.0);
                }
            }
            CommandKind::RemoveActions { removed } => {
                for (_, action) in removed {
                    if data.remove_action(&action.id).is_none() {
                        self.missing("action", &action.id.0);
                    }
                }
            }
            CommandKind::MoveAction {
                action_id, after, ..
            } => self.place_action(data, action_id, *after),
            CommandKind::UpdateAction { after, .. } => {
                self.replace_action(data, after);
            }
            CommandKind::AddKeyframe {
                track_id,
                channel,
                key,
                ..
            } => {
                let easing = Some(key.easing);
                if !data.set_or_add_keyframe(track_id, *channel, key.time, key.value, easing) {
                    self.missing("track", &track_id.0);
                }
            }
            CommandKind::RemoveKeyframe {
                track_id,
                channel,
                key,
            } => {
                if data.remove_keyframe_near(track_id, *channel, key.time).is_none() {
                    self.missing("keyframe", &track_id.0);
                }
            }
            CommandKind::UpdateKeyframe {
                track_id,
                channel,
                before,
                after,
            } => {
                if data.remove_keyframe_near(track_id, *channel, before.time).is_none() {
                    self.missing("keyframe", &track_id.0);
                }
                let easing = Some(after.easing);
                data.set_or_add_keyframe(track_id, *channel, after.time, after.value, easing);
            }
            CommandKind::SetSpeedMultiplier {
                track_id, after, ..
            } => {
                if data.set_speed_multiplier(track_id, *after).is_err() {
                    self.missing("track", &track_id.0);
                }
            }
            CommandKind::SetBlendMode {
                track_id, after, ..
            } => {
                if data.track(track_id).is_none() {
                    self.missing("track", &track_id.0);
                }
                data.set_blend_mode(track_id, *after);
            }
            CommandKind::Batch { commands } => {
                for command in commands {
                    command.apply(data);
                }
            }
        }
    }

    /// Restore the command's before-state in `data`.
    pub fn revert(&self, data: &mut EditorData) {
        match &self.kind {
            CommandKind::AddTrack { track } => {
                if data.delete_track(&track.id).is_none() {
                    self.missing("track", &track.id.0);
                }
            }
            CommandKind::DeleteTrack { index, track } => {
                data.insert_track(*index, track.clone());
            }
            CommandKind::AddAction { action, .. } => {
                if data.remove_action(&action.id).is_none() {
                    self.missing("action", &action.id.0);
                }
            }
            CommandKind::RemoveActions { removed } => {
                for (track_id, action) in removed.iter().rev() {
                    if !data.add_action(track_id, action.clone()) {
                        self.missing("track", &track_id.0);
                    }
                }
            }
            CommandKind::MoveAction {
                action_id, before, ..
            } => self.place_action(data, action_id, *before),
            CommandKind::UpdateAction { before, .. } => {
                self.replace_action(data, before);
            }
            CommandKind::AddKeyframe {
                track_id,
                channel,
                key,
                replaced,
            } => match replaced {
                Some(prev) => {
                    let easing = Some(prev.easing);
                    data.set_or_add_keyframe(track_id, *channel, prev.time, prev.value, easing);
                }
                None => {
                    if data.remove_keyframe_near(track_id, *channel, key.time).is_none() {
                        self.missing("keyframe", &track_id.0);
                    }
                }
            },
            CommandKind::RemoveKeyframe {
                track_id,
                channel,
                key,
            } => {
                let easing = Some(key.easing);
                if !data.set_or_add_keyframe(track_id, *channel, key.time, key.value, easing) {
                    self.missing("track", &track_id.0);
                }
            }
            CommandKind::UpdateKeyframe {
                track_id,
                channel,
                before,
                after,
            } => {
                if data.remove_keyframe_near(track_id, *channel, after.time).is_none() {
                    self.missing("keyframe", &track_id.0);
                }
                let easing = Some(before.easing);
                data.set_or_add_keyframe(track_id, *channel, before.time, before.value, easing);
            }
            CommandKind::SetSpeedMultiplier {
                track_id, before, ..
            } => match (data.track_mut(track_id), before) {
                (Some(track), before) => track.speed_multiplier = *before,
                (None, _) => self.missing("track", &track_id.0),
            },
            CommandKind::SetBlendMode {
                track_id, before, ..
            } => match data.track_mut(track_id) {
                Some(track) => track.blend_mode = *before,
                None => self.missing("track", &track_id.0),
            },
            CommandKind::Batch { commands } => {
                for command in commands.iter().rev() {
                    command.revert(data);
                }
            }
        }
    }

    fn place_action(&self, data: &mut EditorData, action_id: &ActionId, bounds: (f64, f64)) {
        let found = data
            .tracks
            .iter_mut()
            .find_map(|t| t.action_mut(action_id));
        match found {
            Some(action) => {
                action.start = bounds.0;
                action.end = bounds.1;
            }
            None => self.missing("action", &action_id.0),
        }
    }

    fn replace_action(&self, data: &mut EditorData, state: &ActionBlock) {
        let found = data
            .tracks
            .iter_mut()
            .find_map(|t| t.action_mut(&state.id));
        match found {
            Some(action) => *action = state.clone(),
            None => self.missing("action", &state.id.0),
        }
    }

    fn missing(&self, kind: &str, id: &str) {
        tracing::warn!(command = %self.id, kind, id, "command target missing, skipping");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/history/command.rs"]
mod tests;
