//! Project persistence: JSON round-trip and the lenient load path.

use crate::{
    foundation::core::{Canvas, Fps},
    foundation::error::{CeltimeError, CeltimeResult},
    model::track::EditorData,
};

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// A persisted project: metadata plus the editable timeline data.
///
/// The engine treats everything except `editor` as opaque metadata.
pub struct ProjectDocument {
    /// Project display name.
    #[serde(default)]
    pub name: String,
    /// Canvas dimensions in logical units.
    #[serde(default)]
    pub canvas: Canvas,
    /// Project frame rate.
    #[serde(default)]
    pub fps: Fps,
    /// Timeline tracks, keyframes and action blocks.
    #[serde(default)]
    pub editor: EditorData,
}

impl ProjectDocument {
    /// Parse a project from JSON text, sanitizing the editor data.
    ///
    /// Strict parse errors are returned; structurally valid documents with
    /// bad numeric content are repaired in place (see
    /// [`EditorData::sanitize`]).
    #[tracing::instrument(skip(json))]
    pub fn from_json(json: &str) -> CeltimeResult<Self> {
        let mut doc: Self =
            serde_json::from_str(json).map_err(|e| CeltimeError::serde(e.to_string()))?;
        doc.editor.sanitize();
        Ok(doc)
    }

    /// Serialize the project to pretty JSON.
    pub fn to_json(&self) -> CeltimeResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| CeltimeError::serde(e.to_string()))
    }
}

impl EditorData {
    /// Parse editor data from a JSON value, sanitizing the result.
    pub fn from_json_value(value: serde_json::Value) -> CeltimeResult<Self> {
        let mut data: Self =
            serde_json::from_value(value).map_err(|e| CeltimeError::serde(e.to_string()))?;
        data.sanitize();
        Ok(data)
    }

    /// Repair a loaded document in place so the engine's invariants hold.
    ///
    /// Non-finite keyframe numbers are dropped, channels are re-sorted by
    /// time, action bounds are clamped at 0 and blocks that end up with
    /// `start >= end` are removed, and non-positive speed ramps are cleared.
    /// Every repair is logged.
    pub fn sanitize(&mut self) {
        for track in &mut self.tracks {
            for channel in crate::model::track::Channel::ALL {
                let keys = track.transform.channel_mut(channel);
                let before = keys.len();
                keys.retain(|k| k.time.is_finite() && k.value.is_finite());
                if keys.len() != before {
                    tracing::warn!(
                        track = %track.id,
                        channel = channel.name(),
                        dropped = before - keys.len(),
                        "dropped non-finite keyframes during load"
                    );
                }
                for key in keys.iter_mut() {
                    if key.time < 0.0 {
                        key.time = 0.0;
                    }
                }
                keys.sort_by(|a, b| a.time.total_cmp(&b.time));
            }

            let before = track.actions.len();
            track.actions.retain_mut(|action| {
                if !action.start.is_finite() || !action.end.is_finite() {
                    return false;
                }
                action.start = action.start.max(0.0);
                action.end = action.end.max(0.0);
                action.start < action.end
            });
            if track.actions.len() != before {
                tracing::warn!(
                    track = %track.id,
                    dropped = before - track.actions.len(),
                    "dropped invalid action blocks during load"
                );
            }

            if let Some(speed) = track.speed_multiplier {
                if !speed.is_finite() || speed <= 0.0 {
                    tracing::warn!(track = %track.id, speed, "clearing invalid speed multiplier");
                    track.speed_multiplier = None;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/document.rs"]
mod tests;
