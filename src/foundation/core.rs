//! Core value types and the engine's named constants.

use crate::foundation::error::{CeltimeError, CeltimeResult};

pub use kurbo::{Affine, Point, Vec2};

/// Edit tolerance in seconds: two keyframes closer than this on the same
/// channel are treated as the same keyframe for editing purposes.
/// Interpolation math is unaffected and uses exact ordering.
pub const KEYFRAME_EPSILON: f64 = 0.05;

/// Snap radius in logical units for center-guide snapping during drags.
pub const SNAP_RADIUS: f64 = 15.0;

/// Base half-extent in logical units used by the scale-aware viewport cull.
pub const BASE_EXTENT: f64 = 600.0;

/// Maximum number of commands retained on the undo stack.
pub const HISTORY_CAP: usize = 200;

/// Empty runway shown past the last authored content, in seconds.
pub const TAIL_SECONDS: f64 = 5.0;

/// Minimum timeline duration in seconds.
pub const MIN_DURATION: f64 = 10.0;

#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
/// Stable identifier of a character track.
pub struct TrackId(pub String);

impl TrackId {
    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TrackId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
/// Stable identifier of an action block within a track.
pub struct ActionId(pub String);

impl ActionId {
    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Logical canvas dimensions the scene is authored against.
pub struct Canvas {
    /// Logical width in pixels.
    pub width: u32,
    /// Logical height in pixels.
    pub height: u32,
}

impl Canvas {
    /// The default authoring canvas (1920x1080).
    pub fn logical() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }

    /// Horizontal center in logical units.
    pub fn center_x(self) -> f64 {
        f64::from(self.width) / 2.0
    }

    /// Vertical center in logical units.
    pub fn center_y(self) -> f64 {
        f64::from(self.height) / 2.0
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::logical()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Rational frame rate used by export sampling.
pub struct Fps {
    /// Numerator, must be > 0.
    pub num: u32,
    /// Denominator, must be > 0.
    pub den: u32,
}

impl Fps {
    /// Validated constructor.
    pub fn new(num: u32, den: u32) -> CeltimeResult<Self> {
        if num == 0 {
            return Err(CeltimeError::validation("Fps num must be > 0"));
        }
        if den == 0 {
            return Err(CeltimeError::validation("Fps den must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Frame rate as a float.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Timestamp of frame `i` in seconds; export samples `i / fps`.
    pub fn frame_to_secs(self, frame: u64) -> f64 {
        (frame as f64) * f64::from(self.den) / f64::from(self.num)
    }

    /// Nearest frame index at or below `secs`.
    pub fn secs_to_frame_floor(self, secs: f64) -> u64 {
        (secs * self.as_f64()).floor().max(0.0) as u64
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
