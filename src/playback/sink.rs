//! Frame output types and the renderer-facing sink boundary.

use kurbo::{Affine, Vec2};

use crate::foundation::core::{ActionId, TrackId};

/// Fully interpolated per-track state for one instant of timeline time.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameState {
    /// Horizontal position in logical units.
    pub x: f64,
    /// Vertical position in logical units.
    pub y: f64,
    /// Horizontal scale factor.
    pub scale_x: f64,
    /// Vertical scale factor.
    pub scale_y: f64,
    /// Rotation in degrees.
    pub rotation: f64,
    /// Opacity normalized to 0..1 for the renderer.
    pub opacity: f64,
    /// Anchor offset the rotation and scale pivot around.
    pub anchor: Vec2,
    /// Whether the track's bounds intersect the padded viewport.
    pub in_viewport: bool,
    /// Actions active and renderable at this instant, z-order ascending.
    pub visible_assets: Vec<ActionId>,
}

impl FrameState {
    /// Local-to-canvas transform: translate to position, then rotate and
    /// scale around the anchor.
    pub fn to_affine(&self) -> Affine {
        Affine::translate((self.x, self.y))
            * Affine::translate((self.anchor.x, self.anchor.y))
            * Affine::rotate(self.rotation.to_radians())
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
            * Affine::translate((-self.anchor.x, -self.anchor.y))
    }
}

/// Receiver for interpolated frame output.
///
/// Implemented by the renderer host. Methods are called from the
/// interpolation worker thread during playback and synchronously from
/// `seek`, so implementations must be `Send + Sync` and cheap.
pub trait RenderSink: Send + Sync {
    /// Deliver one track's interpolated state for the frame being built.
    fn apply_frame_state(&self, track_id: &TrackId, state: &FrameState);

    /// All tracks for the frame at `time` have been delivered.
    fn frame_complete(&self, time: f64);
}

#[cfg(test)]
#[path = "../../tests/unit/playback/sink.rs"]
mod tests;
