//! Keyframe math: easing curves and the channel interpolator.

pub mod ease;
pub mod interp;
