//! Playback clock, frame sink boundary, and the interpolation worker.

pub mod clock;
pub mod sink;
pub mod worker;
