//! The keyframe interpolator at the heart of the engine.

use crate::animation::ease::Easing;

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A single time-stamped value on one channel.
pub struct Keyframe {
    /// Timestamp in seconds, >= 0.
    pub time: f64,
    /// Channel value at `time`.
    pub value: f64,
    /// Easing toward the next keyframe.
    #[serde(default)]
    pub easing: Easing,
}

impl Keyframe {
    /// Construct a keyframe.
    pub fn new(time: f64, value: f64, easing: Easing) -> Self {
        Self {
            time,
            value,
            easing,
        }
    }
}

/// Compute the value of a channel at an arbitrary time.
///
/// Semantics:
/// - empty input returns `fallback`
/// - the input is sorted by time before use (storage order is not trusted)
/// - times at or outside the first/last keyframe clamp to that keyframe's
///   value, no extrapolation
/// - between a bracketing pair, progress is mapped through the *earlier*
///   keyframe's easing, then blended linearly
///
/// Pure and deterministic; safe to call per frame and from the worker thread.
pub fn interpolate(keyframes: &[Keyframe], time: f64, fallback: f64) -> f64 {
    if keyframes.is_empty() || time.is_nan() {
        return fallback;
    }

    let mut sorted: Vec<Keyframe> = keyframes.to_vec();
    sorted.sort_by(|a, b| a.time.total_cmp(&b.time));

    let first = sorted[0];
    let last = sorted[sorted.len() - 1];
    if time <= first.time {
        return first.value;
    }
    if time >= last.time {
        return last.value;
    }

    for pair in sorted.windows(2) {
        let (k1, k2) = (pair[0], pair[1]);
        if time >= k1.time && time <= k2.time {
            let span = k2.time - k1.time;
            if span == 0.0 {
                return k1.value;
            }
            let progress = k1.easing.apply((time - k1.time) / span);
            return k1.value + (k2.value - k1.value) * progress;
        }
    }

    fallback
}

#[cfg(test)]
#[path = "../../tests/unit/animation/interp.rs"]
mod tests;
