//! Easing curves applied between keyframes.

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
/// Easing applied to the segment that starts at a keyframe.
pub enum Easing {
    /// Constant speed.
    #[default]
    Linear,
    /// Accelerate (cubic).
    EaseIn,
    /// Decelerate (cubic).
    EaseOut,
    /// Accelerate then decelerate (cubic).
    EaseInOut,
    /// Hold the start value until the segment ends (stop-motion).
    Step,
}

impl Easing {
    /// Map a normalized progress value in `[0, 1]` through the curve.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t * t,
            Self::EaseOut => 1.0 - (1.0 - t).powi(3),
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
            Self::Step => {
                if t >= 1.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
