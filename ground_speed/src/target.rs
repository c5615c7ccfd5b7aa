//! Target velocity profiles
//!
//! A profile gives the velocity the controller should be driving toward at a
//! given time since the start of a run.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use util::maths::lin_map;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A target velocity as a function of time.
///
/// Units: velocities in uu/s, times in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TargetProfile {
    /// Hold one velocity.
    Constant {
        velocity: f64
    },

    /// Jump from `before` to `after` at `at_s`.
    Step {
        before: f64,
        after: f64,
        at_s: f64
    },

    /// Hold `from` until `start_s`, change linearly to `to` at `end_s`, then
    /// hold `to`.
    Ramp {
        from: f64,
        to: f64,
        start_s: f64,
        end_s: f64
    },

    /// `amplitude * sin(2 pi t / period_s)`.
    Sine {
        amplitude: f64,
        period_s: f64
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TargetProfile {
    /// The target velocity at `time_s`.
    pub fn target_at(&self, time_s: f64) -> f64 {
        match *self {
            TargetProfile::Constant { velocity } => velocity,
            TargetProfile::Step { before, after, at_s } => {
                if time_s < at_s { before } else { after }
            },
            TargetProfile::Ramp { from, to, start_s, end_s } => {
                if time_s <= start_s {
                    from
                }
                else if time_s >= end_s {
                    to
                }
                else {
                    lin_map((start_s, end_s), (from, to), time_s)
                }
            },
            TargetProfile::Sine { amplitude, period_s } => {
                amplitude * (std::f64::consts::TAU * time_s / period_s).sin()
            }
        }
    }

    /// Determine if the profile can be evaluated (finite values, positive
    /// durations).
    pub fn is_valid(&self) -> bool {
        match *self {
            TargetProfile::Constant { velocity } => velocity.is_finite(),
            TargetProfile::Step { before, after, at_s } => {
                before.is_finite() && after.is_finite() && at_s.is_finite()
            },
            TargetProfile::Ramp { from, to, start_s, end_s } => {
                from.is_finite() && to.is_finite()
                    && start_s.is_finite() && end_s.is_finite()
                    && end_s > start_s
            },
            TargetProfile::Sine { amplitude, period_s } => {
                amplitude.is_finite() && period_s.is_finite() && period_s > 0.0
            }
        }
    }
}
