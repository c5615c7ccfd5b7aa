//! Acceleration model
//!
//! The throttle curve is two straight lines: a gently falling one up to
//! `THROTTLE_ACCEL_DIVISION`, then a steep one which reaches zero at
//! `MAX_SPEED_NO_BOOST`. Both meet at 160 uu/s^2 on the division speed.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use util::maths::line;

use crate::consts::*;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Acceleration available from full throttle (without boost) at `speed`.
///
/// A negative speed means the throttle is working against the direction of
/// motion, which behaves like a full brake.
pub fn throttle_capacity(speed: f64) -> f64 {
    if speed < 0.0 {
        BRAKE_ACC
    }
    else if speed < THROTTLE_ACCEL_DIVISION {
        line(START_THROTTLE_ACCEL_M, START_THROTTLE_ACCEL_B, speed)
    }
    else if speed < MAX_SPEED_NO_BOOST {
        line(
            END_THROTTLE_ACCEL_M,
            END_THROTTLE_ACCEL_B,
            speed - THROTTLE_ACCEL_DIVISION
        )
    }
    else {
        0.0
    }
}
