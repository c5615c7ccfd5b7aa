//! Calibration constants of the ground speed model
//!
//! Speeds are in unreal units per second (uu/s), accelerations in uu/s^2 and
//! times in seconds. These values reproduce the measured behaviour of the
//! vehicle and must not be tuned.

// ---------------------------------------------------------------------------
// SPEED ENVELOPE
// ---------------------------------------------------------------------------

/// Absolute speed limit, reachable with boost.
pub const MAX_SPEED: f64 = 2300.0;

/// Top speed reachable with throttle alone.
pub const MAX_SPEED_NO_BOOST: f64 = 1410.0;

/// Lowest (most negative) speed reachable by reversing.
pub const MIN_SPEED: f64 = -MAX_SPEED_NO_BOOST;

// ---------------------------------------------------------------------------
// TIMING
// ---------------------------------------------------------------------------

/// Physics ticks per second.
pub const TPS: f64 = 120.0;

/// Length of one physics tick.
pub const SIMULATION_DT: f64 = 1.0 / TPS;

/// Once started boost cannot be released before this much time has passed.
pub const MIN_BOOST_TIME: f64 = 3.0 / 120.0;

// ---------------------------------------------------------------------------
// ACCELERATIONS
// ---------------------------------------------------------------------------

/// Acceleration added while boosting.
pub const BOOST_ACCEL: f64 = 991.0 + 2.0 / 3.0;

/// Deceleration while coasting (zero throttle).
pub const COAST_ACC: f64 = 525.0;

/// Deceleration while braking (throttle against the direction of motion).
pub const BRAKE_ACC: f64 = 3500.0;

/// Speed at which the throttle curve changes from the first to the second
/// linear segment.
pub const THROTTLE_ACCEL_DIVISION: f64 = 1400.0;

/// Slope of the low speed throttle segment.
pub const START_THROTTLE_ACCEL_M: f64 = -36.0 / 35.0;

/// Intercept of the low speed throttle segment.
pub const START_THROTTLE_ACCEL_B: f64 = 1600.0;

/// Slope of the high speed throttle segment, relative to the division speed.
pub const END_THROTTLE_ACCEL_M: f64 = -16.0;

/// Intercept of the high speed throttle segment, relative to the division
/// speed.
pub const END_THROTTLE_ACCEL_B: f64 = 160.0;

// ---------------------------------------------------------------------------
// BOOST TANK
// ---------------------------------------------------------------------------

/// Capacity of a full boost tank.
pub const MAX_BOOST_AMOUNT: f64 = 100.0;

/// Boost used per second of boosting.
pub const BOOST_CONSUMPTION: f64 = 33.3 + 1.0 / 33.0;

/// Boost needed to pay for a minimum boost commitment.
pub const MIN_BOOST_CONSUMPTION: f64 = BOOST_CONSUMPTION * MIN_BOOST_TIME;

// ---------------------------------------------------------------------------
// REFERENCE CONTROLLER
// ---------------------------------------------------------------------------

/// Default controller time constant.
pub const REACTION_TIME: f64 = 0.04;

/// Desired acceleration at or below which the controller brakes.
pub const BRAKE_COAST_TRANSITION: f64 = -(0.45 * BRAKE_ACC + 0.55 * COAST_ACC);

/// Desired acceleration below which (and above the brake transition) the
/// controller coasts.
pub const COAST_THROTTLE_TRANSITION: f64 = -0.5 * COAST_ACC;
