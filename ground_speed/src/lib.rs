//! # Ground speed library.
//!
//! Longitudinal dynamics of a ground vehicle driving along its forward axis,
//! and a controller choosing throttle and boost to reach a target velocity.
//!
//! The executable `gs_exec` and the benchmarks use the items defined here.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Acceleration model - throttle capacity as a function of speed
pub mod accel;

/// Calibration constants of the vehicle model
pub mod consts;

/// Reachability - top reachable speed and time to cover a distance
pub mod reach;

/// Closed-loop run of a speed controller against the simulation
pub mod run;

/// Simulation - steps the vehicle's velocity and boost state
pub mod sim;

/// Speed control module - chooses throttle and boost for a target velocity
pub mod speed_ctrl;

/// Target velocity profiles
pub mod target;
