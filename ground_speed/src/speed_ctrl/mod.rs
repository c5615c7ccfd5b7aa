//! Speed control module
//!
//! Chooses throttle and boost each tick to drive the vehicle toward a target
//! velocity. Any type implementing `SpeedController` can be used with the
//! simulation, the reference policy is `RefSpeedCtrl`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod ref_ctrl;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
pub use params::*;
pub use ref_ctrl::*;
pub use state::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command for one tick of the simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ControlCommand {
    /// Normalised drive demand, forward positive.
    ///
    /// Units: between -1 and +1
    pub throttle: f64,

    /// Request boost on this tick.
    pub boost: bool
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The regime selected by the reference controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CtrlMode {
    Brake,
    Coast,
    Throttle,
    Boost,
    /// No regime matched, only reachable with non-finite inputs.
    Fallback
}

/// Possible errors that can occur during SpeedCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum SpeedCtrlError {
    #[error("Invalid speed controller parameters: {0}")]
    InvalidParams(String),

    #[error("Could not create the speed controller archives: {0}")]
    ArchiveInitError(String),

    #[error("Velocity and target velocity must be finite, found {velocity} and {target_velocity}")]
    NonFiniteInput {
        velocity: f64,
        target_velocity: f64
    },

    #[error("Tick length must be positive and finite, found {0}")]
    InvalidDt(f64),

    #[error("The controller produced an invalid command: {0:?}")]
    InvalidCommand(ControlCommand),
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A policy choosing the command for each tick.
///
/// Closures taking `(velocity, target_velocity, dt)` implement this trait.
pub trait SpeedController {
    /// Choose the command for the next tick.
    fn command(&mut self, velocity: f64, target_velocity: f64, dt: f64) -> ControlCommand;

    /// The regime used for the last command, if the controller has regimes.
    fn last_mode(&self) -> Option<CtrlMode> {
        None
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ControlCommand {
    pub fn new(throttle: f64, boost: bool) -> Self {
        Self { throttle, boost }
    }

    /// Determine if the command meets the contract expected by the
    /// simulation (finite throttle in `[-1, 1]`).
    pub fn is_valid(&self) -> bool {
        self.throttle.is_finite() && self.throttle.abs() <= 1.0
    }
}

impl<F> SpeedController for F
where
    F: FnMut(f64, f64, f64) -> ControlCommand
{
    fn command(&mut self, velocity: f64, target_velocity: f64, dt: f64) -> ControlCommand {
        self(velocity, target_velocity, dt)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_command_validity() {
        assert!(ControlCommand::new(1.0, true).is_valid());
        assert!(ControlCommand::new(-1.0, false).is_valid());
        assert!(ControlCommand::new(0.0, false).is_valid());
        assert!(!ControlCommand::new(1.01, false).is_valid());
        assert!(!ControlCommand::new(f64::NAN, false).is_valid());
    }

    #[test]
    fn test_closure_controller() {
        let mut calls = 0;
        let mut bang_bang = |v: f64, r: f64, _dt: f64| {
            calls += 1;
            ControlCommand::new(if r > v { 1.0 } else { -1.0 }, false)
        };

        assert_eq!(bang_bang.command(0.0, 100.0, 0.1).throttle, 1.0);
        assert_eq!(bang_bang.command(100.0, 0.0, 0.1).throttle, -1.0);
        assert_eq!(bang_bang.last_mode(), None);
        drop(bang_bang);
        assert_eq!(calls, 2);
    }
}
