//! Longitudinal dynamics simulation

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod boost;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use boost::*;
pub use state::*;

use crate::speed_ctrl::ControlCommand;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Inputs rejected by the `Sim` module.
///
/// The free `step` function accepts anything, these only come from the
/// checked module interface.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("Tick length must be positive and finite, found {0}")]
    InvalidDt(f64),

    #[error("Initial velocity must be finite and within the speed envelope, found {0}")]
    InvalidInitialVelocity(f64),

    #[error("Recieved an invalid control command: {0:?}")]
    InvalidCommand(ControlCommand),
}
