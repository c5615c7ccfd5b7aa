//! Parameters structure for the reference speed controller

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::SpeedCtrlError;
use crate::consts::REACTION_TIME;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Tuning of the reference speed controller.
///
/// The defaults are the calibrated reference policy.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct Params {

    /// Time constant converting a velocity error into a desired acceleration.
    ///
    /// Units: seconds
    pub reaction_time_s: f64,

    /// Smallest throttle used in the proportional regime, keeps the vehicle
    /// from stalling just short of the target.
    pub throttle_floor: f64,

    /// Fraction of the boost acceleration added to the throttle capacity to
    /// get the acceleration demand above which boost is used.
    pub boost_threshold_factor: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            reaction_time_s: REACTION_TIME,
            throttle_floor: 0.02,
            boost_threshold_factor: 0.5
        }
    }
}

impl Params {
    /// Reference tuning with a different reaction time.
    pub fn with_reaction_time(reaction_time_s: f64) -> Self {
        Self {
            reaction_time_s,
            ..Self::default()
        }
    }

    /// Check the parameters can be used by the controller.
    pub fn validate(&self) -> Result<(), SpeedCtrlError> {
        if !(self.reaction_time_s > 0.0) || !self.reaction_time_s.is_finite() {
            return Err(SpeedCtrlError::InvalidParams(format!(
                "reaction_time_s must be positive and finite, found {}",
                self.reaction_time_s
            )))
        }
        if !(self.throttle_floor > 0.0 && self.throttle_floor <= 1.0) {
            return Err(SpeedCtrlError::InvalidParams(format!(
                "throttle_floor must be in (0, 1], found {}",
                self.throttle_floor
            )))
        }
        if !(self.boost_threshold_factor >= 0.0) || !self.boost_threshold_factor.is_finite() {
            return Err(SpeedCtrlError::InvalidParams(format!(
                "boost_threshold_factor must be non-negative and finite, found {}",
                self.boost_threshold_factor
            )))
        }

        Ok(())
    }
}
