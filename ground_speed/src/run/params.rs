//! Parameters for a closed-loop run

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::RunError;
use crate::target::TargetProfile;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for a closed-loop run.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct RunParams {

    /// Length of one tick.
    ///
    /// Units: seconds
    pub dt_s: f64,

    /// Length of the run.
    ///
    /// Units: seconds
    pub duration_s: f64,

    /// Velocity of the vehicle at the start of the run.
    ///
    /// Units: uu/s
    pub initial_velocity: f64,

    /// Archive every tick into the session.
    #[serde(default)]
    pub archive: bool,

    /// The velocity to drive toward.
    pub target: TargetProfile
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RunParams {
    /// Number of ticks in the run.
    pub fn num_ticks(&self) -> usize {
        (self.duration_s / self.dt_s).round() as usize
    }

    /// Check the run can be performed.
    pub fn validate(&self) -> Result<(), RunError> {
        if !(self.dt_s > 0.0) || !self.dt_s.is_finite() {
            return Err(RunError::InvalidParams(format!(
                "dt_s must be positive and finite, found {}", self.dt_s
            )))
        }
        if !(self.duration_s >= 0.0) || !self.duration_s.is_finite() {
            return Err(RunError::InvalidParams(format!(
                "duration_s must be non-negative and finite, found {}", self.duration_s
            )))
        }

        // The tick count must fit in a usize
        let ticks = (self.duration_s / self.dt_s).round();
        if !ticks.is_finite() || ticks >= usize::MAX as f64 {
            return Err(RunError::InvalidParams(format!(
                "duration_s / dt_s gives too many ticks ({:e})", ticks
            )))
        }

        if !self.target.is_valid() {
            return Err(RunError::InvalidParams(format!(
                "invalid target profile {:?}", self.target
            )))
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_load_and_ticks() {
        let p: RunParams = util::params::from_str(
            "dt_s = 0.008333333333333333\n\
             duration_s = 6.0\n\
             initial_velocity = 0.0\n\
             \n\
             [target]\n\
             type = \"constant\"\n\
             velocity = 1000.0\n"
        ).unwrap();

        assert!(!p.archive);
        assert_eq!(p.num_ticks(), 720);
        assert_eq!(p.target, TargetProfile::Constant { velocity: 1000.0 });
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let base = RunParams {
            dt_s: 0.01,
            duration_s: 1.0,
            initial_velocity: 0.0,
            archive: false,
            target: TargetProfile::Constant { velocity: 0.0 }
        };

        assert!(RunParams { dt_s: -0.01, ..base }.validate().is_err());
        assert!(RunParams { duration_s: f64::NAN, ..base }.validate().is_err());
        assert!(RunParams {
            target: TargetProfile::Sine { amplitude: 1.0, period_s: 0.0 },
            ..base
        }.validate().is_err());
        assert_eq!(RunParams { duration_s: 0.0, ..base }.num_ticks(), 0);
    }

    #[test]
    fn test_tick_count_must_fit() {
        let base = RunParams {
            dt_s: 0.01,
            duration_s: 1.0,
            initial_velocity: 0.0,
            archive: false,
            target: TargetProfile::Constant { velocity: 0.0 }
        };

        // Ratio overflows to infinity
        let p = RunParams { dt_s: 1e-300, duration_s: 1e300, ..base };
        assert!(matches!(p.validate(), Err(RunError::InvalidParams(_))));

        // Finite but beyond the range of a tick counter
        let p = RunParams { dt_s: 1e-10, duration_s: 1e10, ..base };
        assert!(matches!(p.validate(), Err(RunError::InvalidParams(_))));

        // Long but representable runs are fine
        let p = RunParams { dt_s: 1.0 / 120.0, duration_s: 1e6, ..base };
        assert!(p.validate().is_ok());
        assert_eq!(p.num_ticks(), 120_000_000);
    }
}
