//! Reference speed controller
//!
//! A proportional law turns the velocity error into a desired acceleration
//! using the reaction time. The desired acceleration then selects one of four
//! regimes, in ascending order:
//!
//! | desired acceleration                     | regime   | command                        |
//! |------------------------------------------|----------|--------------------------------|
//! | `<= BRAKE_COAST_TRANSITION`              | Brake    | throttle -1                    |
//! | `< COAST_THROTTLE_TRANSITION`            | Coast    | throttle 0                     |
//! | `<= capacity + factor * BOOST_ACCEL`     | Throttle | desired / capacity, floored    |
//! | above                                    | Boost    | throttle 1, boost if under target |

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;

// Internal
use super::{ControlCommand, CtrlMode, Params, SpeedController, SpeedCtrlError};
use crate::accel::throttle_capacity;
use crate::consts::{BOOST_ACCEL, BRAKE_COAST_TRANSITION, COAST_THROTTLE_TRANSITION};
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The reference speed controller.
#[derive(Clone, Debug, Default)]
pub struct RefSpeedCtrl {
    params: Params,
    last_mode: Option<CtrlMode>
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RefSpeedCtrl {
    /// Create a controller from checked parameters.
    pub fn from_params(params: Params) -> Result<Self, SpeedCtrlError> {
        params.validate()?;

        Ok(Self {
            params,
            last_mode: None
        })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Choose the command and regime for the given velocity and target.
    pub fn decide(&self, velocity: f64, target_velocity: f64) -> (ControlCommand, CtrlMode) {
        let error = target_velocity - velocity;
        let accel = error / self.params.reaction_time_s;

        let capacity = throttle_capacity(velocity.abs());
        let boost_threshold = capacity + self.params.boost_threshold_factor * BOOST_ACCEL;

        if accel <= BRAKE_COAST_TRANSITION {
            (ControlCommand::new(-1.0, false), CtrlMode::Brake)
        }
        else if accel < COAST_THROTTLE_TRANSITION {
            (ControlCommand::new(0.0, false), CtrlMode::Coast)
        }
        else if accel <= boost_threshold {
            let throttle = if capacity == 0.0 {
                1.0
            }
            else {
                clamp(&(accel / capacity), &self.params.throttle_floor, &1.0)
            };
            (ControlCommand::new(throttle, false), CtrlMode::Throttle)
        }
        else if accel > boost_threshold {
            // Never boost past a target that has already been exceeded
            (ControlCommand::new(1.0, error > 0.0), CtrlMode::Boost)
        }
        else {
            (ControlCommand::new(0.0, false), CtrlMode::Fallback)
        }
    }
}

impl SpeedController for RefSpeedCtrl {
    fn command(&mut self, velocity: f64, target_velocity: f64, _dt: f64) -> ControlCommand {
        let (cmd, mode) = self.decide(velocity, target_velocity);

        if self.last_mode != Some(mode) {
            trace!(
                "RefSpeedCtrl mode {:?} (v = {:.2}, target = {:.2})",
                mode, velocity, target_velocity
            );
        }
        self.last_mode = Some(mode);

        cmd
    }

    fn last_mode(&self) -> Option<CtrlMode> {
        self.last_mode
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Choose a command with the reference tuning and the given reaction time.
///
/// `reaction_time` must be positive, it divides the velocity error.
pub fn choose_command(velocity: f64, target_velocity: f64, reaction_time: f64) -> ControlCommand {
    let ctrl = RefSpeedCtrl {
        params: Params::with_reaction_time(reaction_time),
        last_mode: None
    };

    ctrl.decide(velocity, target_velocity).0
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::consts::*;
    use crate::sim::VehicleState;

    const DT: f64 = SIMULATION_DT;

    #[test]
    fn test_thresholds_ascending() {
        assert!(BRAKE_COAST_TRANSITION < COAST_THROTTLE_TRANSITION);
        assert!(COAST_THROTTLE_TRANSITION < 0.5 * BOOST_ACCEL);
        assert!((BRAKE_COAST_TRANSITION - (-1863.75)).abs() < 1e-9);
        assert_eq!(COAST_THROTTLE_TRANSITION, -262.5);
    }

    #[test]
    fn test_full_brake_when_far_above_target() {
        let cmd = choose_command(1000.0, 0.0, REACTION_TIME);
        assert_eq!(cmd, ControlCommand::new(-1.0, false));
    }

    #[test]
    fn test_on_target_uses_floor_throttle() {
        let ctrl = RefSpeedCtrl::default();
        let (cmd, mode) = ctrl.decide(500.0, 500.0);

        assert_eq!(mode, CtrlMode::Throttle);
        assert!(!cmd.boost);
        assert!(cmd.throttle >= 0.0 && cmd.throttle <= 0.05);
        assert_eq!(cmd.throttle, 0.02);
    }

    #[test]
    fn test_coast_band() {
        // Error of -5 uu/s wants -125 uu/s^2: still proportional throttle at floor
        let (cmd, mode) = RefSpeedCtrl::default().decide(500.0, 495.0);
        assert_eq!(mode, CtrlMode::Throttle);
        assert_eq!(cmd.throttle, 0.02);

        // Error of -20 uu/s wants -500 uu/s^2: coast
        let (cmd, mode) = RefSpeedCtrl::default().decide(500.0, 480.0);
        assert_eq!(mode, CtrlMode::Coast);
        assert_eq!(cmd, ControlCommand::new(0.0, false));

        // Error of -80 uu/s wants -2000 uu/s^2: brake
        let (_, mode) = RefSpeedCtrl::default().decide(500.0, 420.0);
        assert_eq!(mode, CtrlMode::Brake);
    }

    #[test]
    fn test_proportional_throttle() {
        // Error of 10 uu/s wants 250 uu/s^2 out of 1600 available at rest
        let (cmd, mode) = RefSpeedCtrl::default().decide(0.0, 10.0);
        assert_eq!(mode, CtrlMode::Throttle);
        assert!((cmd.throttle - 250.0 / 1600.0).abs() < 1e-9);

        // Above top unboosted speed there is no capacity, so full throttle
        let (cmd, mode) = RefSpeedCtrl::default().decide(1500.0, 1505.0);
        assert_eq!(mode, CtrlMode::Throttle);
        assert_eq!(cmd.throttle, 1.0);
    }

    #[test]
    fn test_boost_only_under_target() {
        let (cmd, mode) = RefSpeedCtrl::default().decide(0.0, 2300.0);
        assert_eq!(mode, CtrlMode::Boost);
        assert_eq!(cmd, ControlCommand::new(1.0, true));

        let ctrl = RefSpeedCtrl::default();
        let speeds = [-1400.0, -600.0, 0.0, 300.0, 1200.0, 1405.0, 1800.0, 2300.0];
        for v in speeds.iter() {
            for r in speeds.iter() {
                let (cmd, mode) = ctrl.decide(*v, *r);
                if mode == CtrlMode::Boost {
                    assert_eq!(cmd.boost, r > v);
                    assert_eq!(cmd.throttle, 1.0);
                }
                else {
                    assert!(!cmd.boost);
                }
                assert!(cmd.is_valid());
            }
        }
    }

    #[test]
    fn test_non_finite_falls_back() {
        let (cmd, mode) = RefSpeedCtrl::default().decide(f64::NAN, 100.0);
        assert_eq!(mode, CtrlMode::Fallback);
        assert_eq!(cmd, ControlCommand::new(0.0, false));
    }

    #[test]
    fn test_from_params_rejects_invalid() {
        assert!(RefSpeedCtrl::from_params(Params::with_reaction_time(0.0)).is_err());
        assert!(RefSpeedCtrl::from_params(Params::default()).is_ok());
    }

    #[test]
    fn test_accelerate_to_max_speed() {
        let mut ctrl = RefSpeedCtrl::default();
        let mut state = VehicleState::new();
        let mut boost_ticks = Vec::new();

        for i in 0..360 {
            let cmd = ctrl.command(state.velocity(), MAX_SPEED, DT);
            if cmd.boost {
                boost_ticks.push(i);
            }
            crate::sim::step(&mut state, DT, cmd.throttle, cmd.boost);
        }

        assert!(state.velocity() > MAX_SPEED - 25.0);
        assert!(state.velocity() <= MAX_SPEED);

        // Boost was requested for one contiguous span starting on the first tick
        assert!(!boost_ticks.is_empty());
        assert_eq!(boost_ticks[0], 0);
        for (n, tick) in boost_ticks.iter().enumerate() {
            assert_eq!(*tick, n);
        }
    }

    #[test]
    fn test_track_lower_target() {
        let mut ctrl = RefSpeedCtrl::default();
        let mut state = VehicleState::with_velocity(1400.0);

        for _ in 0..240 {
            let cmd = ctrl.command(state.velocity(), 600.0, DT);
            assert!(!cmd.boost);
            crate::sim::step(&mut state, DT, cmd.throttle, cmd.boost);
        }

        assert!((state.velocity() - 600.0).abs() < 20.0);
    }

    #[test]
    fn test_reverse_target() {
        let mut ctrl = RefSpeedCtrl::default();
        let mut state = VehicleState::new();

        for _ in 0..480 {
            let cmd = ctrl.command(state.velocity(), -800.0, DT);
            crate::sim::step(&mut state, DT, cmd.throttle, cmd.boost);
        }

        // Reverse tracking settles inside the coast band short of the target
        assert!((state.velocity() - -800.0).abs() < 100.0);
        assert!(!state.is_boosting());
    }
}
