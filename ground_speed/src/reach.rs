//! # Reachability
//!
//! Forward simulations answering planning questions: how fast can the vehicle
//! get with the boost it has, and can it cover a distance within a time
//! budget.
//!
//! Both are stepped at `SIMULATION_DT` using the same dynamics as
//! [`crate::sim`].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;

// Internal
use crate::accel::throttle_capacity;
use crate::consts::*;
use crate::sim::{self, BoostTank, VehicleState};
use crate::speed_ctrl::SpeedController;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Once the vehicle is within this speed of the required average speed the
/// distance is considered coverable.
///
/// Units: uu/s
pub const REACH_TOLERANCE: f64 = 100.0;

/// Longest time budget `time_to_cover` will simulate.
///
/// Units: seconds
pub const MAX_REACH_TIME_S: f64 = 600.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A question for [`time_to_cover`].
#[derive(Clone, Copy, Debug)]
pub struct ReachQuery {
    /// Current forward velocity.
    ///
    /// Units: uu/s
    pub velocity: f64,

    /// Boost in the tank.
    pub boost: f64,

    /// Highest speed the vehicle is allowed to use.
    ///
    /// Units: uu/s
    pub max_speed: f64,

    /// Time budget.
    ///
    /// Units: seconds
    pub max_time_s: f64,

    /// Distance left to cover.
    ///
    /// Units: uu
    pub distance: f64,

    /// Cover the distance driving forwards (true) or reversing (false).
    pub forwards: bool
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ReachError {
    #[error("Distance cannot be covered in time, an average of {required_speed:.1} uu/s is needed")]
    Unreachable {
        required_speed: f64
    },

    #[error("Invalid reach query: {0}")]
    InvalidInput(String),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// The highest speed the vehicle can reach from `velocity` with `boost` in
/// the tank.
pub fn max_reachable_speed(velocity: f64, boost: f64) -> f64 {
    if velocity.is_nan() {
        return velocity
    }

    let mut v = velocity.max(-MAX_SPEED);
    let mut tank = BoostTank::new(boost);

    loop {
        if v >= MAX_SPEED {
            return MAX_SPEED
        }

        if !tank.can_boost_for(SIMULATION_DT) {
            return v.max(MAX_SPEED_NO_BOOST)
        }

        if v < 0.0 {
            v += BRAKE_ACC * SIMULATION_DT;
        }
        else {
            v += (throttle_capacity(v) + BOOST_ACCEL) * SIMULATION_DT;
            tank.drain(SIMULATION_DT);
        }
    }
}

/// Simulate `controller` covering the query's distance.
///
/// On success returns the time budget left once the vehicle is either past
/// the distance or travelling within `REACH_TOLERANCE` of the average speed
/// still required. Boost requests are only passed on while the tank can pay
/// for a minimum commitment.
pub fn time_to_cover<C: SpeedController>(
    query: &ReachQuery,
    controller: &mut C
) -> Result<f64, ReachError> {
    validate(query)?;

    let direction = if query.forwards { 1.0 } else { -1.0 };

    let mut distance = query.distance;
    let mut state = VehicleState::with_velocity(query.velocity);
    let mut tank = BoostTank::new(query.boost);

    // One tick past the budget guarantees the time check below fires
    let num_ticks = (query.max_time_s / SIMULATION_DT).ceil() as usize + 1;

    for tick in 0..=num_ticks {
        let time_left = query.max_time_s - tick as f64 * SIMULATION_DT;

        if distance <= 0.0 {
            return Ok(time_left)
        }

        // Average velocity needed to cover the rest in time
        let required = distance * direction / time_left.max(0.0);

        if time_left < -SIMULATION_DT
            || (query.forwards && required > query.max_speed)
            || (!query.forwards && required < MIN_SPEED)
        {
            trace!(
                "Unreachable with {:.3} s left, {:.1} uu to go",
                time_left, distance
            );
            return Err(ReachError::Unreachable { required_speed: required })
        }

        if (required - state.velocity()).abs() < REACH_TOLERANCE {
            return Ok(time_left)
        }

        let cmd = controller.command(state.velocity(), required, SIMULATION_DT);
        let boost = cmd.boost && tank.can_start_boost();

        sim::step(&mut state, SIMULATION_DT, cmd.throttle, boost);
        if state.is_boosting() {
            tank.drain(SIMULATION_DT);
        }

        distance -= state.velocity() * direction * SIMULATION_DT;
    }

    Err(ReachError::Unreachable { required_speed: direction * f64::INFINITY })
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn validate(query: &ReachQuery) -> Result<(), ReachError> {
    let finite = query.velocity.is_finite()
        && query.boost.is_finite()
        && query.max_speed.is_finite()
        && query.max_time_s.is_finite()
        && query.distance.is_finite();

    if !finite {
        return Err(ReachError::InvalidInput(format!("non-finite value in {:?}", query)))
    }
    if query.max_time_s <= 0.0 || query.max_time_s > MAX_REACH_TIME_S {
        return Err(ReachError::InvalidInput(format!(
            "time budget must be in (0, {}] s, found {}",
            MAX_REACH_TIME_S, query.max_time_s
        )))
    }
    if query.max_speed <= 0.0 {
        return Err(ReachError::InvalidInput(format!(
            "maximum speed must be positive, found {}", query.max_speed
        )))
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::speed_ctrl::{ControlCommand, RefSpeedCtrl};

    fn query(velocity: f64, boost: f64, max_time_s: f64, distance: f64) -> ReachQuery {
        ReachQuery {
            velocity,
            boost,
            max_speed: MAX_SPEED,
            max_time_s,
            distance,
            forwards: true
        }
    }

    #[test]
    fn test_max_reachable_speed() {
        assert_eq!(max_reachable_speed(0.0, 0.0), MAX_SPEED_NO_BOOST);
        assert_eq!(max_reachable_speed(0.0, 100.0), MAX_SPEED);
        assert_eq!(max_reachable_speed(2000.0, 0.0), 2000.0);
        assert_eq!(max_reachable_speed(2300.0, 0.0), MAX_SPEED);
        assert_eq!(max_reachable_speed(-800.0, 0.0), MAX_SPEED_NO_BOOST);

        let partial = max_reachable_speed(1300.0, 20.0);
        assert!(partial > MAX_SPEED_NO_BOOST && partial < MAX_SPEED);

        // More boost never means less speed
        let mut prev = 0.0;
        for b in (0..=100).step_by(10) {
            let s = max_reachable_speed(500.0, b as f64);
            assert!(s >= prev);
            prev = s;
        }
    }

    #[test]
    fn test_reachable() {
        let mut ctrl = RefSpeedCtrl::default();

        let left = time_to_cover(&query(0.0, 100.0, 5.0, 1000.0), &mut ctrl).unwrap();
        assert!(left > 0.0 && left <= 5.0);

        // Already on pace
        let left = time_to_cover(&query(0.0, 0.0, 10.0, 100.0), &mut ctrl).unwrap();
        assert_eq!(left, 10.0);

        // Nothing to cover
        let left = time_to_cover(&query(500.0, 0.0, 3.0, 0.0), &mut ctrl).unwrap();
        assert_eq!(left, 3.0);
    }

    #[test]
    fn test_unreachable() {
        let mut ctrl = RefSpeedCtrl::default();

        match time_to_cover(&query(0.0, 100.0, 1.0, 10000.0), &mut ctrl) {
            Err(ReachError::Unreachable { required_speed }) => {
                assert_eq!(required_speed, 10000.0)
            },
            r => panic!("Expected Unreachable, got {:?}", r)
        }
    }

    #[test]
    fn test_boost_gates_reach() {
        let mut ctrl = RefSpeedCtrl::default();

        // Needs more than the unboosted top speed on average
        assert!(time_to_cover(&query(1400.0, 100.0, 1.0, 1700.0), &mut ctrl).is_ok());
        assert!(matches!(
            time_to_cover(&query(1400.0, 0.0, 1.0, 1700.0), &mut ctrl),
            Err(ReachError::Unreachable { .. })
        ));
    }

    #[test]
    fn test_backwards() {
        let mut ctrl = RefSpeedCtrl::default();
        let q = ReachQuery { forwards: false, ..query(0.0, 0.0, 2.0, 500.0) };

        let left = time_to_cover(&q, &mut ctrl).unwrap();
        assert!(left > 0.0 && left < 2.0);

        // Faster than the vehicle can reverse
        let q = ReachQuery { forwards: false, ..query(0.0, 0.0, 1.0, 2000.0) };
        assert!(time_to_cover(&q, &mut ctrl).is_err());
    }

    #[test]
    fn test_stalled_controller_terminates() {
        // Never moves, so the required speed climbs until it is out of reach
        let mut idle = |_v: f64, _r: f64, _dt: f64| ControlCommand::new(0.0, false);

        match time_to_cover(&query(0.0, 0.0, MAX_REACH_TIME_S, 1e5), &mut idle) {
            Err(ReachError::Unreachable { required_speed }) => {
                assert!(required_speed > MAX_SPEED)
            },
            r => panic!("Expected Unreachable, got {:?}", r)
        }

        // Budgets too long to simulate are refused up front
        assert!(matches!(
            time_to_cover(&query(0.0, 0.0, 1e18, 2e20), &mut idle),
            Err(ReachError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_invalid_query() {
        let mut ctrl = RefSpeedCtrl::default();

        assert!(matches!(
            time_to_cover(&query(0.0, 0.0, 0.0, 100.0), &mut ctrl),
            Err(ReachError::InvalidInput(_))
        ));
        assert!(matches!(
            time_to_cover(&query(f64::NAN, 0.0, 1.0, 100.0), &mut ctrl),
            Err(ReachError::InvalidInput(_))
        ));
    }
}
