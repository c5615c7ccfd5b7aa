//! Vehicle state and the dynamics integrator

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{BoostCommit, SimError};
use crate::accel::throttle_capacity;
use crate::consts::*;
use crate::speed_ctrl::ControlCommand;
use util::{maths::clamp, module::State, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Longitudinal state of one vehicle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct VehicleState {
    velocity: f64,
    boost: BoostCommit
}

/// A vehicle being simulated, tracking elapsed time and distance travelled as
/// well as the vehicle state.
#[derive(Clone, Debug, Default)]
pub struct Sim {
    time_s: f64,
    distance: f64,
    state: VehicleState
}

/// Input to one cycle of the `Sim` module.
#[derive(Clone, Copy, Debug)]
pub struct SimInput {
    /// Length of the tick.
    ///
    /// Units: seconds
    pub dt: f64,

    /// The command to apply over the tick.
    pub cmd: ControlCommand
}

/// Status report for one cycle of the `Sim` module.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct SimReport {
    /// Boost commitment started on this tick.
    pub boost_started: bool,

    /// Boost commitment was released on this tick.
    pub boost_released: bool,

    /// The velocity had to be clamped to the speed envelope.
    pub speed_limited: bool
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl VehicleState {
    /// A stationary, non-boosting vehicle.
    pub fn new() -> Self {
        Self::default()
    }

    /// A non-boosting vehicle moving at `velocity`.
    pub fn with_velocity(velocity: f64) -> Self {
        Self {
            velocity,
            boost: BoostCommit::Idle
        }
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn boost_commit(&self) -> BoostCommit {
        self.boost
    }

    pub fn is_boosting(&self) -> bool {
        self.boost.is_boosting()
    }

    pub fn boost_elapsed(&self) -> f64 {
        self.boost.elapsed_s()
    }
}

impl Sim {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.state = VehicleState::with_velocity(velocity);
        self
    }

    /// Total simulated time.
    pub fn time(&self) -> f64 {
        self.time_s
    }

    /// Signed distance travelled along the vehicle's forward axis.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn velocity(&self) -> f64 {
        self.state.velocity
    }

    pub fn is_boosting(&self) -> bool {
        self.state.is_boosting()
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    /// Advance the vehicle by one tick.
    pub fn step(&mut self, dt: f64, throttle: f64, boost: bool) {
        self.advance(dt, throttle, boost);
    }

    /// Advance the vehicle by one tick using a controller's command.
    pub fn apply(&mut self, dt: f64, cmd: ControlCommand) {
        self.step(dt, cmd.throttle, cmd.boost)
    }

    /// Step the vehicle, returning true if the velocity was clamped.
    fn advance(&mut self, dt: f64, throttle: f64, boost: bool) -> bool {
        self.time_s += dt;
        self.distance += self.state.velocity * dt;
        advance(&mut self.state, dt, throttle, boost)
    }
}

impl State for Sim {
    type InitData = f64;
    type InitError = SimError;

    type InputData = SimInput;
    type OutputData = VehicleState;
    type StatusReport = SimReport;
    type ProcError = SimError;

    /// Initialise the simulation.
    ///
    /// Expected init data is the initial velocity. The simulation has no
    /// archives of its own so the session is not used.
    fn init(init_data: Self::InitData, _session: Option<&Session>)
        -> Result<Self, Self::InitError>
    {
        if !init_data.is_finite() || init_data.abs() > MAX_SPEED {
            return Err(SimError::InvalidInitialVelocity(init_data))
        }

        Ok(Self::new().with_velocity(init_data))
    }

    /// Step the simulation, rejecting inputs outside the command contract.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let SimInput { dt, cmd } = *input_data;

        if !(dt > 0.0) || !dt.is_finite() {
            return Err(SimError::InvalidDt(dt))
        }
        if !cmd.is_valid() {
            return Err(SimError::InvalidCommand(cmd))
        }

        let was_boosting = self.state.is_boosting();
        let speed_limited = self.advance(dt, cmd.throttle, cmd.boost);

        let report = SimReport {
            boost_started: !was_boosting && self.state.is_boosting(),
            boost_released: was_boosting && !self.state.is_boosting(),
            speed_limited
        };

        Ok((self.state, report))
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Advance `state` by `dt` seconds under the given throttle and boost request.
///
/// `throttle` is expected in `[-1, 1]` and is not clamped here. Boosting
/// overrides the throttle to full forward.
pub fn step(state: &mut VehicleState, dt: f64, throttle: f64, boost_requested: bool) {
    advance(state, dt, throttle, boost_requested);
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Step `state`, returning true if the velocity had to be clamped.
fn advance(state: &mut VehicleState, dt: f64, throttle: f64, boost_requested: bool) -> bool {
    let prev_commit = state.boost;
    state.boost = state.boost.update(boost_requested);

    if prev_commit.is_boosting() != state.boost.is_boosting() {
        trace!(
            "Boost commitment {:?} -> {:?} at {:.2} uu/s",
            prev_commit, state.boost, state.velocity
        );
    }

    let mut throttle = throttle;
    let mut acc = 0.0;

    if state.boost.is_boosting() {
        throttle = 1.0;
        acc += BOOST_ACCEL;
        state.boost = state.boost.advance(dt);
    }

    acc += drive_accel(state.velocity, throttle);

    let unclamped = state.velocity + acc * dt;
    state.velocity = clamp(&unclamped, &-MAX_SPEED, &MAX_SPEED);

    state.velocity != unclamped
}

/// Acceleration from the drivetrain and brakes, excluding boost.
fn drive_accel(velocity: f64, throttle: f64) -> f64 {
    if throttle > 0.0 {
        if velocity < 0.0 {
            BRAKE_ACC
        }
        else {
            throttle_capacity(velocity) * throttle
        }
    }
    else if throttle < 0.0 {
        if velocity > 0.0 {
            -BRAKE_ACC
        }
        else {
            throttle_capacity(-velocity) * throttle
        }
    }
    else if velocity > 0.0 {
        -COAST_ACC
    }
    else if velocity < 0.0 {
        COAST_ACC
    }
    else {
        0.0
    }
}
