//! Closed-loop run
//!
//! Each tick the speed controller reads the current velocity and the
//! profile's target, the simulation applies the resulting command, and the
//! new velocity feeds the next tick.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};
use serde::Serialize;

// Internal
pub use params::*;

use crate::sim::{Sim, SimError, SimInput};
use crate::speed_ctrl::{self, CtrlMode, SpeedController, SpeedCtrl, SpeedCtrlError};
use util::{
    archive::{Archived, Archiver},
    module::State,
    session::Session
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A closed-loop run of one vehicle against a target profile.
pub struct Run<C> {
    params: RunParams,

    speed_ctrl: SpeedCtrl<C>,
    sim: Sim,

    tick: usize,
    num_ticks: usize,

    summary: RunSummary,

    last_record: Option<TickRecord>,
    arch_ticks: Archiver
}

/// Everything that happened on one tick.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct TickRecord {
    pub tick: usize,

    /// Time at the start of the tick.
    ///
    /// Units: seconds
    pub time_s: f64,

    pub target_velocity: f64,

    /// Velocity the command was chosen for.
    pub velocity: f64,

    pub throttle: f64,
    pub boost_requested: bool,

    /// Boost commitment after the tick.
    pub boosting: bool,
    pub boost_elapsed_s: f64,

    /// Velocity after the tick.
    pub new_velocity: f64,

    pub mode: Option<CtrlMode>
}

/// Overview of a finished (or partial) run.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct RunSummary {
    pub ticks: usize,
    pub duration_s: f64,
    pub final_velocity: f64,
    pub distance: f64,
    pub peak_speed: f64,
    pub boost_request_ticks: usize,
    pub boosting_ticks: usize,
    pub speed_limited_ticks: usize,

    /// Largest absolute difference between the target and the velocity
    /// reached at the end of a tick.
    pub max_abs_error: f64
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors during a run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Invalid run parameters: {0}")]
    InvalidParams(String),

    #[error("Speed controller error: {0}")]
    SpeedCtrlError(#[from] SpeedCtrlError),

    #[error("Simulation error: {0}")]
    SimError(#[from] SimError),

    #[error("Could not archive the run: {0}")]
    ArchiveError(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<C: SpeedController> Run<C> {
    /// Set up a run with the given controller.
    ///
    /// If a session is given and `params.archive` is set the tick records and
    /// the controller's decisions are archived into it.
    pub fn new(
        params: RunParams,
        controller: C,
        session: Option<&Session>
    ) -> Result<Self, RunError> {
        params.validate()?;

        let session = if params.archive { session } else { None };

        let speed_ctrl = SpeedCtrl::init(controller, session)?;
        let sim = Sim::init(params.initial_velocity, session)?;

        let arch_ticks = match session {
            Some(s) => Archiver::from_path(s, "run/ticks.csv")
                .map_err(|e| RunError::ArchiveError(e.to_string()))?,
            None => Archiver::default()
        };

        let num_ticks = params.num_ticks();

        debug!(
            "Run initialised: {} ticks of {:.5} s, target {:?}",
            num_ticks, params.dt_s, params.target
        );

        Ok(Self {
            params,
            speed_ctrl,
            sim,
            tick: 0,
            num_ticks,
            summary: RunSummary {
                final_velocity: params.initial_velocity,
                peak_speed: params.initial_velocity.abs(),
                ..RunSummary::default()
            },
            last_record: None,
            arch_ticks
        })
    }

    /// True once all ticks have been run.
    pub fn is_finished(&self) -> bool {
        self.tick >= self.num_ticks
    }

    pub fn sim(&self) -> &Sim {
        &self.sim
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Run one tick, or return `None` if the run is finished.
    pub fn tick(&mut self) -> Result<Option<TickRecord>, RunError> {
        if self.is_finished() {
            return Ok(None)
        }

        let dt = self.params.dt_s;
        let time_s = self.tick as f64 * dt;
        let target_velocity = self.params.target.target_at(time_s);
        let velocity = self.sim.velocity();

        let (cmd, report) = self.speed_ctrl.proc(&speed_ctrl::InputData {
            velocity,
            target_velocity,
            dt
        })?;

        let (state, sim_report) = self.sim.proc(&SimInput { dt, cmd })?;

        let record = TickRecord {
            tick: self.tick,
            time_s,
            target_velocity,
            velocity,
            throttle: cmd.throttle,
            boost_requested: cmd.boost,
            boosting: state.is_boosting(),
            boost_elapsed_s: state.boost_elapsed(),
            new_velocity: state.velocity(),
            mode: report.mode
        };

        // Update the summary
        let s = &mut self.summary;
        s.ticks += 1;
        s.duration_s = self.sim.time();
        s.final_velocity = state.velocity();
        s.distance = self.sim.distance();
        s.peak_speed = s.peak_speed.max(state.velocity().abs());
        s.boost_request_ticks += cmd.boost as usize;
        s.boosting_ticks += state.is_boosting() as usize;
        s.speed_limited_ticks += sim_report.speed_limited as usize;
        s.max_abs_error = s.max_abs_error.max((target_velocity - state.velocity()).abs());

        self.last_record = Some(record);
        self.tick += 1;

        self.write().map_err(|e| RunError::ArchiveError(e.to_string()))?;

        Ok(Some(record))
    }

    /// Run all remaining ticks, returning every tick's record.
    pub fn run_to_end(&mut self) -> Result<Vec<TickRecord>, RunError> {
        let mut records = Vec::new();

        while let Some(record) = self.tick()? {
            records.push(record);
        }

        info!(
            "Run complete: {} ticks, final velocity {:.2} uu/s, peak {:.2} uu/s, \
             boosted for {} ticks",
            self.summary.ticks,
            self.summary.final_velocity,
            self.summary.peak_speed,
            self.summary.boosting_ticks
        );

        Ok(records)
    }
}

impl<C> Archived for Run<C> {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(record) = self.last_record {
            self.arch_ticks.serialise(record)?;
        }
        self.speed_ctrl.write()?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::consts::*;
    use crate::speed_ctrl::{ControlCommand, RefSpeedCtrl};
    use crate::target::TargetProfile;

    fn params(target: TargetProfile, duration_s: f64) -> RunParams {
        RunParams {
            dt_s: SIMULATION_DT,
            duration_s,
            initial_velocity: 0.0,
            archive: false,
            target
        }
    }

    #[test]
    fn test_accelerate_to_max_speed() {
        let mut run = Run::new(
            params(TargetProfile::Constant { velocity: MAX_SPEED }, 3.0),
            RefSpeedCtrl::default(),
            None
        ).unwrap();

        let records = run.run_to_end().unwrap();
        assert_eq!(records.len(), 360);
        assert!(run.is_finished());
        assert!(run.tick().unwrap().is_none());

        let summary = run.summary();
        assert!(summary.final_velocity > MAX_SPEED - 25.0);
        assert!(summary.peak_speed <= MAX_SPEED);
        assert!(summary.boost_request_ticks > 0);

        // One contiguous span of boost regime from the start
        let boosting: Vec<bool> = records.iter()
            .map(|r| r.mode == Some(CtrlMode::Boost))
            .collect();
        let span = boosting.iter().take_while(|b| **b).count();
        assert!(span > 0);
        assert!(boosting[span..].iter().all(|b| !*b));
    }

    #[test]
    fn test_sine_tracking() {
        let mut run = Run::new(
            params(TargetProfile::Sine {
                amplitude: 1000.0,
                period_s: std::f64::consts::TAU
            }, 6.0),
            RefSpeedCtrl::default(),
            None
        ).unwrap();

        let records = run.run_to_end().unwrap();

        // Tracks the forward half of the wave closely
        for r in records.iter().filter(|r| r.time_s > 0.5 && r.time_s < 2.5) {
            assert!((r.target_velocity - r.new_velocity).abs() < 120.0);
        }
        assert!(records.iter().all(|r| r.new_velocity.abs() <= MAX_SPEED));
    }

    #[test]
    fn test_injected_controller() {
        // Always coast: the vehicle slows to a stop from its initial velocity
        let coast = |_v: f64, _r: f64, _dt: f64| ControlCommand::new(0.0, false);
        let mut p = params(TargetProfile::Constant { velocity: 0.0 }, 2.0);
        p.initial_velocity = 500.0;

        let mut run = Run::new(p, coast, None).unwrap();
        let records = run.run_to_end().unwrap();

        assert!(records.iter().all(|r| r.mode.is_none() && r.throttle == 0.0));
        assert!(run.summary().final_velocity.abs() < COAST_ACC * SIMULATION_DT);
        assert_eq!(run.summary().boosting_ticks, 0);
    }

    #[test]
    fn test_invalid_params() {
        let mut p = params(TargetProfile::Constant { velocity: 0.0 }, 1.0);
        p.dt_s = 0.0;
        assert!(matches!(
            Run::new(p, RefSpeedCtrl::default(), None),
            Err(RunError::InvalidParams(_))
        ));

        let mut p = params(TargetProfile::Constant { velocity: 0.0 }, 1.0);
        p.initial_velocity = 5000.0;
        assert!(matches!(
            Run::new(p, RefSpeedCtrl::default(), None),
            Err(RunError::SimError(SimError::InvalidInitialVelocity(_)))
        ));

        let mut p = params(TargetProfile::Constant { velocity: 0.0 }, 1e300);
        p.dt_s = 1e-300;
        assert!(matches!(
            Run::new(p, RefSpeedCtrl::default(), None),
            Err(RunError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_long_run_steps_without_reserving() {
        // 1.2e8 ticks: setting up must not allocate for the whole run
        let mut run = Run::new(
            params(TargetProfile::Constant { velocity: 1000.0 }, 1e6),
            RefSpeedCtrl::default(),
            None
        ).unwrap();

        for _ in 0..120 {
            assert!(run.tick().unwrap().is_some());
        }
        assert!(!run.is_finished());
        assert_eq!(run.summary().ticks, 120);
    }

    #[test]
    fn test_archived_run() {
        let root = tempfile::tempdir().unwrap();
        let session = Session::new_in(root.path(), "run_test", "sessions").unwrap();

        let mut p = params(TargetProfile::Step { before: 0.0, after: 1000.0, at_s: 0.1 }, 0.5);
        p.archive = true;

        let mut run = Run::new(p, RefSpeedCtrl::default(), Some(&session)).unwrap();
        run.run_to_end().unwrap();

        let ticks = std::fs::read_to_string(session.arch_root.join("run/ticks.csv")).unwrap();
        let lines: Vec<&str> = ticks.lines().collect();
        assert_eq!(lines.len(), 61);
        assert!(lines[0].starts_with("tick,time_s,target_velocity,velocity,throttle"));
        assert!(session.arch_root.join("speed_ctrl/output.csv").exists());
    }
}
