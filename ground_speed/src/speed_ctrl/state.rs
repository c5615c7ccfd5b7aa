//! Implementations for the SpeedCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{ControlCommand, CtrlMode, SpeedController, SpeedCtrlError};
use util::{
    module::State,
    archive::{Archived, Archiver},
    session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Speed control module state.
///
/// Wraps a `SpeedController`, checking the inputs it is given and the
/// commands it produces, and archiving its decisions.
pub struct SpeedCtrl<C> {
    controller: C,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    pub(crate) output: Option<ControlCommand>,
    arch_output: Archiver
}

/// Input data to Speed Control.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputData {
    /// Current forward velocity of the vehicle.
    ///
    /// Units: uu/s
    pub velocity: f64,

    /// Velocity to drive toward.
    ///
    /// Units: uu/s
    pub target_velocity: f64,

    /// Length of the tick the command will be applied over.
    ///
    /// Units: seconds
    pub dt: f64
}

/// Status report for SpeedCtrl processing.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct StatusReport {
    /// Target minus current velocity.
    pub velocity_error: f64,

    /// The controller's regime, if it reports one.
    pub mode: Option<CtrlMode>
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<C: SpeedController> State for SpeedCtrl<C> {
    type InitData = C;
    type InitError = SpeedCtrlError;

    type InputData = InputData;
    type OutputData = ControlCommand;
    type StatusReport = StatusReport;
    type ProcError = SpeedCtrlError;

    /// Initialise the SpeedCtrl module.
    ///
    /// Expected init data is the controller to wrap.
    fn init(init_data: Self::InitData, session: Option<&Session>)
        -> Result<Self, Self::InitError>
    {
        let mut ctrl = Self {
            controller: init_data,
            report: StatusReport::default(),
            arch_report: Archiver::default(),
            output: None,
            arch_output: Archiver::default()
        };

        // Initialise the archivers
        if let Some(session) = session {
            ctrl.arch_report = Archiver::from_path(
                session, "speed_ctrl/status_report.csv"
            ).map_err(|e| SpeedCtrlError::ArchiveInitError(e.to_string()))?;
            ctrl.arch_output = Archiver::from_path(
                session, "speed_ctrl/output.csv"
            ).map_err(|e| SpeedCtrlError::ArchiveInitError(e.to_string()))?;
        }

        Ok(ctrl)
    }

    /// Perform cyclic processing of Speed Control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let InputData { velocity, target_velocity, dt } = *input_data;

        if !velocity.is_finite() || !target_velocity.is_finite() {
            return Err(SpeedCtrlError::NonFiniteInput { velocity, target_velocity })
        }
        if !(dt > 0.0) || !dt.is_finite() {
            return Err(SpeedCtrlError::InvalidDt(dt))
        }

        let cmd = self.controller.command(velocity, target_velocity, dt);

        // A substituted controller must still meet the command contract
        if !cmd.is_valid() {
            return Err(SpeedCtrlError::InvalidCommand(cmd))
        }

        self.report = StatusReport {
            velocity_error: target_velocity - velocity,
            mode: self.controller.last_mode()
        };
        self.output = Some(cmd);

        trace!("SpeedCtrl output: throttle {:.3}, boost {}", cmd.throttle, cmd.boost);

        Ok((cmd, self.report))
    }
}

impl<C> Archived for SpeedCtrl<C> {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.arch_report.serialise(self.report)?;
        if let Some(output) = self.output {
            self.arch_output.serialise(output)?;
        }

        Ok(())
    }
}

impl<C> SpeedCtrl<C> {
    /// The wrapped controller.
    pub fn controller(&self) -> &C {
        &self.controller
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::consts::SIMULATION_DT;
    use crate::speed_ctrl::RefSpeedCtrl;

    #[test]
    fn test_proc_reference() {
        let mut ctrl = SpeedCtrl::init(RefSpeedCtrl::default(), None).unwrap();

        let (cmd, report) = ctrl.proc(&InputData {
            velocity: 1000.0,
            target_velocity: 0.0,
            dt: SIMULATION_DT
        }).unwrap();

        assert_eq!(cmd, ControlCommand::new(-1.0, false));
        assert_eq!(report.mode, Some(CtrlMode::Brake));
        assert_eq!(report.velocity_error, -1000.0);
        assert_eq!(ctrl.output, Some(cmd));
    }

    #[test]
    fn test_proc_rejects_bad_input() {
        let mut ctrl = SpeedCtrl::init(RefSpeedCtrl::default(), None).unwrap();

        match ctrl.proc(&InputData { velocity: f64::NAN, target_velocity: 0.0, dt: 0.1 }) {
            Err(SpeedCtrlError::NonFiniteInput { .. }) => (),
            r => panic!("Expected NonFiniteInput, got {:?}", r)
        }
        match ctrl.proc(&InputData { velocity: 0.0, target_velocity: 0.0, dt: -0.1 }) {
            Err(SpeedCtrlError::InvalidDt(_)) => (),
            r => panic!("Expected InvalidDt, got {:?}", r)
        }
        assert_eq!(ctrl.output, None);
    }

    #[test]
    fn test_proc_rejects_bad_controller() {
        let greedy = |_v: f64, _r: f64, _dt: f64| ControlCommand::new(2.0, false);
        let mut ctrl = SpeedCtrl::init(greedy, None).unwrap();

        match ctrl.proc(&InputData { velocity: 0.0, target_velocity: 100.0, dt: 0.1 }) {
            Err(SpeedCtrlError::InvalidCommand(c)) => assert_eq!(c.throttle, 2.0),
            r => panic!("Expected InvalidCommand, got {:?}", r)
        }
    }

    #[test]
    fn test_archives() {
        let root = tempfile::tempdir().unwrap();
        let session = Session::new_in(root.path(), "speed_ctrl_test", "sessions").unwrap();
        let mut ctrl = SpeedCtrl::init(RefSpeedCtrl::default(), Some(&session)).unwrap();

        for v in [0.0, 500.0, 1000.0].iter() {
            ctrl.proc(&InputData { velocity: *v, target_velocity: 500.0, dt: SIMULATION_DT })
                .unwrap();
            ctrl.write().unwrap();
        }

        let output = std::fs::read_to_string(
            session.arch_root.join("speed_ctrl/output.csv")
        ).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "throttle,boost");
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[3], "-1.0,false");

        let report = std::fs::read_to_string(
            session.arch_root.join("speed_ctrl/status_report.csv")
        ).unwrap();
        assert!(report.lines().nth(1).unwrap().ends_with("Boost"));
    }
}
