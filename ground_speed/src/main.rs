//! Ground speed executable entry point.
//!
//! # Architecture
//!
//! - Start a session and the logger
//! - Load the speed controller and run parameters
//! - Main loop, once per tick:
//!     - Evaluate the target profile
//!     - Speed control processing
//!     - Simulation step
//!     - Archive the tick
//! - Save the run summary into the session
//!
//! # Usage
//!
//! `gs_exec [RUN_PARAMS]`, where `RUN_PARAMS` is a file in
//! `$GROUND_SPEED_ROOT/params`, `run.toml` by default.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{Report, eyre::{WrapErr, eyre}};
use log::{debug, info};
use std::env;

// Internal
use gs_lib::{
    run::{Run, RunParams},
    speed_ctrl::{self, RefSpeedCtrl}
};
use util::{
    logger::{logger_init_with_targets, LevelFilter, TICK_TARGETS},
    session::Session
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const DEFAULT_RUN_PARAMS: &str = "run.toml";

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    let session = Session::new(
        "gs_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Per-tick output stays at debug, everything else is traced
    let tick_levels: Vec<(&'static str, LevelFilter)> = TICK_TARGETS.iter()
        .map(|t| (*t, LevelFilter::Debug))
        .collect();
    logger_init_with_targets(LevelFilter::Trace, &tick_levels, &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Ground Speed Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let args: Vec<String> = env::args().collect();
    debug!("CLI arguments: {:?}", args);

    let run_params_file = match args.len() {
        1 => DEFAULT_RUN_PARAMS,
        2 => args[1].as_str(),
        n => return Err(eyre!(
            "Expected zero or one argument, found {}", n - 1
        ))
    };

    let ctrl_params: speed_ctrl::Params = util::params::load("speed_ctrl.toml")
        .wrap_err("Could not load speed control params")?;
    let run_params: RunParams = util::params::load(run_params_file)
        .wrap_err_with(|| format!("Could not load run params from {}", run_params_file))?;

    info!("Parameters loaded");
    debug!("{:#?}", ctrl_params);
    debug!("{:#?}", run_params);

    // ---- INITIALISE MODULES ----

    let controller = RefSpeedCtrl::from_params(ctrl_params)
        .wrap_err("Failed to initialise the reference speed controller")?;

    let mut run = Run::new(run_params, controller, Some(&session))
        .wrap_err("Failed to initialise the run")?;

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    run.run_to_end().wrap_err("Error during the run")?;

    // ---- SHUTDOWN ----

    session.save_json("summary.json", run.summary())
        .wrap_err("Failed to save the run summary")?;

    info!("Summary: {:#?}", run.summary());
    info!("End of session");

    Ok(())
}
