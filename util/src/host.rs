//! Host environment utility functions

use std::env;
use std::path::PathBuf;

/// Name of the environment variable pointing at the software root directory.
///
/// The root contains the `params` directory and is where session directories
/// are created.
pub const ROOT_ENV_VAR: &str = "GROUND_SPEED_ROOT";

/// Get the software root directory from the environment.
pub fn get_ground_speed_root() -> Result<PathBuf, env::VarError> {
    env::var(ROOT_ENV_VAR).map(PathBuf::from)
}
