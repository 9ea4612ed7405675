//! XDG Base Directory and Application-Specific Path Resolution.
//!
//! Application directories are derived with `directories-next` from the
//! qualifier/organization/application triple below, e.g.
//! `~/.config/vitalis` and `~/.local/share/vitalis` on Linux.

use crate::error::{ConfigError, CoreError};
use directories_next::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

const QUALIFIER: &str = "org";
const ORGANIZATION: &str = "Vitalis";
const APPLICATION: &str = "Vitalis";

fn project_dirs(dir_type: &str) -> Result<ProjectDirs, CoreError> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION).ok_or_else(|| {
        CoreError::Config(ConfigError::DirectoryUnavailable { dir_type: dir_type.to_string() })
    })
}

/// Returns the application-specific configuration directory.
pub fn get_app_config_dir() -> Result<PathBuf, CoreError> {
    project_dirs("App Config").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Returns the application-specific data directory, where persisted
/// notification records live by default.
pub fn get_app_data_dir() -> Result<PathBuf, CoreError> {
    project_dirs("App Data").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Returns the application-specific state directory (log files).
///
/// On Linux this honours `$XDG_STATE_HOME` (default `~/.local/state`); other
/// platforms use the local data directory.
pub fn get_app_state_dir() -> Result<PathBuf, CoreError> {
    let base_dirs = BaseDirs::new().ok_or_else(|| {
        CoreError::Config(ConfigError::DirectoryUnavailable { dir_type: "State Base".to_string() })
    })?;

    #[cfg(target_os = "linux")]
    let state_base = match std::env::var("XDG_STATE_HOME") {
        Ok(state_home) if !state_home.is_empty() => PathBuf::from(state_home),
        _ => base_dirs.home_dir().join(".local/state"),
    };
    #[cfg(not(target_os = "linux"))]
    let state_base = base_dirs.data_local_dir().to_path_buf();

    Ok(state_base.join(ORGANIZATION).join(APPLICATION))
}
