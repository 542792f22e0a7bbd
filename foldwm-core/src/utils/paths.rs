//! XDG and application-specific path resolution via `directories-next`.
//!
//! Application directories are derived from the `org.foldwm.foldwm` project
//! triple. All functions yield [`ConfigError::DirectoryUnavailable`] when the
//! home directory cannot be determined.

use crate::error::{ConfigError, CoreError};
use directories_next::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

const QUALIFIER: &str = "org";
const ORGANIZATION: &str = "foldwm";
const APPLICATION: &str = "foldwm";

/// Environment variable overriding the system configuration file.
pub const SYSTEM_CONFIG_ENV: &str = "FOLDWM_SYSTEM_CONFIG";
const DEFAULT_SYSTEM_CONFIG_PATH: &str = "/etc/foldwm/config.toml";

/// `$XDG_CONFIG_HOME/foldwm` or the platform equivalent.
pub fn get_app_config_dir() -> Result<PathBuf, CoreError> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| {
            CoreError::Config(ConfigError::DirectoryUnavailable {
                dir_type: "App Config".to_string(),
            })
        })
}

/// `$XDG_STATE_HOME/foldwm/foldwm`, falling back to `~/.local/state`.
///
/// `directories-next` has no state directory, so the XDG variable is read
/// directly on Linux and `data_local_dir` is used elsewhere.
pub fn get_app_state_dir() -> Result<PathBuf, CoreError> {
    let base = BaseDirs::new()
        .map(|dirs| {
            #[cfg(target_os = "linux")]
            {
                match std::env::var("XDG_STATE_HOME") {
                    Ok(state_home) if !state_home.is_empty() => PathBuf::from(state_home),
                    _ => dirs.home_dir().join(".local/state"),
                }
            }
            #[cfg(not(target_os = "linux"))]
            {
                dirs.data_local_dir().to_path_buf()
            }
        })
        .ok_or_else(|| {
            CoreError::Config(ConfigError::DirectoryUnavailable {
                dir_type: "State Base".to_string(),
            })
        })?;
    Ok(base.join(ORGANIZATION).join(APPLICATION))
}

/// System-wide configuration file, honouring [`SYSTEM_CONFIG_ENV`].
pub fn get_system_config_path() -> PathBuf {
    match std::env::var_os(SYSTEM_CONFIG_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_SYSTEM_CONFIG_PATH),
    }
}
