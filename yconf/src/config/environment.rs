//! Configuration file location.
//!
//! The file path comes from the `YCONF_CONFIG_FILE` environment variable and
//! falls back to `config.yaml` in the current directory.

use crate::error::{Error, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the configuration file path.
pub const CONFIG_FILE_ENV: &str = "YCONF_CONFIG_FILE";

/// File name used when no override is set.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Resolves the configuration file location.
///
/// # Examples
///
/// ```no_run
/// use yconf::config::EnvironmentConfig;
///
/// let path = EnvironmentConfig::config_file().unwrap();
/// println!("Loading {}", path.display());
/// ```
pub struct EnvironmentConfig;

impl EnvironmentConfig {
    /// Returns the absolute path of the configuration file.
    ///
    /// Reads `YCONF_CONFIG_FILE` and falls back to `./config.yaml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be expanded or the current
    /// directory cannot be determined.
    pub fn config_file() -> Result<PathBuf> {
        match env::var_os(CONFIG_FILE_ENV) {
            Some(value) if !value.is_empty() => {
                let path = PathBuf::from(value);
                log::debug!("Using {CONFIG_FILE_ENV}={}", path.display());
                Self::resolve(&path)
            }
            _ => Self::resolve(Path::new(DEFAULT_CONFIG_FILE)),
        }
    }

    /// Expands `~` and makes `path` absolute against the current directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be expanded or the current
    /// directory cannot be determined.
    pub fn resolve(path: &Path) -> Result<PathBuf> {
        let expanded = Self::expand_tilde(path)?;
        if expanded.is_absolute() {
            Ok(expanded)
        } else {
            Ok(env::current_dir()?.join(expanded))
        }
    }

    /// Expand a leading `~` to the user's home directory.
    ///
    /// Only `~` and `~/...` are supported; `~user` is rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not valid UTF-8, the home directory
    /// cannot be determined, or `~user` syntax is used.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use yconf::config::EnvironmentConfig;
    ///
    /// let plain = EnvironmentConfig::expand_tilde(Path::new("/etc/app.yaml")).unwrap();
    /// assert_eq!(plain, Path::new("/etc/app.yaml"));
    /// ```
    pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
        let path_str = path.to_str().ok_or_else(|| Error::InvalidPath {
            path: path.to_path_buf(),
            reason: "Path contains invalid UTF-8".to_string(),
        })?;

        if !path_str.starts_with('~') {
            return Ok(path.to_path_buf());
        }

        let home = home::home_dir().ok_or_else(|| Error::InvalidPath {
            path: path.to_path_buf(),
            reason: "Cannot determine home directory".to_string(),
        })?;

        if path_str == "~" {
            Ok(home)
        } else if path_str.starts_with("~/") || path_str.starts_with("~\\") {
            Ok(home.join(&path_str[2..]))
        } else {
            Err(Error::InvalidPath {
                path: path.to_path_buf(),
                reason: "~user syntax is not supported; use ~ or ~/path".to_string(),
            })
        }
    }
}
