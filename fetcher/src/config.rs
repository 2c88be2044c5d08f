//! Per-invocation client configuration.
//!
//! [`ClientConfig`] gathers everything the commands need from the outside
//! world: endpoint bases, the cache directory and the license file location.
//! It is built once in `main` and passed down explicitly.
//!
//! The license key is read from `LICENSE_KEY` in the process environment or,
//! failing that, from the per-user license file in dotenv format:
//!
//! ```text
//! LICENSE_KEY=XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX
//! ```

use crate::cli::Cli;
use crate::dirs::{BaseDirs, artifact_cache_dir, license_file_path};
use crate::endpoints::Endpoints;
use crate::error::{FetchError, Result};
use crate::token::LicenseKey;
use log::debug;
use std::path::{Path, PathBuf};

/// Name of the variable holding the license key.
pub const LICENSE_KEY_VAR: &str = "LICENSE_KEY";

/// Resolved configuration for one CLI invocation.
///
/// Directories are optional so commands that never touch the disk, such as
/// `head`, still run when the platform directories cannot be determined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Remote service layout.
    pub endpoints: Endpoints,
    /// Directory holding cached archives and the `latest` link.
    pub cache_dir: Option<PathBuf>,
    /// dotenv-format file expected to define `LICENSE_KEY`.
    pub license_file: Option<PathBuf>,
}

impl ClientConfig {
    /// Build the configuration from CLI overrides and platform directories.
    ///
    /// Directories that cannot be determined are left unset and reported by
    /// [`ClientConfig::cache_dir`] and [`ClientConfig::license_file`] when a
    /// command needs them.
    #[must_use]
    pub fn from_cli(cli: &Cli, dirs: &dyn BaseDirs) -> Self {
        Self {
            endpoints: Endpoints::default(),
            cache_dir: cli
                .cache_dir
                .clone()
                .or_else(|| artifact_cache_dir(dirs)),
            license_file: cli
                .license_file
                .clone()
                .or_else(|| license_file_path(dirs)),
        }
    }

    /// Directory for cached archives.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::CacheDirUnavailable`] when none was given and
    /// none could be determined.
    pub fn cache_dir(&self) -> Result<&Path> {
        self.cache_dir
            .as_deref()
            .ok_or_else(|| FetchError::CacheDirUnavailable {
                reason: "could not determine the user cache directory".to_owned(),
            })
    }

    /// Location of the license file.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ConfigDirUnavailable`] when none was given and
    /// no config directory could be determined.
    pub fn license_file(&self) -> Result<&Path> {
        self.license_file
            .as_deref()
            .ok_or_else(|| FetchError::ConfigDirUnavailable {
                reason: "could not determine the user config directory".to_owned(),
            })
    }

    /// Load the license key, preferring the process environment.
    ///
    /// A key in the environment is used even when no license file location
    /// is known.
    ///
    /// # Errors
    ///
    /// See [`resolve_license_key`]. Returns
    /// [`FetchError::ConfigDirUnavailable`] when the environment has no key
    /// and there is no license file location.
    pub fn license_key(&self) -> Result<LicenseKey> {
        let env_value = std::env::var(LICENSE_KEY_VAR).ok();
        match self.license_file() {
            Ok(path) => resolve_license_key(env_value.as_deref(), path),
            Err(err) => env_value.as_deref().and_then(LicenseKey::new).ok_or(err),
        }
    }
}

/// Resolve the license key from an environment value or the license file.
///
/// A non-blank `env_value` wins, matching dotenv semantics where existing
/// variables are never overridden by the file.
///
/// # Errors
///
/// Returns [`FetchError::MissingLicenseKey`] when neither source defines a
/// non-blank key, and [`FetchError::InvalidConfigFile`] when the file exists
/// but cannot be parsed.
pub fn resolve_license_key(env_value: Option<&str>, license_file: &Path) -> Result<LicenseKey> {
    if let Some(key) = env_value.and_then(LicenseKey::new) {
        debug!("using {LICENSE_KEY_VAR} from the environment");
        return Ok(key);
    }

    if !license_file.is_file() {
        return Err(FetchError::MissingLicenseKey {
            path: license_file.to_path_buf(),
        });
    }

    read_license_file(license_file)?
        .and_then(|value| LicenseKey::new(&value))
        .ok_or_else(|| FetchError::MissingLicenseKey {
            path: license_file.to_path_buf(),
        })
}

/// Return the `LICENSE_KEY` value defined in a dotenv file, if any.
fn read_license_file(path: &Path) -> Result<Option<String>> {
    let invalid = |reason: String| FetchError::InvalidConfigFile {
        path: path.to_path_buf(),
        reason,
    };

    let entries = dotenv::from_path_iter(path).map_err(|e| invalid(e.to_string()))?;
    for entry in entries {
        let (name, value) = entry.map_err(|e| invalid(e.to_string()))?;
        if name == LICENSE_KEY_VAR {
            debug!("using {LICENSE_KEY_VAR} from {}", path.display());
            return Ok(Some(value));
        }
    }
    Ok(None)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
