//! Directory resolution abstraction for platform-specific paths.
//!
//! The config file and the artifact cache live under the user's platform
//! directories (`~/.config` and `~/.cache` on Linux). Resolution goes through
//! the [`BaseDirs`] trait so tests can point both at temporary directories.

use std::path::PathBuf;

/// Application directory name used under the platform config and cache roots.
pub const APP_DIR_NAME: &str = "oni-fetch";

/// File name of the per-user license file inside the config directory.
pub const LICENSE_FILE_NAME: &str = "licenseKey";

/// Platform directory lookups used by the CLI.
#[cfg_attr(test, mockall::automock)]
pub trait BaseDirs {
    /// Return the user's configuration root (for example `~/.config`).
    fn config_dir(&self) -> Option<PathBuf>;

    /// Return the user's cache root (for example `~/.cache`).
    fn cache_dir(&self) -> Option<PathBuf>;
}

/// [`BaseDirs`] implementation backed by `directories-next`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBaseDirs;

impl BaseDirs for SystemBaseDirs {
    fn config_dir(&self) -> Option<PathBuf> {
        directories_next::BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf())
    }

    fn cache_dir(&self) -> Option<PathBuf> {
        directories_next::BaseDirs::new().map(|dirs| dirs.cache_dir().to_path_buf())
    }
}

/// Path of the per-user license file, `<config_dir>/oni-fetch/licenseKey`.
#[must_use]
pub fn license_file_path(dirs: &dyn BaseDirs) -> Option<PathBuf> {
    dirs.config_dir()
        .map(|root| root.join(APP_DIR_NAME).join(LICENSE_FILE_NAME))
}

/// Path of the artifact cache directory, `<cache_dir>/oni-fetch`.
#[must_use]
pub fn artifact_cache_dir(dirs: &dyn BaseDirs) -> Option<PathBuf> {
    dirs.cache_dir().map(|root| root.join(APP_DIR_NAME))
}
