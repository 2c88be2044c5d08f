//! Artifact download into the per-user cache.
//!
//! The cache filename is derived from the descriptor coordinates and its
//! existence is the only idempotence marker: when the file is present no
//! transfer happens. Bodies are streamed into a temporary file in the cache
//! directory and moved into place with a no-clobber rename, so the final
//! name only ever refers to a complete archive.

use crate::descriptor::ReleaseDescriptor;
use crate::endpoints::{Endpoints, redacted};
use crate::error::{FetchError, Result};
use crate::http::HttpTransport;
use crate::naming::{ArchiveName, LATEST_LINK_NAME, check_target};
use crate::output::write_stderr_line;
use crate::token::SessionToken;
use log::{debug, info};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Inputs for one archive download.
#[derive(Debug, Clone, Copy)]
pub struct DownloadRequest<'a> {
    /// Descriptor returned by the catalog for `branch`.
    pub descriptor: &'a ReleaseDescriptor,
    /// Catalog platform identifier, e.g. `linux`.
    pub platform: &'a str,
    /// Release channel, e.g. `stable`.
    pub branch: &'a str,
    /// Session token authorising the transfer.
    pub session: Option<&'a SessionToken>,
}

impl<'a> DownloadRequest<'a> {
    /// Check that platform, branch and session token are all present.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::MissingParameters`] naming every blank value.
    pub fn validate(&self) -> Result<&'a SessionToken> {
        require_present(&[
            ("platform", Some(self.platform)),
            ("branch", Some(self.branch)),
            ("token", self.session.map(SessionToken::expose)),
        ])?;
        self.session.ok_or(FetchError::MissingParameters {
            missing: vec!["token"],
        })
    }
}

/// Check the platform and branch before anything is sent over the network.
///
/// # Errors
///
/// Returns [`FetchError::MissingParameters`] naming every blank value, and
/// [`FetchError::Naming`] when either value cannot appear in a cache file
/// name.
pub fn require_target(platform: &str, branch: &str) -> Result<()> {
    require_present(&[("platform", Some(platform)), ("branch", Some(branch))])?;
    Ok(check_target(platform, branch)?)
}

fn require_present(params: &[(&'static str, Option<&str>)]) -> Result<()> {
    let missing: Vec<&'static str> = params
        .iter()
        .filter(|(_, value)| value.is_none_or(|v| v.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(FetchError::MissingParameters { missing })
    }
}

/// Result of a successful [`ArtifactFetcher::download`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The archive was transferred and stored at `path`.
    Downloaded {
        /// Final location of the archive.
        path: PathBuf,
    },
    /// An archive with the same coordinates was already cached at `path`.
    AlreadyCached {
        /// Location of the existing archive.
        path: PathBuf,
    },
}

impl FetchOutcome {
    /// Location of the archive, whether new or cached.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Downloaded { path } | Self::AlreadyCached { path } => path,
        }
    }
}

/// Downloads archives into a cache directory.
pub struct ArtifactFetcher<'a> {
    transport: &'a dyn HttpTransport,
    endpoints: &'a Endpoints,
    cache_dir: &'a Path,
}

impl<'a> ArtifactFetcher<'a> {
    /// Create a fetcher storing archives in `cache_dir`.
    #[must_use]
    pub fn new(
        transport: &'a dyn HttpTransport,
        endpoints: &'a Endpoints,
        cache_dir: &'a Path,
    ) -> Self {
        Self {
            transport,
            endpoints,
            cache_dir,
        }
    }

    /// Download the archive described by `request` unless it is cached.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::MissingParameters`] before any request when a
    /// parameter is blank, [`FetchError::Naming`] before any request when a
    /// coordinate cannot be used in a file name, a descriptor error when no
    /// URL can be resolved, a transport error when the transfer fails, and an
    /// I/O error when the cache cannot be written. No partially written
    /// archive is left behind.
    pub fn download(
        &self,
        request: &DownloadRequest<'_>,
        stderr: &mut dyn Write,
    ) -> Result<FetchOutcome> {
        fs::create_dir_all(self.cache_dir).map_err(|err| FetchError::CacheDirUnavailable {
            reason: format!("cannot create {}: {err}", self.cache_dir.display()),
        })?;
        let session = request.validate()?;

        let name = ArchiveName::new(
            &self.endpoints.product,
            request.platform,
            request.branch,
            request.descriptor.version(),
            request.descriptor.short_commit_id(),
        )?;
        let url = request.descriptor.resolve_url(
            self.endpoints,
            request.platform,
            request.branch,
            session,
        )?;
        let destination = self.cache_dir.join(name.filename());
        if destination.exists() {
            return Ok(already_cached(destination, stderr));
        }

        write_stderr_line(
            stderr,
            format!("Downloading {name} from {}", redacted(&url)),
        );
        let mut body = self.transport.open(&url)?;
        let mut staging = NamedTempFile::new_in(self.cache_dir)?;
        io::copy(&mut body, staging.as_file_mut())?;

        match staging.persist_noclobber(&destination) {
            Ok(_) => {}
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                return Ok(already_cached(destination, stderr));
            }
            Err(err) => return Err(FetchError::Io(err.error)),
        }

        update_latest_link(self.cache_dir, &name.filename());
        info!("saved {}", destination.display());
        Ok(FetchOutcome::Downloaded { path: destination })
    }
}

fn already_cached(path: PathBuf, stderr: &mut dyn Write) -> FetchOutcome {
    write_stderr_line(stderr, format!("Already downloaded: {}", path.display()));
    FetchOutcome::AlreadyCached { path }
}

/// Point `latest` at `filename`, ignoring failures.
fn update_latest_link(cache_dir: &Path, filename: &str) {
    let link = cache_dir.join(LATEST_LINK_NAME);
    match fs::remove_file(&link) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => {
            debug!("could not remove {}: {err}", link.display());
        }
        _ => {}
    }
    if let Err(err) = create_symlink(Path::new(filename), &link) {
        debug!("could not link {} to {filename}: {err}", link.display());
    }
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

#[cfg(not(any(unix, windows)))]
fn create_symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::from(io::ErrorKind::Unsupported))
}

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;
