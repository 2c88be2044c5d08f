//! Subcommand implementations.
//!
//! Each command is a short sequence over the identity, catalog and fetch
//! clients. Results are written to the injected stdout; progress lines go to
//! stderr.

use crate::catalog::Catalog;
use crate::cli::{Cli, Command};
use crate::config::ClientConfig;
use crate::error::{FetchError, Result};
use crate::fetch::{ArtifactFetcher, DownloadRequest, FetchOutcome, require_target};
use crate::http::HttpTransport;
use crate::identity::IdentityGateway;
use crate::output::{write_json, write_stdout_line};
use crate::token::SessionToken;
use log::info;
use std::io::Write;

/// Everything a command needs besides its arguments.
pub struct CommandContext<'a> {
    /// Resolved configuration for this invocation.
    pub config: &'a ClientConfig,
    /// Transport used for every request.
    pub transport: &'a dyn HttpTransport,
}

impl<'a> CommandContext<'a> {
    /// Create a context over `config` and `transport`.
    #[must_use]
    pub fn new(config: &'a ClientConfig, transport: &'a dyn HttpTransport) -> Self {
        Self { config, transport }
    }

    /// Run the subcommand selected on the command line.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the selected command.
    pub fn run(&self, cli: &Cli, stdout: &mut dyn Write, stderr: &mut dyn Write) -> Result<()> {
        match cli.command {
            Command::License => self.license(),
            Command::Cur => self.cur(&cli.branch, stdout),
            Command::Account => self.account(stdout),
            Command::Head => self.head(stdout),
            Command::Download => self.download(&cli.platform, &cli.branch, stderr).map(|_| ()),
        }
    }

    /// Check the configured license key.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::LicenseRejected`] when the vendor reports the
    /// key as invalid.
    pub fn license(&self) -> Result<()> {
        let key = self.config.license_key()?;
        if self.identity().check_license_key(&key)? {
            Ok(())
        } else {
            Err(FetchError::LicenseRejected)
        }
    }

    /// Print the catalog's download answer for `branch` as returned.
    ///
    /// # Errors
    ///
    /// Returns an error when authentication or the catalog request fails.
    pub fn cur(&self, branch: &str, stdout: &mut dyn Write) -> Result<()> {
        let session = self.authenticate()?;
        let answer = self.catalog().downloads_raw(&session, branch)?;
        write_json(stdout, &answer)
    }

    /// Print the first account record.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::NoAccountRecords`] when the account has no
    /// users, or an error from authentication or the request.
    pub fn account(&self, stdout: &mut dyn Write) -> Result<()> {
        let session = self.authenticate()?;
        let info = self.catalog().account_info(&session)?;
        write_json(stdout, info.first_user()?)
    }

    /// Print the head commit id.
    ///
    /// # Errors
    ///
    /// Returns an error when the release notes cannot be fetched.
    pub fn head(&self, stdout: &mut dyn Write) -> Result<()> {
        let notes = self.catalog().release_notes()?;
        write_stdout_line(stdout, notes.commit_id)
    }

    /// Download the archive for `platform` and `branch`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::MissingParameters`] or [`FetchError::Naming`]
    /// before any request when `platform` or `branch` is unusable,
    /// [`FetchError::CacheDirUnavailable`] when there is no cache directory,
    /// or any error from authentication, the catalog or the transfer.
    pub fn download(
        &self,
        platform: &str,
        branch: &str,
        stderr: &mut dyn Write,
    ) -> Result<FetchOutcome> {
        require_target(platform, branch)?;
        let cache_dir = self.config.cache_dir()?;
        let session = self.authenticate()?;
        let descriptor = self.catalog().downloads(&session, branch)?;
        info!(
            "release {} ({}) on {branch}",
            descriptor.version(),
            descriptor.short_commit_id()
        );

        let request = DownloadRequest {
            descriptor: &descriptor,
            platform,
            branch,
            session: Some(&session),
        };
        ArtifactFetcher::new(self.transport, &self.config.endpoints, cache_dir)
            .download(&request, stderr)
    }

    fn authenticate(&self) -> Result<SessionToken> {
        let key = self.config.license_key()?;
        self.identity().authenticate(&key)
    }

    fn identity(&self) -> IdentityGateway<'a> {
        IdentityGateway::new(self.transport, &self.config.endpoints)
    }

    fn catalog(&self) -> Catalog<'a> {
        Catalog::new(self.transport, &self.config.endpoints)
    }
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
