//! Error types for the oni-fetch CLI.
//!
//! Every fatal condition in the authenticate-then-download flow is a variant
//! of [`FetchError`]. Variants carry enough context to tell the user what to
//! fix; none of them include license keys or tokens in clear text.

use crate::descriptor::DescriptorError;
use crate::endpoints::EndpointError;
use crate::http::TransportError;
use crate::naming::NamingError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while talking to the vendor services or writing
/// into the cache directory.
#[derive(Debug, Error)]
pub enum FetchError {
    /// No license key was found in the environment or the config file.
    #[error("{} must have\nLICENSE_KEY=XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX", .path.display())]
    MissingLicenseKey {
        /// Config file that was expected to define the key.
        path: PathBuf,
    },

    /// The config file exists but could not be parsed.
    #[error("invalid config file {}: {reason}", .path.display())]
    InvalidConfigFile {
        /// Path to the config file.
        path: PathBuf,
        /// Description of the parse error.
        reason: String,
    },

    /// The vendor rejected the license key.
    #[error("license key was rejected by the license server")]
    LicenseRejected,

    /// The identity toolkit did not return a usable session token.
    #[error("authentication failed: {reason}")]
    AuthenticationFailed {
        /// Description of why authentication failed.
        reason: String,
    },

    /// Required download parameters were blank.
    #[error("missing download parameters: {}", .missing.join(", "))]
    MissingParameters {
        /// Names of the parameters that were missing.
        missing: Vec<&'static str>,
    },

    /// A request URL could not be assembled from the configured endpoints.
    #[error(transparent)]
    Endpoint(#[from] EndpointError),

    /// A request failed at the transport level or returned a non-2xx status.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A response body was not the JSON shape the endpoint promises.
    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse {
        /// Logical name of the endpoint.
        endpoint: &'static str,
        /// Description of what was wrong with the body.
        reason: String,
    },

    /// The download descriptor could not be turned into a source URL.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    /// A coordinate cannot be used in the cache file name.
    #[error(transparent)]
    Naming(#[from] NamingError),

    /// The account info response contained no user records.
    #[error("account info contained no user records")]
    NoAccountRecords,

    /// The cache directory could not be determined or created.
    #[error("cache directory unavailable: {reason}")]
    CacheDirUnavailable {
        /// Description of the failure.
        reason: String,
    },

    /// No license file was given and the config directory could not be
    /// determined.
    #[error("config directory unavailable: {reason}")]
    ConfigDirUnavailable {
        /// Description of the failure.
        reason: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to write command output.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Build a [`FetchError::MalformedResponse`] from a serde error.
    pub(crate) fn malformed(endpoint: &'static str, err: &serde_json::Error) -> Self {
        Self::MalformedResponse {
            endpoint,
            reason: err.to_string(),
        }
    }
}

/// Result type alias using [`FetchError`].
pub type Result<T> = std::result::Result<T, FetchError>;
