//! HTTP transport for the vendor API, the identity toolkit, and artifact
//! downloads.
//!
//! Provides a trait-based abstraction over `ureq` so the identity, catalog
//! and fetch layers can be exercised without network access.

use crate::endpoints::redacted;
use std::io::Read;
use std::sync::OnceLock;
use url::Url;

/// Trait for issuing the requests the CLI needs.
///
/// Every call is blocking and issued one at a time; no implementation is
/// expected to retry.
///
/// # Examples
///
/// ```
/// use oni_fetch::http::UreqTransport;
///
/// let transport = UreqTransport;
/// // Use transport.get_text(&url) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait HttpTransport {
    /// `GET` the URL and return the response body as text.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx status.
    fn get_text(&self, url: &Url) -> Result<String, TransportError>;

    /// `POST` a JSON document and return the response body as text.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx status.
    fn post_json(&self, url: &Url, body: &str) -> Result<String, TransportError>;

    /// `GET` the URL and return a reader over the response body.
    ///
    /// The body is not buffered; the caller pulls it at its own pace.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx status.
    fn open(&self, url: &Url) -> Result<Box<dyn Read>, TransportError>;
}

/// Errors arising from HTTP requests.
///
/// URLs are stored in redacted form so errors can be printed safely.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("request to {url} failed with HTTP status {status}")]
    Status {
        /// The redacted URL that was requested.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The request could not be completed.
    #[error("request to {url} failed: {reason}")]
    Request {
        /// The redacted URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The response body could not be read.
    #[error("failed to read response from {url}: {reason}")]
    Body {
        /// The redacted URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },
}

/// HTTP transport using `ureq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl HttpTransport for UreqTransport {
    fn get_text(&self, url: &Url) -> Result<String, TransportError> {
        let response = http_agent()
            .get(url.as_str())
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        read_body(url, response)
    }

    fn post_json(&self, url: &Url, body: &str) -> Result<String, TransportError> {
        let response = http_agent()
            .post(url.as_str())
            .header("Content-Type", "application/json")
            .send(body)
            .map_err(|e| map_ureq_error(url, &e))?;
        read_body(url, response)
    }

    fn open(&self, url: &Url) -> Result<Box<dyn Read>, TransportError> {
        let response = http_agent()
            .get(url.as_str())
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        Ok(Box::new(response.into_body().into_reader()))
    }
}

fn read_body(
    url: &Url,
    response: ureq::http::Response<ureq::Body>,
) -> Result<String, TransportError> {
    response
        .into_body()
        .read_to_string()
        .map_err(|e| TransportError::Body {
            url: redacted(url),
            reason: e.to_string(),
        })
}

/// Shared `ureq` agent.
///
/// No global timeout is configured: artifact bodies can be large and a
/// transfer is allowed to run until it completes.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(ureq::Agent::new_with_defaults)
}

/// Map a ureq error to a [`TransportError`].
fn map_ureq_error(url: &Url, err: &ureq::Error) -> TransportError {
    match err {
        ureq::Error::StatusCode(status) => TransportError::Status {
            url: redacted(url),
            status: *status,
        },
        other => TransportError::Request {
            url: redacted(url),
            reason: other.to_string(),
        },
    }
}
