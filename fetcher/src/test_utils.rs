//! Shared test utilities for the oni-fetch crate.

use crate::endpoints::Endpoints;
use crate::http::{HttpTransport, TransportError};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{Cursor, Read};
use url::Url;

/// License key accepted by the stubbed handshake.
pub const TEST_LICENSE_KEY: &str = "AAAAAAAA-BBBB-CCCC-DDDD-EEEEEEEEEEEE";

/// Session token issued by [`handshake`].
pub const TEST_SESSION_TOKEN: &str = "session-token-0123456789";

/// Kind of request a [`StubTransport`] call represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// [`HttpTransport::get_text`].
    Get,
    /// [`HttpTransport::post_json`].
    Post,
    /// [`HttpTransport::open`].
    Open,
}

/// Represents an expected request and its scripted response.
#[derive(Debug)]
pub struct ExpectedRequest {
    /// Expected request kind.
    pub method: Method,
    /// Expected URL path, e.g. `/api/getReleaseNotes`.
    pub path: String,
    /// Body or error to answer with.
    pub response: Result<Vec<u8>, TransportError>,
}

impl ExpectedRequest {
    /// Expect a `GET` of `path` answered with `body`.
    pub fn get(path: &str, body: impl Into<String>) -> Self {
        Self::ok(Method::Get, path, body.into().into_bytes())
    }

    /// Expect a JSON `POST` to `path` answered with `body`.
    pub fn post(path: &str, body: impl Into<String>) -> Self {
        Self::ok(Method::Post, path, body.into().into_bytes())
    }

    /// Expect a streamed download of `path` answered with `bytes`.
    pub fn open(path: &str, bytes: &[u8]) -> Self {
        Self::ok(Method::Open, path, bytes.to_vec())
    }

    /// Expect a request of `method` to `path` answered with `status`.
    pub fn status(method: Method, path: &str, status: u16) -> Self {
        Self {
            method,
            path: path.to_owned(),
            response: Err(TransportError::Status {
                url: path.to_owned(),
                status,
            }),
        }
    }

    fn ok(method: Method, path: &str, bytes: Vec<u8>) -> Self {
        Self {
            method,
            path: path.to_owned(),
            response: Ok(bytes),
        }
    }
}

/// A request observed by a [`StubTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Request kind.
    pub method: Method,
    /// Full URL, including query.
    pub url: Url,
    /// JSON body for `POST` requests.
    pub body: Option<String>,
}

/// A stub implementation of [`HttpTransport`] for testing.
///
/// Answers requests in the order they were scripted and records every
/// request it receives.
#[derive(Debug, Default)]
pub struct StubTransport {
    expected: RefCell<VecDeque<ExpectedRequest>>,
    recorded: RefCell<Vec<RecordedRequest>>,
}

impl StubTransport {
    /// Creates a new `StubTransport` with the given expected requests.
    pub fn new(expected: Vec<ExpectedRequest>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
            recorded: RefCell::new(Vec::new()),
        }
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.recorded.borrow().clone()
    }

    /// Asserts that all expected requests have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if scripted requests were not issued.
    pub fn assert_finished(&self) {
        assert!(
            self.expected.borrow().is_empty(),
            "expected no further requests"
        );
    }

    fn answer(
        &self,
        method: Method,
        url: &Url,
        body: Option<&str>,
    ) -> Result<Vec<u8>, TransportError> {
        self.recorded.borrow_mut().push(RecordedRequest {
            method,
            url: url.clone(),
            body: body.map(str::to_owned),
        });
        let call = self
            .expected
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected {method:?} request to {url}"));

        assert_eq!(call.method, method, "request kind for {url}");
        assert_eq!(call.path, url.path(), "request path");
        call.response
    }
}

impl HttpTransport for StubTransport {
    fn get_text(&self, url: &Url) -> Result<String, TransportError> {
        let bytes = self.answer(Method::Get, url, None)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn post_json(&self, url: &Url, body: &str) -> Result<String, TransportError> {
        let bytes = self.answer(Method::Post, url, Some(body))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn open(&self, url: &Url) -> Result<Box<dyn Read>, TransportError> {
        let bytes = self.answer(Method::Open, url, None)?;
        Ok(Box::new(Cursor::new(bytes)))
    }
}

/// Endpoints on reserved test hosts; the paths scripted by [`handshake`]
/// assume this layout.
pub fn test_endpoints() -> Endpoints {
    Endpoints {
        vendor_base: "https://vendor.test".to_owned(),
        identity_base: "https://identity.test/v3".to_owned(),
        identity_api_key: "test-api-key".to_owned(),
        direct_download_base: "https://downloads.test".to_owned(),
        product: "Product".to_owned(),
    }
}

/// Expected requests for a successful handshake issuing
/// [`TEST_SESSION_TOKEN`].
pub fn handshake() -> Vec<ExpectedRequest> {
    vec![
        ExpectedRequest::get("/api/isLicenseKeyValid", "true"),
        ExpectedRequest::get("/auth/licenseKey", r#"{"token":"vendor-token"}"#),
        ExpectedRequest::post(
            "/v3/verifyCustomToken",
            serde_json::json!({ "idToken": TEST_SESSION_TOKEN }).to_string(),
        ),
    ]
}

/// Builds a templated download descriptor body.
pub fn templated_descriptor(version: &str, short_commit_id: &str) -> String {
    serde_json::json!({ "version": version, "shortCommitId": short_commit_id }).to_string()
}

/// Builds a structured download descriptor body listing `artifacts`.
pub fn structured_descriptor(
    version: &str,
    short_commit_id: &str,
    artifacts: &[(&str, &str)],
) -> String {
    let links: serde_json::Map<String, serde_json::Value> = artifacts
        .iter()
        .map(|(platform, tar)| ((*platform).to_owned(), serde_json::json!({ "tar": tar })))
        .collect();
    serde_json::json!({
        "version": version,
        "shortCommitId": short_commit_id,
        "artifacts": links,
    })
    .to_string()
}

/// Builds a release notes body.
pub fn release_notes(commit_id: &str) -> String {
    serde_json::json!({ "commitId": commit_id }).to_string()
}
