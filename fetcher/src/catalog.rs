//! Release metadata, account info and download descriptors.

use crate::descriptor::ReleaseDescriptor;
use crate::endpoints::Endpoints;
use crate::error::{FetchError, Result};
use crate::http::HttpTransport;
use crate::token::SessionToken;
use log::debug;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Current release notes; only the head commit is interpreted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseNotes {
    /// Commit id at the head of the release branch.
    pub commit_id: String,
    /// Remaining fields, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Identity-toolkit account records for the session's user.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountInfo {
    /// User records, most relevant first.
    #[serde(default)]
    pub users: Vec<Value>,
}

impl AccountInfo {
    /// Return the first user record.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::NoAccountRecords`] when the list is empty.
    pub fn first_user(&self) -> Result<&Value> {
        self.users.first().ok_or(FetchError::NoAccountRecords)
    }
}

/// Client for the vendor catalog and identity-toolkit account lookups.
pub struct Catalog<'a> {
    transport: &'a dyn HttpTransport,
    endpoints: &'a Endpoints,
}

impl<'a> Catalog<'a> {
    /// Create a catalog client issuing requests through `transport`.
    #[must_use]
    pub fn new(transport: &'a dyn HttpTransport, endpoints: &'a Endpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    /// Fetch the current release notes. Requires no authentication.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or when `commitId` is missing.
    pub fn release_notes(&self) -> Result<ReleaseNotes> {
        let url = self.endpoints.release_notes()?;
        let body = self.transport.get_text(&url)?;
        serde_json::from_str(&body).map_err(|e| FetchError::malformed("getReleaseNotes", &e))
    }

    /// Fetch account records for the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a malformed body.
    pub fn account_info(&self, session: &SessionToken) -> Result<AccountInfo> {
        let url = self.endpoints.account_info()?;
        let request = serde_json::json!({ "idToken": session.expose() });
        let body = self.transport.post_json(&url, &request.to_string())?;
        serde_json::from_str(&body).map_err(|e| FetchError::malformed("getAccountInfo", &e))
    }

    /// Fetch the `getDownloads` answer for `branch` without interpreting it.
    ///
    /// Any JSON value is accepted, including objects that carry no release
    /// coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or when the body is not JSON.
    pub fn downloads_raw(&self, session: &SessionToken, branch: &str) -> Result<Value> {
        let body = self.downloads_body(session, branch)?;
        serde_json::from_str(&body).map_err(|e| FetchError::malformed("getDownloads", &e))
    }

    /// Fetch the download descriptor for `branch`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or when the descriptor lacks the
    /// coordinates needed to name the archive.
    pub fn downloads(&self, session: &SessionToken, branch: &str) -> Result<ReleaseDescriptor> {
        let body = self.downloads_body(session, branch)?;
        let descriptor = ReleaseDescriptor::parse(&body)?;
        debug!(
            "branch {branch}: version {} commit {}",
            descriptor.version(),
            descriptor.short_commit_id()
        );
        Ok(descriptor)
    }

    fn downloads_body(&self, session: &SessionToken, branch: &str) -> Result<String> {
        let url = self.endpoints.downloads(session, branch)?;
        Ok(self.transport.get_text(&url)?)
    }
}
