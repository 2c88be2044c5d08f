//! License-key authentication against the vendor and the identity toolkit.
//!
//! Authentication is a three-request handshake: the vendor confirms the
//! license key is valid, exchanges it for a vendor token, and the identity
//! toolkit verifies that token into a session token. Each step is exposed
//! on its own so the `license` command can stop after the first.

use crate::endpoints::Endpoints;
use crate::error::{FetchError, Result};
use crate::http::HttpTransport;
use crate::token::{LicenseKey, SessionToken, VendorToken};
use log::debug;
use serde::Deserialize;

/// Body of `isLicenseKeyValid`: either a bare boolean or `{"valid": bool}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ValidityResponse {
    Bare(bool),
    Wrapped { valid: bool },
}

impl ValidityResponse {
    const fn is_valid(&self) -> bool {
        match self {
            Self::Bare(valid) | Self::Wrapped { valid } => *valid,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExchangeResponse {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyResponse {
    #[serde(default)]
    id_token: Option<String>,
}

/// Client for the authentication handshake.
pub struct IdentityGateway<'a> {
    transport: &'a dyn HttpTransport,
    endpoints: &'a Endpoints,
}

impl<'a> IdentityGateway<'a> {
    /// Create a gateway issuing requests through `transport`.
    #[must_use]
    pub fn new(transport: &'a dyn HttpTransport, endpoints: &'a Endpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    /// Ask the vendor whether `key` is a valid license key.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an unrecognised body.
    pub fn check_license_key(&self, key: &LicenseKey) -> Result<bool> {
        let url = self.endpoints.license_validation(key)?;
        let body = self.transport.get_text(&url)?;
        let validity: ValidityResponse = serde_json::from_str(&body)
            .map_err(|e| FetchError::malformed("isLicenseKeyValid", &e))?;
        debug!("license key {key:?} valid: {}", validity.is_valid());
        Ok(validity.is_valid())
    }

    /// Exchange `key` for a vendor token.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::MalformedResponse`] when the body is not JSON
    /// or lacks `token`, and a transport error on request failure.
    pub fn exchange_license_key(&self, key: &LicenseKey) -> Result<VendorToken> {
        let url = self.endpoints.license_exchange(key)?;
        let body = self.transport.get_text(&url)?;
        let response: ExchangeResponse = serde_json::from_str(&body)
            .map_err(|e| FetchError::malformed("auth/licenseKey", &e))?;
        let token = response.token.ok_or_else(|| FetchError::MalformedResponse {
            endpoint: "auth/licenseKey",
            reason: "missing `token`".to_owned(),
        })?;
        Ok(VendorToken::new(token))
    }

    /// Verify a vendor token into a session token.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::AuthenticationFailed`] when the response carries
    /// no `idToken` or an empty one.
    pub fn verify_token(&self, vendor_token: &VendorToken) -> Result<SessionToken> {
        let url = self.endpoints.verify_custom_token()?;
        let request = serde_json::json!({
            "token": vendor_token.expose(),
            "returnSecureToken": true,
        });
        let body = self.transport.post_json(&url, &request.to_string())?;
        let response: VerifyResponse = serde_json::from_str(&body)
            .map_err(|e| FetchError::malformed("verifyCustomToken", &e))?;
        response
            .id_token
            .and_then(SessionToken::new)
            .ok_or_else(|| FetchError::AuthenticationFailed {
                reason: "identity toolkit returned no session token".to_owned(),
            })
    }

    /// Run the full handshake for `key`.
    ///
    /// A key the vendor reports as invalid is rejected before the exchange
    /// is attempted.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::LicenseRejected`] for invalid keys,
    /// [`FetchError::AuthenticationFailed`] when no session token is issued,
    /// or any error from the individual steps.
    pub fn authenticate(&self, key: &LicenseKey) -> Result<SessionToken> {
        if !self.check_license_key(key)? {
            return Err(FetchError::LicenseRejected);
        }
        let vendor_token = self.exchange_license_key(key)?;
        match self.verify_token(&vendor_token) {
            Ok(session) => {
                debug!("authenticated; session {session:?}");
                Ok(session)
            }
            Err(err) => {
                debug!("authentication failed for {key:?} with {vendor_token:?}: {err}");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
