//! Credential newtypes for the authentication handshake.
//!
//! A license key is exchanged for a [`VendorToken`], which is in turn
//! verified into a [`SessionToken`]. All three wrap opaque strings; their
//! `Debug` output is redacted so credentials never reach log output by
//! accident.

use std::fmt;

/// Number of leading characters kept when a credential is redacted.
const REDACT_KEEP: usize = 8;

/// Return `value` truncated to its first few characters followed by `...`.
///
/// # Examples
///
/// ```
/// use oni_fetch::token::redact;
///
/// assert_eq!(redact("abcdefghijkl"), "abcdefgh...");
/// assert_eq!(redact("abc"), "abc...");
/// ```
#[must_use]
pub fn redact(value: &str) -> String {
    let kept: String = value.chars().take(REDACT_KEEP).collect();
    format!("{kept}...")
}

macro_rules! credential {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq)]
        pub struct $name(String);

        impl $name {
            /// Return the credential as a string slice.
            #[must_use]
            pub fn expose(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name))
                    .field(&redact(&self.0))
                    .finish()
            }
        }
    };
}

credential!(
    /// A user-supplied license key (`XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX`).
    ///
    /// Only presence is validated client side.
    LicenseKey
);

credential!(
    /// Intermediate token returned by the vendor's license exchange.
    VendorToken
);

credential!(
    /// Verified identity-toolkit `idToken`; the credential every
    /// authenticated catalog call requires.
    SessionToken
);

impl LicenseKey {
    /// Wrap a license key, returning `None` when it is blank.
    ///
    /// Surrounding whitespace is trimmed.
    #[must_use]
    pub fn new(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_owned()))
    }
}

impl VendorToken {
    /// Wrap a vendor token as returned by the license exchange.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl SessionToken {
    /// Wrap a session token, returning `None` when it is empty.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        (!value.is_empty()).then_some(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::blank("")]
    #[case::whitespace("   \n")]
    fn license_key_rejects_blank_values(#[case] value: &str) {
        assert!(LicenseKey::new(value).is_none());
    }

    #[test]
    fn license_key_trims_whitespace() {
        let key = LicenseKey::new("  ABCDEFGH-1234-5678-9ABC-DEF012345678\n").expect("valid key");
        assert_eq!(key.expose(), "ABCDEFGH-1234-5678-9ABC-DEF012345678");
    }

    #[test]
    fn session_token_rejects_empty() {
        assert!(SessionToken::new("").is_none());
        assert!(SessionToken::new("T").is_some());
    }

    #[test]
    fn debug_output_is_redacted() {
        let token = SessionToken::new("eyJhbGciOiJSUzI1NiJ9.secret-part").expect("token");
        let debug = format!("{token:?}");
        assert!(debug.contains("eyJhbGci..."));
        assert!(!debug.contains("secret-part"));
    }

    #[test]
    fn redact_handles_multibyte_characters() {
        assert_eq!(redact("ééééééééé"), "éééééééé...");
    }
}
