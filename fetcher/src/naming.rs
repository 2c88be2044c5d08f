//! Cache naming policy for downloaded archives.
//!
//! Constructs deterministic archive names in the format
//! `<product>-<platform>-<branch>-<version>-<short_commit_id>.tar.gz`.
//! The presence of a file with this name in the cache directory is what
//! marks an artifact as already downloaded.
//!
//! Every part must be a plain path component: non-blank, without path
//! separators, `..` or control characters. Platform, branch and commit id
//! must also be free of `-`, so `version` is the only part that may contain
//! the separator and a name maps back to exactly one set of coordinates.

use std::fmt;
use thiserror::Error;

/// The fixed file extension for cached archives.
const ARCHIVE_EXTENSION: &str = ".tar.gz";

/// Separator between name parts.
const PART_SEPARATOR: char = '-';

/// Name of the convenience symlink that points at the newest archive.
pub const LATEST_LINK_NAME: &str = "latest";

/// A coordinate that cannot be used in a cache file name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    /// The part was empty or whitespace.
    #[error("archive name part `{part}` is blank")]
    Blank {
        /// Which coordinate was blank.
        part: &'static str,
    },

    /// The part would escape the cache directory or break the name apart.
    #[error("archive name part `{part}` ({value:?}) must not contain {forbidden}")]
    Forbidden {
        /// Which coordinate was rejected.
        part: &'static str,
        /// The rejected value.
        value: String,
        /// Description of the offending content.
        forbidden: &'static str,
    },
}

/// A fully-qualified cached archive name.
///
/// # Examples
///
/// ```
/// use oni_fetch::naming::ArchiveName;
///
/// let name = ArchiveName::new("Product", "linux", "stable", "1.2.3", "abc123")
///     .expect("plain coordinates");
/// assert_eq!(name.to_string(), "Product-linux-stable-1.2.3-abc123.tar.gz");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArchiveName {
    product: String,
    platform: String,
    branch: String,
    version: String,
    short_commit_id: String,
}

impl ArchiveName {
    /// Create an archive name from its coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`NamingError`] when a part is blank, contains a path
    /// separator, `..` or a control character, or when a part other than
    /// `product` or `version` contains `-`.
    pub fn new(
        product: &str,
        platform: &str,
        branch: &str,
        version: &str,
        short_commit_id: &str,
    ) -> Result<Self, NamingError> {
        check_part("product", product, true)?;
        check_target(platform, branch)?;
        check_part("version", version, true)?;
        check_part("shortCommitId", short_commit_id, false)?;
        Ok(Self {
            product: product.to_owned(),
            platform: platform.to_owned(),
            branch: branch.to_owned(),
            version: version.to_owned(),
            short_commit_id: short_commit_id.to_owned(),
        })
    }

    /// Return the filename as a string without consuming the value.
    #[must_use]
    pub fn filename(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ArchiveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}-{}{ARCHIVE_EXTENSION}",
            self.product, self.platform, self.branch, self.version, self.short_commit_id
        )
    }
}

/// Check the user-supplied coordinates of an archive name.
///
/// # Errors
///
/// Returns [`NamingError`] under the same rules as [`ArchiveName::new`].
pub fn check_target(platform: &str, branch: &str) -> Result<(), NamingError> {
    check_part("platform", platform, false)?;
    check_part("branch", branch, false)
}

fn check_part(part: &'static str, value: &str, allow_separator: bool) -> Result<(), NamingError> {
    if value.trim().is_empty() {
        return Err(NamingError::Blank { part });
    }
    let forbidden = if value.contains(['/', '\\']) {
        Some("a path separator")
    } else if value.contains("..") {
        Some("`..`")
    } else if value.chars().any(char::is_control) {
        Some("control characters")
    } else if !allow_separator && value.contains(PART_SEPARATOR) {
        Some("`-`")
    } else {
        None
    };
    match forbidden {
        Some(forbidden) => Err(NamingError::Forbidden {
            part,
            value: value.to_owned(),
            forbidden,
        }),
        None => Ok(()),
    }
}
