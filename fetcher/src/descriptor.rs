//! Download descriptors returned by the catalog's `getDownloads` endpoint.
//!
//! The catalog answers in one of two shapes. Newer responses carry an
//! `artifacts` map from platform name to archive links; older responses
//! carry only version metadata, in which case the archive is fetched from a
//! templated URL. [`DownloadSource`] makes that choice explicit at parse time
//! instead of probing for the field at use time.

use crate::endpoints::Endpoints;
use crate::token::SessionToken;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use url::Url;

/// Archive links for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArtifactLinks {
    /// URL of the `.tar.gz` archive.
    #[serde(default)]
    pub tar: Option<String>,
}

/// Where the archive for a descriptor is fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadSource {
    /// The catalog listed per-platform archive URLs.
    Structured(BTreeMap<String, ArtifactLinks>),
    /// The catalog listed no artifacts; use the templated direct download.
    Templated,
}

/// Errors arising while interpreting a descriptor.
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    /// The JSON body was not an object of the expected shape.
    #[error("malformed download descriptor: {0}")]
    Json(#[from] serde_json::Error),

    /// A coordinate needed to name the cached archive was missing.
    #[error("download descriptor is missing `{field}`")]
    MissingField {
        /// JSON name of the missing field.
        field: &'static str,
    },

    /// The structured shape has no archive for the requested platform.
    #[error("no archive for platform {platform} (available: {})", .available.join(", "))]
    PlatformUnavailable {
        /// The platform that was requested.
        platform: String,
        /// Platforms the descriptor does list.
        available: Vec<String>,
    },

    /// An archive URL listed by the catalog is not a valid URL.
    #[error("invalid archive URL for platform {platform}: {source}")]
    InvalidUrl {
        /// The platform whose URL was invalid.
        platform: String,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },

    /// The templated URL could not be built.
    #[error(transparent)]
    Endpoint(#[from] crate::endpoints::EndpointError),
}

/// Wire shape of the fields the client interprets.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDescriptor {
    #[serde(default, deserialize_with = "string_or_number")]
    version: Option<String>,
    #[serde(default)]
    short_commit_id: Option<String>,
    #[serde(default)]
    artifacts: Option<BTreeMap<String, ArtifactLinks>>,
}

/// A parsed download descriptor for one branch.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseDescriptor {
    version: String,
    short_commit_id: String,
    source: DownloadSource,
}

impl ReleaseDescriptor {
    /// Parse the `getDownloads` response body.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::Json`] for non-object bodies and
    /// [`DescriptorError::MissingField`] when `version` or `shortCommitId` is
    /// absent or empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use oni_fetch::descriptor::{DownloadSource, ReleaseDescriptor};
    ///
    /// let json = r#"{"version":"1.2.3","shortCommitId":"abc123"}"#;
    /// let descriptor = ReleaseDescriptor::parse(json).expect("valid descriptor");
    /// assert_eq!(descriptor.version(), "1.2.3");
    /// assert_eq!(descriptor.source(), &DownloadSource::Templated);
    /// ```
    pub fn parse(json: &str) -> Result<Self, DescriptorError> {
        let raw: Map<String, Value> = serde_json::from_str(json)?;
        let fields: RawDescriptor = serde_json::from_value(Value::Object(raw))?;

        let version = non_empty(fields.version, "version")?;
        let short_commit_id = non_empty(fields.short_commit_id, "shortCommitId")?;
        let source = match fields.artifacts {
            Some(artifacts) => DownloadSource::Structured(artifacts),
            None => DownloadSource::Templated,
        };

        Ok(Self {
            version,
            short_commit_id,
            source,
        })
    }

    /// Release version, e.g. `1.2.3`.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Abbreviated commit id of the build.
    #[must_use]
    pub fn short_commit_id(&self) -> &str {
        &self.short_commit_id
    }

    /// Which descriptor shape the catalog answered with.
    #[must_use]
    pub fn source(&self) -> &DownloadSource {
        &self.source
    }

    /// Resolve the archive URL for `platform`.
    ///
    /// Structured descriptors always yield `artifacts[platform].tar`;
    /// templated descriptors always yield
    /// [`Endpoints::direct_download`].
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::PlatformUnavailable`] when a structured
    /// descriptor has no archive for `platform`, and
    /// [`DescriptorError::InvalidUrl`] when the listed URL does not parse.
    pub fn resolve_url(
        &self,
        endpoints: &Endpoints,
        platform: &str,
        branch: &str,
        session: &SessionToken,
    ) -> Result<Url, DescriptorError> {
        match &self.source {
            DownloadSource::Structured(artifacts) => {
                let tar = artifacts
                    .get(platform)
                    .and_then(|links| links.tar.as_deref())
                    .ok_or_else(|| DescriptorError::PlatformUnavailable {
                        platform: platform.to_owned(),
                        available: artifacts
                            .iter()
                            .filter(|(_, links)| links.tar.is_some())
                            .map(|(name, _)| name.clone())
                            .collect(),
                    })?;
                Url::parse(tar).map_err(|source| DescriptorError::InvalidUrl {
                    platform: platform.to_owned(),
                    source,
                })
            }
            DownloadSource::Templated => {
                Ok(endpoints.direct_download(platform, branch, session)?)
            }
        }
    }
}

fn non_empty(value: Option<String>, field: &'static str) -> Result<String, DescriptorError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(DescriptorError::MissingField { field })
}

/// Accept `"1.2.3"` as well as bare JSON numbers for `version`.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
