//! Host platform identifiers as understood by the download catalog.
//!
//! The catalog keys artifacts by `linux`, `darwin` and `win32`. Rust reports
//! `macos` and `windows` for the latter two, so the host OS is mapped before
//! it is used as the default `--platform`.

/// Map a Rust OS name (`std::env::consts::OS`) to a catalog platform name.
///
/// Unknown operating systems pass through unchanged.
///
/// # Examples
///
/// ```
/// use oni_fetch::platform::catalog_platform;
///
/// assert_eq!(catalog_platform("macos"), "darwin");
/// assert_eq!(catalog_platform("linux"), "linux");
/// ```
#[must_use]
pub fn catalog_platform(os: &str) -> &str {
    match os {
        "macos" => "darwin",
        "windows" => "win32",
        other => other,
    }
}

/// Catalog platform name of the running host.
#[must_use]
pub fn host_platform() -> &'static str {
    catalog_platform(std::env::consts::OS)
}
