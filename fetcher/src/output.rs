//! Output helpers for the oni-fetch CLI.
//!
//! Command results go to stdout and must be written in full, so failures are
//! reported as [`FetchError::WriteFailed`]. Progress lines go to stderr and
//! are best-effort.

use crate::error::{FetchError, Result};
use serde::Serialize;
use std::fmt::Display;
use std::io::Write;

/// Write a progress line to stderr, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Write a result line to stdout.
///
/// # Errors
///
/// Returns [`FetchError::WriteFailed`] when the writer fails.
pub fn write_stdout_line(stdout: &mut dyn Write, message: impl Display) -> Result<()> {
    writeln!(stdout, "{message}").map_err(|source| FetchError::WriteFailed { source })
}

/// Pretty-print `value` as JSON followed by a newline.
///
/// # Errors
///
/// Returns [`FetchError::WriteFailed`] when the writer fails.
///
/// # Examples
///
/// ```
/// use oni_fetch::output::write_json;
///
/// let mut out = Vec::new();
/// write_json(&mut out, &serde_json::json!({"version": "1.2.3"})).expect("write");
/// assert_eq!(String::from_utf8(out).expect("utf8"), "{\n  \"version\": \"1.2.3\"\n}\n");
/// ```
pub fn write_json<T: Serialize + ?Sized>(stdout: &mut dyn Write, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| FetchError::WriteFailed {
            source: std::io::Error::other(err),
        })?;
    write_stdout_line(stdout, text)
}
