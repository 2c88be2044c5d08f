//! CLI argument definitions for oni-fetch.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use crate::platform::host_platform;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Release channel queried when `--branch` is not given.
pub const DEFAULT_BRANCH: &str = "stable";

/// Download Onivim 2 builds with a license key.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "oni-fetch")]
#[command(version, about)]
#[command(long_about = concat!(
    "Download Onivim 2 builds with a license key.\n\n",
    "The license key is exchanged for a short-lived identity token, which is ",
    "then used to query the download catalog and fetch release archives into ",
    "a per-user cache. A `latest` symlink in the cache always points at the ",
    "most recent download.",
))]
#[command(after_help = concat!(
    "CONFIGURATION:\n",
    "  The license key is read from LICENSE_KEY in the environment or from\n",
    "  ~/.config/oni-fetch/licenseKey containing:\n",
    "    LICENSE_KEY=XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX\n\n",
    "EXAMPLES:\n",
    "  Check that the license key is accepted:\n",
    "    $ oni-fetch license\n\n",
    "  Show the current nightly build:\n",
    "    $ oni-fetch cur -b nightly\n\n",
    "  Download the stable build for macOS:\n",
    "    $ oni-fetch download -p darwin",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Release channel to query.
    #[arg(short, long, global = true, default_value = DEFAULT_BRANCH, value_name = "BRANCH")]
    pub branch: String,

    /// Platform whose archive to download [default: host platform].
    #[arg(short, long, global = true, default_value = host_platform(), value_name = "PLATFORM")]
    pub platform: String,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Cache directory for archives [default: platform-specific].
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// License file to read LICENSE_KEY from [default: platform-specific].
    #[arg(long, global = true, value_name = "PATH")]
    pub license_file: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Validate the license key (exit status 0 when valid).
    License,

    /// Print the download descriptor for the selected branch.
    Cur,

    /// Print the account record for the license holder.
    Account,

    /// Print the latest commit id.
    Head,

    /// Download the archive for the selected platform and branch.
    Download,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
