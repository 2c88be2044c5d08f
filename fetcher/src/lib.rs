//! oni-fetch library.
//!
//! This crate authenticates with an Onivim 2 license key, queries the vendor
//! download catalog and fetches release archives into a per-user cache. It is
//! used by the `oni-fetch` CLI binary and can be driven programmatically
//! through the [`http::HttpTransport`] seam for testing.
//!
//! # Modules
//!
//! - [`catalog`] - Release notes, account info and download descriptors
//! - [`cli`] - Command-line argument definitions
//! - [`commands`] - Subcommand implementations
//! - [`config`] - Per-invocation configuration and license key loading
//! - [`descriptor`] - Download descriptor parsing and URL resolution
//! - [`dirs`] - Directory resolution abstraction for platform-specific paths
//! - [`endpoints`] - Remote service layout and URL assembly
//! - [`error`] - Semantic error types
//! - [`fetch`] - Archive download into the cache
//! - [`http`] - HTTP transport abstraction over `ureq`
//! - [`identity`] - License-key authentication handshake
//! - [`logging`] - Logger initialisation
//! - [`naming`] - Deterministic archive file names
//! - [`output`] - Stdout and stderr helpers
//! - [`platform`] - Host platform identifiers
//! - [`token`] - Credential newtypes with redacted debug output

pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod descriptor;
pub mod dirs;
pub mod endpoints;
pub mod error;
pub mod fetch;
pub mod http;
pub mod identity;
pub mod logging;
pub mod naming;
pub mod output;
pub mod platform;
pub mod token;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
