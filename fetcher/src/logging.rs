//! Logger initialisation.
//!
//! `RUST_LOG` wins when set; otherwise the default filter is `warn`, or
//! `debug` for this crate under `--verbose`.

use env_logger::Env;

/// Default filter when `--verbose` is not given.
pub const QUIET_FILTER: &str = "warn";

/// Default filter under `--verbose`.
pub const VERBOSE_FILTER: &str = "warn,oni_fetch=debug";

/// Return the default filter directive for the given verbosity.
#[must_use]
pub const fn default_filter(verbose: bool) -> &'static str {
    if verbose { VERBOSE_FILTER } else { QUIET_FILTER }
}

/// Install the global logger. Later calls are ignored.
pub fn init_logging(verbose: bool) {
    let env = Env::default().default_filter_or(default_filter(verbose));
    if env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init()
        .is_err()
    {
        // A logger is already installed.
    }
}
