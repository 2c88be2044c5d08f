//! oni-fetch CLI entrypoint.
//!
//! This binary authenticates with the configured license key and runs one
//! subcommand against the vendor services. Errors are printed to stderr and
//! turn into exit status 1.

use clap::Parser;
use oni_fetch::cli::Cli;
use oni_fetch::commands::CommandContext;
use oni_fetch::config::ClientConfig;
use oni_fetch::dirs::SystemBaseDirs;
use oni_fetch::error::Result;
use oni_fetch::http::UreqTransport;
use oni_fetch::logging::init_logging;
use oni_fetch::output::write_stderr_line;
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stdout, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stdout: &mut dyn Write, stderr: &mut dyn Write) -> Result<()> {
    let config = ClientConfig::from_cli(cli, &SystemBaseDirs);
    let transport = UreqTransport;
    CommandContext::new(&config, &transport).run(cli, stdout, stderr)
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("Err: {err}"));
            1
        }
    }
}
