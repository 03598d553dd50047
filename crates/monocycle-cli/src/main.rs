//! CLI entry point for the monocycle simulator binary.

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow as _;
use clap::Parser;
use monocycle_cli::{init_logging, resolve_settings, run, Args, EXIT_FAILURE};
use monocycle_core as _;
use serde as _;
use serde_json as _;
#[cfg(test)]
use tempfile as _;
use tracing as _;
use tracing_subscriber as _;

fn main() -> ExitCode {
    let args = Args::parse();
    let mut stdin = io::stdin().lock();
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();

    let result = resolve_settings(args, &mut stdin, &mut stdout).and_then(|settings| {
        init_logging(settings.debug);
        run(&settings, &mut stdout, &mut stderr)
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            let _ = writeln!(stderr, "error: {err:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
