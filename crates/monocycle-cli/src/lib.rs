//! Command-line runner for the monocycle processor emulator.
//!
//! Loads a `.bin` program, runs it to completion on a process-backed host
//! and reports how the run ended through output text, an optional JSON
//! report and the exit status.

use std::fs;
use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use monocycle_core::{
    disassemble_program, load_program, CycleFault, Engine, EngineConfig, RunOutcome,
    SyscallHost, DEFAULT_MAX_CYCLES, DEFAULT_PROGRESS_INTERVAL, REGISTER_COUNT,
};

/// Exit status for a clean termination.
pub const EXIT_OK: u8 = 0;
/// Exit status for a fatal fault or a load failure.
pub const EXIT_FAILURE: u8 = 1;
/// Exit status when the cycle ceiling stopped the run.
pub const EXIT_CYCLE_LIMIT: u8 = 2;

const PATH_PROMPT: &str = "Path to the binary program: ";
const DEBUG_PROMPT: &str = "Enable debug mode? (y/n): ";

/// Notice printed after the program terminates through the syscall.
pub const TERMINATED_NOTICE: &str = "Program terminated via syscall";

/// Command-line arguments.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "monocycle",
    version,
    about = "Monocycle 16-bit processor simulator",
    long_about = "Run a binary program on the monocycle 16-bit processor.\n\nWithout PATH the program path and debug mode are asked for on stdin.\n\nExit status: 0 clean termination, 1 fault or load failure, 2 cycle limit."
)]
pub struct Args {
    /// Program file (`.bin`, little-endian 16-bit words).
    pub path: Option<PathBuf>,

    /// Print pipeline stage traces and a disassembly listing.
    #[arg(short, long)]
    pub debug: bool,

    /// Cycle ceiling before the run is stopped as a likely infinite loop.
    #[arg(long, default_value_t = DEFAULT_MAX_CYCLES)]
    pub max_cycles: u32,

    /// Write a JSON run report to this file.
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

/// Fully resolved run settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// Program file.
    pub path: PathBuf,
    /// Debug verbosity.
    pub debug: bool,
    /// Cycle ceiling.
    pub max_cycles: u32,
    /// Optional JSON report destination.
    pub report: Option<PathBuf>,
}

/// Turns arguments into settings, prompting on `input` for anything missing.
///
/// # Errors
///
/// Fails when the prompts cannot be written or answered.
pub fn resolve_settings(
    args: Args,
    input: &mut dyn BufRead,
    output: &mut dyn Write,
) -> anyhow::Result<RunSettings> {
    let (path, debug) = match args.path {
        Some(path) => (path, args.debug),
        None => {
            let path = prompt(PATH_PROMPT, input, output)?;
            if path.is_empty() {
                bail!("no program path given");
            }
            let answer = prompt(DEBUG_PROMPT, input, output)?;
            let debug = args.debug || answer.starts_with(['y', 'Y']);
            (PathBuf::from(path), debug)
        }
    };
    Ok(RunSettings {
        path,
        debug,
        max_cycles: args.max_cycles,
        report: args.report,
    })
}

fn prompt(
    question: &str,
    input: &mut dyn BufRead,
    output: &mut dyn Write,
) -> anyhow::Result<String> {
    write!(output, "{question}")?;
    output.flush()?;
    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("failed to read answer from stdin")?;
    Ok(line.trim().to_string())
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the level.
pub fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}

/// Host backed by a real output stream, thread sleep and the system clock.
pub struct ProcessHost<'a> {
    out: &'a mut dyn Write,
}

impl<'a> ProcessHost<'a> {
    /// Creates a host writing program output to `out`.
    pub fn new(out: &'a mut dyn Write) -> Self {
        Self { out }
    }
}

impl SyscallHost for ProcessHost<'_> {
    fn emit(&mut self, text: &str) {
        let written = self
            .out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush());
        if let Err(err) = written {
            warn!(%err, "failed to write program output");
        }
    }

    fn suspend(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn epoch_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs())
    }
}

/// Serializable summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Program file that was run.
    pub program: PathBuf,
    /// `terminated`, `faulted` or `cycle_limit`.
    pub outcome: &'static str,
    /// Cycles executed.
    pub cycles: u32,
    /// Final program counter.
    pub pc: u16,
    /// Final register values.
    pub registers: [i16; REGISTER_COUNT],
    /// Fault that stopped the run.
    pub fault: Option<CycleFault>,
    /// Human-readable fault message.
    pub message: Option<String>,
}

impl RunReport {
    /// Builds a report from a stopped engine.
    #[must_use]
    pub fn new(program: PathBuf, engine: &Engine, outcome: &RunOutcome) -> Self {
        let (label, fault) = match outcome {
            RunOutcome::Terminated { .. } => ("terminated", None),
            RunOutcome::Faulted { fault, .. } => ("faulted", Some(fault.clone())),
            RunOutcome::CycleLimitReached { .. } => ("cycle_limit", None),
        };
        Self {
            program,
            outcome: label,
            cycles: outcome.cycles(),
            pc: engine.pc(),
            registers: engine.registers().values(),
            message: fault.as_ref().map(ToString::to_string),
            fault,
        }
    }
}

/// Maps a run outcome to the process exit status.
#[must_use]
pub const fn exit_code(outcome: &RunOutcome) -> u8 {
    match outcome {
        RunOutcome::Terminated { .. } => EXIT_OK,
        RunOutcome::Faulted { .. } => EXIT_FAILURE,
        RunOutcome::CycleLimitReached { .. } => EXIT_CYCLE_LIMIT,
    }
}

/// Loads and runs a program, writing program output and the summary to
/// `stdout` and diagnostics to `stderr`. Returns the exit status.
///
/// # Errors
///
/// Fails when the program cannot be loaded, the streams cannot be written
/// or the report cannot be saved.
pub fn run(
    settings: &RunSettings,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> anyhow::Result<u8> {
    writeln!(stdout, "=== Monocycle processor simulator ===")?;

    let program = load_program(&settings.path)
        .with_context(|| format!("failed to load {}", settings.path.display()))?;
    writeln!(stdout, "Loaded {} instructions", program.len())?;
    if settings.debug {
        for row in disassemble_program(&program) {
            writeln!(stdout, "{row}")?;
        }
    }

    let config = EngineConfig {
        max_cycles: settings.max_cycles,
        progress_interval: DEFAULT_PROGRESS_INTERVAL,
    };
    let mut engine = Engine::from_program(&program, config)?;
    info!(path = %settings.path.display(), "starting run");
    let outcome = engine.run(&mut ProcessHost::new(&mut *stdout));

    match &outcome {
        RunOutcome::Terminated { .. } => writeln!(stdout, "{TERMINATED_NOTICE}")?,
        RunOutcome::Faulted { fault, .. } => writeln!(stderr, "{fault}")?,
        RunOutcome::CycleLimitReached { .. } => {
            writeln!(stderr, "cycle limit reached; likely infinite loop")?;
        }
    }

    writeln!(
        stdout,
        "=== Execution finished after {} cycles ===",
        outcome.cycles()
    )?;
    write!(stdout, "{}", engine.registers().dump())?;
    if settings.debug {
        writeln!(stdout, "Total cycles: {}", engine.cycle())?;
        writeln!(stdout, "Final PC: {}", engine.pc())?;
    }

    if let Some(path) = &settings.report {
        let report = RunReport::new(settings.path.clone(), &engine, &outcome);
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json)
            .with_context(|| format!("failed to write report {}", path.display()))?;
    }

    Ok(exit_code(&outcome))
}
