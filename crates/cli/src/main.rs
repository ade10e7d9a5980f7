//! RV64IM simulator and debugger CLI.
//!
//! This binary wires the core crate to a terminal. It performs:
//! 1. **Configuration:** Built-in defaults, optionally overridden by a JSON file and flags.
//! 2. **Boot:** Loads a raw or ELF image (or the built-in program) into RAM.
//! 3. **Debugger:** Runs the `(rvdb)` command loop on stdin, or the whole program in batch mode.
//!
//! The process exits with status 0 on a good trap or an explicit quit, 1 otherwise.

use std::error::Error;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rvdb_core::common::SimError;
use rvdb_core::{Config, Debugger, Engine, Rv64};

#[derive(Parser, Debug)]
#[command(
    name = "rvdb",
    author,
    version,
    about = "Steppable RV64IM simulator with an interactive debugger",
    long_about = "Load a raw binary or ELF image and debug it one instruction at a time.\n\nWithout an image the built-in demo program is loaded.\n\nExamples:\n  rvdb\n  rvdb -b program.elf\n  rvdb --config rvdb.json --log rvdb.log program.bin"
)]
struct Cli {
    /// Raw binary or ELF image to run.
    image: Option<PathBuf>,

    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run to completion without reading commands.
    #[arg(short, long)]
    batch: bool,

    /// Trace call and return instructions against the image's symbols.
    #[arg(long)]
    ftrace: bool,

    /// Write logs to this file instead of stderr.
    #[arg(short, long)]
    log: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_tracing(cli.log.as_deref()) {
        eprintln!("rvdb: cannot open log file: {err}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!(%err, "rvdb failed");
            eprintln!("rvdb: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the `warn` default.
fn init_tracing(log: Option<&Path>) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    match log {
        Some(path) => {
            let file = File::create(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config, SimError> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = fs::read_to_string(path).map_err(|source| SimError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config = Config::from_json(&text)?;
    info!(path = %path.display(), "configuration loaded");
    Ok(config)
}

/// Boots the image and drives the debugger. Returns whether the session exited cleanly.
fn run(cli: &Cli) -> Result<bool, Box<dyn Error>> {
    let mut config = load_config(cli.config.as_deref())?;
    config.general.batch |= cli.batch;
    config.trace.ftrace |= cli.ftrace;

    let engine = Engine::boot(Rv64::new(), &config, cli.image.as_deref())?;
    info!(
        opcodes = engine.opcode_count(),
        pc = engine.machine().cpu.pc,
        "engine ready"
    );

    if !config.general.batch {
        println!("Welcome to rvdb, an RV64IM simulator!");
        println!("For help, type \"help\"");
    }

    let mut debugger = Debugger::new(engine).batch(config.general.batch);
    debugger.mainloop(io::stdin().lock())?;
    Ok(debugger.engine().state().is_good_exit())
}
