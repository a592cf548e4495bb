//! Cobble CLI, the command-line front end of the cobble build driver.
//!
//! `cobble <ENTRY>` builds the binary for one entry source file, recompiling
//! only the units whose objects are older than something they depend on.

#![warn(missing_docs)]

mod build;
mod project;

use std::io::IsTerminal;
use std::process;

use clap::{Parser, ValueEnum};

/// Cobble: an incremental build driver for C++ projects.
#[derive(Parser, Debug)]
#[command(name = "cobble", version, about = "Incremental C++ build driver")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a `cobble.toml` file, or to the project directory.
    #[arg(long)]
    pub config: Option<String>,

    /// The entry source file (e.g. `src/main.cpp`).
    pub entry: String,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file or project directory.
    pub config: Option<String>,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too, on stdout.
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    let color = match cli.color {
        ColorChoice::Auto => std::io::stderr().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };
    init_tracing(&global);

    if let Err(e) = build::run(&cli.entry, &global) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

/// Default log filter for the given flags. `--quiet` wins over `--verbose`.
fn default_filter(global: &GlobalArgs) -> &'static str {
    if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "info"
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the flags.
fn init_tracing(global: &GlobalArgs) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(global)));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(global.color)
                .with_target(global.verbose)
                .without_time(),
        )
        .with(filter)
        .init();
}
