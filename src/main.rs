//! envfold CLI
//!
//! Dumps the `env_variables` of a config file and everything it includes as
//! shell `export` lines, ready to be sourced by scripts or startup hooks.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use envfold::{write_exports, Error, ResolveContext, Resolver};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "envfold", version, about, long_about = None)]
struct Cli {
    /// Export env from this config file
    #[arg(short, long, env = "ENVFOLD_CONFIG", default_value = "app.yaml")]
    config: PathBuf,

    /// Don't print errors
    #[arg(short, long)]
    silent: bool,

    /// Keep processing regardless of errors
    #[arg(short, long)]
    force: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        // Reported by the error policy where it happened.
        Err(Error::Resolution(_)) => ExitCode::FAILURE,
        Err(e) => {
            if !cli.silent {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let resolver = Resolver::builder()
        .silent(cli.silent)
        .force(cli.force)
        .build();

    let mut ctx = ResolveContext::new();
    resolver.resolve_into(&mut ctx, &cli.config)?;
    debug!(files = ctx.tracker().visited(), "resolution finished");

    let failures = ctx.failures();
    if failures > 0 && !resolver.policy().silent() {
        warn!(failures, "exporting partial result");
    }

    write_exports(ctx.store(), io::stdout().lock())?;
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
