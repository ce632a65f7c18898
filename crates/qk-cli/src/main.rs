//! CLI entry point for qk-gen.
//!
//! Scans a TypeScript/JavaScript project for `qk('...')` marker calls and
//! writes a declaration file registering every key pattern and its parents.
//!
//! # Usage
//!
//! ```bash
//! qk-gen [OPTIONS] <COMMAND>
//!
//! # Generate once
//! qk-gen generate --root ./web
//!
//! # Regenerate on every change until Ctrl-C
//! qk-gen watch --root ./web --function-name queryKey
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use color_eyre::eyre::eyre;
use qk_core::{Config, ResolvedConfig};
use qk_scanner::Scanner;
use qk_watcher::PassOutcome;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Generates typed query key declarations from `qk('...')` calls.
#[derive(Parser)]
#[command(name = "qk-gen", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Project root.
    ///
    /// Defaults to the configuration file's `root`, or the current directory.
    #[arg(short, long, global = true, env = "QK_GEN_ROOT")]
    root: Option<Utf8PathBuf>,

    /// Configuration file.
    ///
    /// Defaults to `querykeys.json` or `.querykeysrc.json` in the root.
    #[arg(short, long, global = true, env = "QK_GEN_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Include glob, relative to the root. Replaces the configured includes.
    #[arg(long = "include", global = true, value_name = "GLOB")]
    include: Vec<String>,

    /// Exclude glob, relative to the root. Added to the configured excludes.
    #[arg(long = "exclude", global = true, value_name = "GLOB")]
    exclude: Vec<String>,

    /// Additional marker function name. `qk` is always recognised.
    #[arg(long = "function-name", global = true, value_name = "NAME")]
    function_names: Vec<String>,

    /// Declaration output path, relative to the root unless absolute.
    #[arg(short, long, global = true)]
    output: Option<Utf8PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Scan once and write the declaration if it changed.
    Generate,

    /// Generate, then regenerate on every relevant change until interrupted.
    Watch {
        /// Debounce window for file-system events, in milliseconds.
        #[arg(long, value_name = "MS")]
        debounce_ms: Option<u64>,
    },
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects `RUST_LOG` if set. Otherwise uses `debug` when verbose, `info`
/// by default. `notify` is filtered to `warn`.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},notify=warn"))
    });

    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_ansi(use_ansi))
        .with(filter)
        .init();
}

/// Loads the configuration file, if any, and applies CLI overrides.
///
/// Returns the merged configuration and the file it came from.
fn load_config(cli: &Cli) -> color_eyre::Result<(Config, Option<Utf8PathBuf>)> {
    let (mut config, source) = match &cli.config {
        Some(path) => {
            let mut config = Config::from_json_file(path)?;
            if config.scan.root.is_relative() {
                if let Some(parent) = path.parent() {
                    config.scan.root = parent.join(&config.scan.root);
                }
            }
            (config, Some(path.clone()))
        }
        None => {
            let base = cli.root.clone().unwrap_or_else(|| Utf8PathBuf::from("."));
            match Config::discover(&base)? {
                Some((path, config)) => (config, Some(path)),
                None => (Config::default(), None),
            }
        }
    };

    if let Some(root) = &cli.root {
        config.scan.root.clone_from(root);
    }
    if !cli.include.is_empty() {
        config.scan.include.clone_from(&cli.include);
    }
    config.scan.exclude.extend(cli.exclude.iter().cloned());
    config.scan.function_names.extend(cli.function_names.iter().cloned());
    if let Some(output) = &cli.output {
        config.scan.output_path.clone_from(output);
    }
    config.scan.verbose |= cli.verbose;

    if let Commands::Watch {
        debounce_ms: Some(debounce_ms),
    } = cli.command
    {
        config.watch.debounce_ms = debounce_ms;
    }

    Ok((config, source))
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Runs a single pass.
///
/// # Errors
///
/// Returns an error if the globs do not compile or the write fails.
async fn run_generate(config: Arc<ResolvedConfig>) -> color_eyre::Result<()> {
    info!(root = %config.root, output = %config.output_path, "Generating query keys");

    let scanner = Scanner::new(config)?;
    let report = qk_watcher::generate_once(&scanner).await;

    match report.outcome {
        PassOutcome::Failed(reason) => Err(eyre!("Generation failed: {reason}")),
        PassOutcome::Written | PassOutcome::Unchanged => Ok(()),
    }
}

/// Watches the project until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the session cannot start.
async fn run_watch(config: Arc<ResolvedConfig>) -> color_eyre::Result<()> {
    info!(
        root = %config.root,
        output = %config.output_path,
        debounce_ms = config.watch.debounce_ms,
        "Watching for changes"
    );

    let stop = CancellationToken::new();
    let signal_stop = stop.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        info!("Received shutdown signal, finishing current pass");
        signal_stop.cancel();
    });

    let summary = qk_watcher::watch(config, stop, None).await?;
    debug!(
        passes = summary.passes,
        writes = summary.writes,
        failures = summary.failures,
        "Watch finished"
    );
    Ok(())
}

/// Completes on Ctrl-C, or on SIGTERM where available.
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(error) => {
                warn!(error = %error, "Cannot listen for SIGTERM");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Load configuration; its `verbose` flag feeds the log level
    let (config, source) = load_config(&cli)?;

    // 4. Initialize tracing
    init_tracing(config.scan.verbose, cli.no_color);
    if let Some(source) = &source {
        debug!(path = %source, "Loaded configuration file");
    }

    // 5. Validate; bad roots, options and globs stop here
    let resolved = Arc::new(config.resolve()?);

    // 6. Route to the command
    match cli.command {
        Commands::Generate => run_generate(resolved).await,
        Commands::Watch { .. } => run_watch(resolved).await,
    }
}
