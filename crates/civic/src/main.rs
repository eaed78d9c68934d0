// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Civic assistant - municipal virtual assistant server.
//!
//! This is the binary entry point: it serves the chat widget and admin APIs
//! and exposes the annotator and normalizer as offline commands.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod commands;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use civic_config::{CivicConfig, ConfigError};

/// Civic assistant - municipal virtual assistant server.
#[derive(Parser, Debug)]
#[command(name = "civic", version, about, long_about = None)]
struct Cli {
    /// Explicit config file (skips the standard search paths).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the gateway server.
    Serve,
    /// Print the link spans found in TEXT as JSON.
    Annotate {
        text: String,
    },
    /// Normalize a raw webhook reply read from FILE (or stdin).
    Normalize {
        file: Option<PathBuf>,
    },
    /// Validate the configuration and print a summary.
    CheckConfig {
        /// Also print the effective configuration (secrets redacted).
        #[arg(long)]
        show: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<CivicConfig, Vec<ConfigError>> {
    match path {
        Some(p) => civic_config::load_and_validate_path(p),
        None => civic_config::load_and_validate(),
    }
}

fn load_config_or_exit(path: Option<&PathBuf>) -> CivicConfig {
    match load_config(path) {
        Ok(config) => config,
        Err(errors) => {
            civic_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

/// Installs the global tracing subscriber. Logs go to stderr so command
/// output on stdout stays machine-readable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("civic={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Serve) => {
            let config = load_config_or_exit(cli.config.as_ref());
            init_tracing(&config.assistant.log_level);
            serve::run_serve(config).await.map(|()| None)
        }
        Some(Commands::Annotate { text }) => {
            init_tracing("warn");
            commands::run_annotate(&text).map(Some)
        }
        Some(Commands::Normalize { file }) => {
            let config = load_config_or_exit(cli.config.as_ref());
            init_tracing(&config.assistant.log_level);
            commands::read_input(file.as_deref())
                .and_then(|input| commands::run_normalize(&input, &config.errors.network_error))
                .map(Some)
        }
        Some(Commands::CheckConfig { show }) => {
            let config = load_config_or_exit(cli.config.as_ref());
            commands::run_check_config(&config, show).map(Some)
        }
        None => Ok(Some("civic: use --help for available commands".to_string())),
    };

    match result {
        Ok(Some(output)) => println!("{output}"),
        Ok(None) => {}
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
