use clap::Parser;
use colored::*;
use protloc::cli::{Cli, Commands};
use protloc::ProtlocError;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    // PROTLOC_LOG sets the default level, RUST_LOG takes precedence
    let log_level = std::env::var("PROTLOC_LOG").unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);

        let exit_code = match e.downcast_ref::<ProtlocError>() {
            Some(ProtlocError::Configuration(_)) => 2,
            Some(ProtlocError::Io(_)) => 3,
            Some(ProtlocError::Format { .. }) | Some(ProtlocError::AlphabetViolation { .. }) => 4,
            Some(ProtlocError::InvariantViolation(_)) => 5,
            _ => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => protloc::load_config(path)?,
        None => protloc::default_config(),
    };
    if cli.threads > 0 {
        config.performance.threads = cli.threads;
    }

    let num_threads = protloc::utils::configure_thread_pool(config.performance.threads)?;
    if cli.verbose > 0 {
        eprintln!("Using {} threads", num_threads);
    }

    match cli.command {
        Commands::Features(args) => protloc::cli::commands::features::run(args, &config),
        Commands::Encode(args) => protloc::cli::commands::encode::run(args, &config),
        Commands::Stats(args) => protloc::cli::commands::stats::run(args, &config),
    }
}
