mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use sar_config::Config;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // RUST_LOG wins over -v/-q; logs go to stderr so reports can be piped
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::resolve(cli.config.as_deref())?;

    match cli.command {
        cli::Commands::Normalize {
            root,
            subjects,
            common,
        } => commands::normalize::handle(&config, root, subjects, common),
        cli::Commands::RedactHeaders {
            root,
            marker,
            jobs,
            common,
        } => commands::headers::handle(&config, root, marker, jobs, common),
        cli::Commands::RedactWords {
            root,
            words,
            marker,
            jobs,
            json,
            common,
        } => commands::words::handle(&config, root, words, marker, jobs, json, common),
        cli::Commands::Run {
            root,
            subjects,
            words,
            json,
            dry_run,
        } => commands::run::handle(&config, root, subjects, words, json, dry_run),
        cli::Commands::Status { root } => commands::status::handle(&config, root),
    }
}
