//! vidask CLI entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vidask::cli::{commands, Cli, Commands};
use vidask::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // OPENAI_API_KEY may live in .env
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&Settings::expand_path(path)))?,
        None => Settings::load()?,
    };

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("vidask={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Execute command
    match cli.command {
        Commands::Serve { host, port } => {
            commands::run_serve(host, port, settings).await?;
        }

        Commands::Ask { video, question } => {
            commands::run_ask(&video, &question, settings).await?;
        }

        Commands::Transcript { video, chunks } => {
            commands::run_transcript(&video, chunks, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, settings, cli.config.as_deref())?;
        }
    }

    Ok(())
}
