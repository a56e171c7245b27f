//! CLI module for vidask.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// vidask - ask questions about a YouTube video
///
/// Fetches the video's transcript, indexes it for the duration of one request,
/// and answers from the most relevant parts only.
#[derive(Parser, Debug)]
#[command(name = "vidask")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API used by the browser extension
    Serve {
        /// Host to bind to [default: server.host from config]
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to [default: server.port from config]
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,
    },

    /// Ask a single question about a video
    Ask {
        /// YouTube video ID or URL
        video: String,

        /// The question to ask
        question: String,
    },

    /// Fetch and print a video's transcript
    Transcript {
        /// YouTube video ID or URL
        video: String,

        /// Print the retrieval chunks instead of the flattened text
        #[arg(long)]
        chunks: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
