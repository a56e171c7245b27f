//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(video: &str, question: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Reading the transcript...");
    let result = orchestrator.ask_within_timeout(video, question).await;
    spinner.finish_and_clear();

    match result {
        Ok(answer) => {
            Output::kv("Question", &answer.question);
            println!("\n{}\n", answer.format_for_display());
            Ok(())
        }
        Err(e) if e.is_pipeline_failure() => {
            // Same outcome the HTTP API reports as its response text.
            println!("\n{}\n", e);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to answer: {}", e));
            Err(e.into())
        }
    }
}
