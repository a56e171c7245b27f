//! Transcript command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the transcript command.
///
/// The OpenAI client is built but never called, so no API key is needed.
pub async fn run_transcript(video: &str, chunks: bool, settings: Settings) -> Result<()> {
    preflight::check(Operation::Transcript)?;

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Fetching transcript...");
    let result = orchestrator.fetch_transcript(video).await;
    spinner.finish_and_clear();

    let transcript = match result {
        Ok(t) => t,
        Err(e) => {
            Output::error(&e.to_string());
            return Err(e.into());
        }
    };

    let text = transcript.full_text();
    Output::header(&format!("Transcript {}", transcript.video_id));
    Output::kv("Language", &transcript.language_code);
    Output::kv(
        "Kind",
        if transcript.is_generated { "auto-generated" } else { "manual" },
    );
    Output::kv("Segments", &transcript.segments.len().to_string());
    Output::kv("Characters", &text.chars().count().to_string());

    if chunks {
        let chunks = orchestrator.chunker().chunk(&text)?;
        Output::kv("Chunks", &chunks.len().to_string());
        for (i, chunk) in chunks.iter().enumerate() {
            Output::chunk(i + 1, &chunk.content);
        }
    } else {
        println!("\n{}", text);
    }

    Ok(())
}
