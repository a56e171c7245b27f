//! Pipeline orchestrator for vidask.
//!
//! Runs one question against one video: fetch transcript, chunk, embed and
//! index, normalize the question, retrieve, answer. Each run builds its own
//! index and shares nothing mutable with concurrent runs.

use crate::chunking::RecursiveChunker;
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, VidaskError};
use crate::generation::{Generator, OpenAIGenerator};
use crate::openai::create_client;
use crate::rag::{format_context, AnswerGenerator, QuestionNormalizer, RagAnswer, Retriever};
use crate::transcript::{extract_video_id, Transcript, TranscriptProvider, YoutubeTranscriptProvider};
use crate::vector_store::MemoryIndex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// The main orchestrator for the vidask pipeline.
pub struct Orchestrator {
    settings: Settings,
    transcripts: Arc<dyn TranscriptProvider>,
    embedder: Arc<dyn Embedder>,
    chunker: RecursiveChunker,
    normalizer: QuestionNormalizer,
    retriever: Retriever,
    answerer: AnswerGenerator,
}

impl Orchestrator {
    /// Create an orchestrator backed by YouTube and OpenAI.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let client = create_client(&settings.openai)?;
        let embedder: Arc<dyn Embedder> =
            Arc::new(OpenAIEmbedder::new(client.clone(), &settings.embedding));
        let generator: Arc<dyn Generator> =
            Arc::new(OpenAIGenerator::new(client, &settings.generation));
        let transcripts: Arc<dyn TranscriptProvider> = Arc::new(YoutubeTranscriptProvider::new(
            Duration::from_secs(settings.transcript.timeout_secs),
        )?);

        info!(
            "Using {} for answers and {} for embeddings",
            settings.generation.model, settings.embedding.model
        );

        Self::with_components(settings, prompts, transcripts, embedder, generator)
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        transcripts: Arc<dyn TranscriptProvider>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
    ) -> Result<Self> {
        settings.validate()?;

        let chunker = RecursiveChunker::new((&settings.chunking).into())?;
        let normalizer = QuestionNormalizer::new(generator.clone(), prompts.clone());
        let retriever = Retriever::from_settings(embedder.clone(), &settings.retrieval);
        let answerer = AnswerGenerator::new(generator, prompts);

        Ok(Self {
            settings,
            transcripts,
            embedder,
            chunker,
            normalizer,
            retriever,
            answerer,
        })
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get the chunker configured for this orchestrator.
    pub fn chunker(&self) -> &RecursiveChunker {
        &self.chunker
    }

    /// Fetch the transcript for a video id or YouTube URL.
    #[instrument(skip(self))]
    pub async fn fetch_transcript(&self, video: &str) -> Result<Transcript> {
        let video_id = extract_video_id(video);
        if video_id.is_empty() {
            return Err(VidaskError::InvalidInput("video id is empty".to_string()));
        }

        self.transcripts
            .fetch(&video_id, &self.settings.transcript.languages)
            .await
    }

    /// Answer a question about a video, stopping at the first failing stage.
    #[instrument(skip(self, question))]
    pub async fn ask(&self, video: &str, question: &str) -> Result<RagAnswer> {
        let transcript = self.fetch_transcript(video).await?;
        info!(
            "Fetched {} transcript with {} segments",
            transcript.language_code,
            transcript.segments.len()
        );

        let chunks = self.chunker.chunk(&transcript.full_text())?;
        let index = MemoryIndex::build(self.embedder.as_ref(), chunks).await?;
        info!("Indexed {} chunks", index.len());

        let question = self.normalizer.normalize(question).await?;
        let sources = self.retriever.retrieve(&index, &question).await?;
        let context = format_context(&sources);
        let answer = self.answerer.answer(&context, &question).await?;

        Ok(RagAnswer {
            answer,
            question,
            sources: sources.into_iter().cloned().collect(),
        })
    }

    /// Run [`ask`](Self::ask) bounded by `server.request_timeout_secs`.
    pub async fn ask_within_timeout(&self, video: &str, question: &str) -> Result<RagAnswer> {
        let secs = self.settings.server.request_timeout_secs;
        tokio::time::timeout(Duration::from_secs(secs), self.ask(video, question))
            .await
            .unwrap_or(Err(VidaskError::Timeout(secs)))
    }

    /// Run [`ask_within_timeout`](Self::ask_within_timeout) and flatten the
    /// outcome into the text returned to the caller. Failures become their message.
    pub async fn respond(&self, video: &str, question: &str) -> String {
        match self.ask_within_timeout(video, question).await {
            Ok(answer) => answer.answer,
            Err(e) if e.is_pipeline_failure() => {
                warn!(error = %e, "Pipeline stopped");
                e.to_string()
            }
            Err(e) => {
                error!(error = %e, "Pipeline failed unexpectedly");
                e.to_string()
            }
        }
    }
}
