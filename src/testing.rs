//! Deterministic stand-ins for the external capabilities, used by unit tests.

use crate::config::UNKNOWN_ANSWER;
use crate::embedding::Embedder;
use crate::error::{Result, VidaskError};
use crate::generation::Generator;
use crate::transcript::{describe_languages, Transcript, TranscriptProvider, TranscriptSegment};
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "do", "does", "for", "from", "how", "in",
    "is", "it", "of", "on", "or", "that", "the", "this", "to", "was", "we", "what", "when",
    "where", "which", "who", "why", "with", "you",
];

/// Lowercased content words of `text`.
pub fn content_words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect()
}

/// Bag-of-words embedder: each content word bumps one hashed dimension.
pub struct HashingEmbedder {
    dimensions: usize,
    calls: AtomicUsize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dimensions: 256,
            calls: AtomicUsize::new(0),
        }
    }
}

impl HashingEmbedder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.dimensions];
        for word in content_words(text) {
            let mut hasher = DefaultHasher::new();
            word.hash(&mut hasher);
            vector[(hasher.finish() as usize) % self.dimensions] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.vectorize(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }
}

/// Embedder whose every call fails.
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(VidaskError::OpenAI("embedding service unavailable".to_string()))
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(VidaskError::OpenAI("embedding service unavailable".to_string()))
    }
}

/// A generator that honours the prompt contracts without a model.
///
/// Correction prompts get the sentence back with known typos fixed. Answer
/// prompts get the context sentence sharing the most content words with the
/// question, or the unknown-answer sentinel when nothing overlaps.
#[derive(Default)]
pub struct GroundedGenerator {
    prompts: Mutex<Vec<String>>,
    fail_on_call: Option<usize>,
}

impl GroundedGenerator {
    /// Fail the call with this zero-based index.
    pub fn failing_on(call: usize) -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            fail_on_call: Some(call),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    fn correct(sentence: &str) -> String {
        let fixes: HashMap<&str, &str> =
            [("colr", "color"), ("teh", "the"), ("whta", "what"), ("skyy", "sky")]
                .into_iter()
                .collect();
        sentence
            .split(' ')
            .map(|w| {
                let lower = w.to_lowercase();
                match fixes.get(lower.as_str()) {
                    Some(fixed) if w.starts_with(char::is_uppercase) => {
                        let mut chars = fixed.chars();
                        chars
                            .next()
                            .map(|c| c.to_uppercase().chain(chars).collect::<String>())
                            .unwrap_or_default()
                    }
                    Some(fixed) => fixed.to_string(),
                    None => w.to_string(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn answer(context: &str, question: &str) -> String {
        let wanted: HashSet<String> = content_words(question).into_iter().collect();

        context
            .split_inclusive(['.', '!', '?'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|sentence| {
                let overlap = content_words(sentence)
                    .into_iter()
                    .filter(|w| wanted.contains(w))
                    .count();
                (overlap, sentence)
            })
            .filter(|(overlap, _)| *overlap > 0)
            .max_by_key(|(overlap, _)| *overlap)
            .map(|(_, sentence)| sentence.to_string())
            .unwrap_or_else(|| UNKNOWN_ANSWER.to_string())
    }
}

fn between<'a>(text: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let from = text.find(start)? + start.len();
    let to = from + text[from..].find(end)?;
    Some(&text[from..to])
}

#[async_trait]
impl Generator for GroundedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let call = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            prompts.len() - 1
        };
        if self.fail_on_call == Some(call) {
            return Err(VidaskError::OpenAI("model overloaded".to_string()));
        }

        if let Some(sentence) = between(prompt, "Sentence: ", "\nCorrected Sentence:") {
            return Ok(Self::correct(sentence));
        }

        let context = between(prompt, "Context:\n", "\n\nQuestion: ").unwrap_or_default();
        let question = prompt
            .rsplit_once("Question: ")
            .map(|(_, q)| q.trim())
            .unwrap_or_default();
        Ok(Self::answer(context, question))
    }
}

/// What a [`StaticTranscripts`] entry resolves to.
pub enum StaticEntry {
    Text(String),
    Disabled,
    Error(String),
}

/// Transcript provider serving fixed entries keyed by video id.
#[derive(Default)]
pub struct StaticTranscripts {
    entries: HashMap<String, StaticEntry>,
    fetches: Mutex<Vec<(String, Vec<String>)>>,
}

impl StaticTranscripts {
    pub fn with(mut self, video_id: &str, entry: StaticEntry) -> Self {
        self.entries.insert(video_id.to_string(), entry);
        self
    }

    pub fn with_text(self, video_id: &str, text: &str) -> Self {
        self.with(video_id, StaticEntry::Text(text.to_string()))
    }

    /// Every (video id, languages) pair fetched so far.
    pub fn fetches(&self) -> Vec<(String, Vec<String>)> {
        self.fetches.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranscriptProvider for StaticTranscripts {
    async fn fetch(&self, video_id: &str, languages: &[String]) -> Result<Transcript> {
        self.fetches
            .lock()
            .unwrap()
            .push((video_id.to_string(), languages.to_vec()));

        match self.entries.get(video_id) {
            Some(StaticEntry::Text(text)) => {
                let segments = text
                    .split_inclusive(['.', '!', '?'])
                    .enumerate()
                    .map(|(i, s)| TranscriptSegment::new(s.trim(), i as f64 * 2.0, 2.0))
                    .collect();
                Ok(Transcript::new(video_id, languages[0].clone(), false, segments))
            }
            Some(StaticEntry::Disabled) => Err(VidaskError::TranscriptsUnavailable {
                video_id: video_id.to_string(),
                languages: describe_languages(languages),
            }),
            Some(StaticEntry::Error(message)) => Err(VidaskError::TranscriptFetch(message.clone())),
            None => Err(VidaskError::TranscriptFetch(format!(
                "the video {} is no longer available",
                video_id
            ))),
        }
    }
}

const RATE_LIMIT_BODY: &str = r#"{"error":{"message":"Rate limit reached","type":"requests","param":null,"code":"rate_limit_exceeded"}}"#;

/// Local HTTP server answering every request with an OpenAI-style 429.
pub struct RateLimitedServer {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl RateLimitedServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let counter = counter.clone();
                tokio::spawn(async move {
                    if read_request(&mut stream).await.is_ok() {
                        counter.fetch_add(1, Ordering::SeqCst);
                    }
                    let response = format!(
                        "HTTP/1.1 429 Too Many Requests\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        RATE_LIMIT_BODY.len(),
                        RATE_LIMIT_BODY
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        Self { addr, hits }
    }

    /// Base URL to configure as the OpenAI `api_base`.
    pub fn api_base(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Requests received so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Read one request: headers, then `content-length` bytes of body.
async fn read_request(stream: &mut TcpStream) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let body_len = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_words() {
        assert_eq!(content_words("What color is the sky?"), vec!["color", "sky"]);
    }

    #[test]
    fn test_correct_keeps_capitalisation() {
        assert_eq!(
            GroundedGenerator::correct("Whta colr is teh sky?"),
            "What color is the sky?"
        );
    }

    #[tokio::test]
    async fn test_grounded_answer_contract() {
        let generator = GroundedGenerator::default();
        let grounded = generator
            .generate("Context:\nThe sky is blue.\n\nQuestion: What color is the sky?\n")
            .await
            .unwrap();
        assert_eq!(grounded, "The sky is blue.");

        let unknown = generator
            .generate("Context:\nWhisk the eggs.\n\nQuestion: What is the capital of France?\n")
            .await
            .unwrap();
        assert_eq!(unknown, UNKNOWN_ANSWER);
    }
}
