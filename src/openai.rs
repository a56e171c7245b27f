//! OpenAI client configuration with sensible defaults.

use crate::config::OpenAISettings;
use crate::error::{Result, VidaskError};
use async_openai::{config::OpenAIConfig, Client};
use backoff::ExponentialBackoff;
use std::time::Duration;

/// Create an OpenAI client from settings.
///
/// The API key is read from `OPENAI_API_KEY` by the client config. Every call
/// made through the client is bounded by `settings.timeout_secs` and sent
/// exactly once: rate-limit responses surface as errors instead of retries.
pub fn create_client(settings: &OpenAISettings) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build()
        .map_err(|e| VidaskError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let mut config = OpenAIConfig::default();
    if let Some(base) = settings.api_base() {
        config = config.with_api_base(base);
    }

    Ok(Client::with_config(config)
        .with_http_client(http_client)
        .with_backoff(no_retry()))
}

/// A backoff whose elapsed-time budget is already spent after the first attempt.
fn no_retry() -> ExponentialBackoff {
    backoff::ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationSettings;
    use crate::generation::{Generator, OpenAIGenerator};
    use crate::testing::RateLimitedServer;
    use backoff::backoff::Backoff;

    #[test]
    fn test_no_retry_backoff_gives_up_immediately() {
        let mut backoff = no_retry();
        std::thread::sleep(Duration::from_millis(2));
        assert_eq!(backoff.next_backoff(), None);
    }

    #[tokio::test]
    async fn test_rate_limited_generation_is_sent_once() {
        let server = RateLimitedServer::start().await;
        let settings = OpenAISettings {
            api_base: server.api_base(),
            timeout_secs: 5,
        };
        let client = create_client(&settings).unwrap();
        let generator = OpenAIGenerator::new(client, &GenerationSettings::default());

        let result = tokio::time::timeout(Duration::from_secs(10), generator.generate("hi"))
            .await
            .expect("generation kept retrying");

        assert!(matches!(result, Err(VidaskError::OpenAI(_))));
        assert_eq!(server.hits(), 1);
    }
}
