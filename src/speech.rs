//! Text-to-speech proxy client for Google Cloud TTS.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::TtsConfig;

const SYNTHESIZE_URL: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Converts text to MP3 audio bytes. Callers reject empty text before
    /// reaching this.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

pub struct GoogleSpeechClient {
    client: reqwest::Client,
    config: TtsConfig,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

impl GoogleSpeechClient {
    pub fn new(config: TtsConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleSpeechClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("TTS_API_KEY not configured"))?;

        let request = json!({
            "input": { "text": text },
            "voice": {
                "languageCode": self.config.language_code,
                "name": self.config.voice,
            },
            "audioConfig": { "audioEncoding": "MP3" },
        });

        let response = self
            .client
            .post(SYNTHESIZE_URL)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .context("synthesis request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("synthesis service returned {status}: {body}"));
        }

        let synthesized: SynthesizeResponse = response
            .json()
            .await
            .context("decoding synthesis response")?;

        let audio = BASE64
            .decode(synthesized.audio_content)
            .context("synthesis audio was not valid base64")?;

        debug!(bytes = audio.len(), "Synthesized speech");

        Ok(audio)
    }
}
