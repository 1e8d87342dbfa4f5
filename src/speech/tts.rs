//! Cloud text-to-speech.
//!
//! POST `https://api.openai.com/v1/audio/speech` with `response_format: pcm`
//! returns raw 24 kHz 16-bit mono PCM, which is converted to f32 samples for
//! rodio.

use std::future::Future;
use std::pin::Pin;

use tracing::info;

/// Output sample rate of the OpenAI PCM format.
pub const OPENAI_SAMPLE_RATE: u32 = 24_000;

/// Common trait for TTS engines (dyn-compatible).
pub trait TtsEngine: Send + Sync {
    /// Synthesize text to f32 PCM audio samples.
    fn synthesize(
        &self,
        text: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<f32>>> + Send + '_>>;

    /// Display name, e.g. "OpenAI TTS (alloy)".
    fn name(&self) -> String;

    fn sample_rate(&self) -> u32;
}

/// Create a TTS engine from config values. `"none"` yields `Ok(None)`.
pub fn create_tts_engine(
    adapter: &str,
    voice: Option<&str>,
    api_key: Option<&str>,
    client: reqwest::Client,
) -> anyhow::Result<Option<Box<dyn TtsEngine>>> {
    match adapter {
        "none" | "" => Ok(None),
        "openai-tts" => {
            let key = api_key.ok_or_else(|| anyhow::anyhow!("OpenAI TTS requires an API key"))?;
            let v = voice.unwrap_or("alloy");
            Ok(Some(Box::new(OpenAiTts::new(key, v, client))))
        }
        other => anyhow::bail!("Unknown TTS adapter: {}", other),
    }
}

/// OpenAI TTS via REST API.
pub struct OpenAiTts {
    api_key: String,
    voice: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiTts {
    pub fn new(api_key: &str, voice: &str, client: reqwest::Client) -> Self {
        Self {
            api_key: api_key.to_string(),
            voice: voice.to_string(),
            model: "tts-1".to_string(),
            client,
        }
    }
}

impl TtsEngine for OpenAiTts {
    fn synthesize(
        &self,
        text: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<f32>>> + Send + '_>> {
        let text = text.to_string();
        Box::pin(async move {
            if text.trim().is_empty() {
                return Ok(Vec::new());
            }

            info!(voice = %self.voice, text_len = text.len(), "OpenAI TTS request");

            let body = serde_json::json!({
                "model": self.model,
                "input": text,
                "voice": self.voice,
                "response_format": "pcm",
            });

            let resp = self
                .client
                .post("https://api.openai.com/v1/audio/speech")
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| anyhow::anyhow!("OpenAI TTS request failed: {}", e))?;

            if !resp.status().is_success() {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                anyhow::bail!("OpenAI TTS API error {}: {}", status, body);
            }

            let bytes = resp
                .bytes()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to read OpenAI TTS response: {}", e))?;

            Ok(pcm16_to_f32(&bytes))
        })
    }

    fn name(&self) -> String {
        format!("OpenAI TTS ({})", self.voice)
    }

    fn sample_rate(&self) -> u32 {
        OPENAI_SAMPLE_RATE
    }
}

/// Little-endian i16 PCM to f32 in [-1, 1). A trailing odd byte is dropped.
pub fn pcm16_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|chunk| i16::from_le_bytes([chunk[0], chunk[1]]) as f32 / 32768.0)
        .collect()
}
