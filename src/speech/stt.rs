//! Cloud transcription of a recorded command.
//!
//! Both supported backends accept the Whisper-style multipart upload (a
//! `file` part holding a WAV and a `model` field) and answer `{"text": ...}`.

use reqwest::multipart;
use tracing::debug;

use super::capture::TARGET_SAMPLE_RATE;

const OPENAI_TRANSCRIPTION_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
const TRANSCRIPTION_MODEL: &str = "whisper-1";

/// Speech-to-text over HTTP.
pub struct Transcriber {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl Transcriber {
    pub fn new(endpoint: &str, api_key: Option<String>, client: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            api_key,
            client,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Transcribe 16 kHz mono audio. An empty string means nothing was said.
    pub async fn transcribe(&self, audio: &[f32]) -> anyhow::Result<String> {
        let wav = encode_wav(audio, TARGET_SAMPLE_RATE);
        debug!(bytes = wav.len(), endpoint = %self.endpoint, "Uploading command audio");

        let form = multipart::Form::new()
            .text("model", TRANSCRIPTION_MODEL)
            .part(
                "file",
                multipart::Part::bytes(wav)
                    .file_name("command.wav")
                    .mime_str("audio/wav")?,
            );

        let mut request = self.client.post(&self.endpoint).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Transcription failed with {}: {}", status, body);
        }

        let json: serde_json::Value = response.json().await?;
        Ok(json["text"].as_str().unwrap_or_default().trim().to_string())
    }
}

/// Build the transcriber named by `adapter`. `"none"` yields `Ok(None)`.
///
/// Adapters: "none", "openai-cloud" (needs a key), "custom-cloud" (needs an
/// endpoint, key optional).
pub fn create_stt_engine(
    adapter: &str,
    api_key: Option<&str>,
    endpoint: Option<&str>,
    client: reqwest::Client,
) -> anyhow::Result<Option<Transcriber>> {
    let api_key = api_key.map(str::to_string);
    match adapter {
        "none" | "" => Ok(None),
        "openai-cloud" => {
            anyhow::ensure!(api_key.is_some(), "OpenAI transcription requires an API key");
            Ok(Some(Transcriber::new(OPENAI_TRANSCRIPTION_URL, api_key, client)))
        }
        "custom-cloud" => {
            let endpoint = endpoint
                .ok_or_else(|| anyhow::anyhow!("Custom transcription requires an endpoint URL"))?;
            Ok(Some(Transcriber::new(endpoint, api_key, client)))
        }
        other => anyhow::bail!("Unknown STT adapter: {}", other),
    }
}

/// 16-bit PCM mono WAV.
pub fn encode_wav(audio: &[f32], sample_rate: u32) -> Vec<u8> {
    const HEADER_LEN: usize = 44;
    let data_len = (audio.len() * 2) as u32;

    let mut wav = Vec::with_capacity(HEADER_LEN + data_len as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(data_len + HEADER_LEN as u32 - 8).to_le_bytes());
    wav.extend_from_slice(b"WAVEfmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&[1, 0, 1, 0]); // PCM, mono
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    wav.extend_from_slice(&[2, 0, 16, 0]); // block align, bits per sample
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.extend(
        audio
            .iter()
            .flat_map(|s| ((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16).to_le_bytes()),
    );
    wav
}
