//! Speech output (`speak`) and speech input (`take_command`).

pub mod capture;
pub mod playback;
pub mod stt;
pub mod tts;

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use tracing::{info, warn};

use crate::config::SpeechConfig;
use crate::ipc::{UiBridge, UiEvent};

use playback::AudioPlayer;
use stt::Transcriber;
use tts::TtsEngine;

/// Speech output capability.
pub trait Speaker: Send + Sync {
    /// Say `text`. Resolves once the text has been handed off (and, for
    /// local synthesis, played). Never fails from the caller's view.
    fn speak<'a>(&'a self, text: &'a str) -> BoxFuture<'a, ()>;
}

/// Speech input capability.
pub trait SpeechInput: Send + Sync {
    /// Capture one utterance. `None` when nothing intelligible was heard.
    fn take_command(&self) -> BoxFuture<'_, Option<String>>;
}

/// Production speaker: forwards text to the UI and optionally voices it
/// locally.
pub struct VoiceOutput {
    ui: Arc<dyn UiBridge>,
    tts: Option<Box<dyn TtsEngine>>,
    volume: f32,
}

impl VoiceOutput {
    pub fn new(ui: Arc<dyn UiBridge>, tts: Option<Box<dyn TtsEngine>>, volume: f32) -> Self {
        if let Some(engine) = &tts {
            info!(engine = %engine.name(), "Local speech synthesis enabled");
        }
        Self { ui, tts, volume }
    }

    async fn voice_locally(&self, engine: &dyn TtsEngine, text: &str) -> anyhow::Result<()> {
        let samples = engine.synthesize(text).await?;
        let sample_rate = engine.sample_rate();
        let volume = self.volume;
        tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
            let player = AudioPlayer::new()?;
            player.set_volume(volume);
            player.play(samples, sample_rate);
            Ok(())
        })
        .await??;
        Ok(())
    }
}

impl Speaker for VoiceOutput {
    fn speak<'a>(&'a self, text: &'a str) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            info!(text = %text, "speak");
            self.ui.emit(UiEvent::Speak {
                text: text.to_string(),
            });
            if let Some(engine) = &self.tts {
                if let Err(e) = self.voice_locally(engine.as_ref(), text).await {
                    warn!("Speech synthesis failed: {:#}", e);
                }
            }
        })
    }
}

/// Records a fixed window from the microphone and transcribes it.
pub struct MicrophoneInput {
    window: Duration,
    device: Option<String>,
    stt: Transcriber,
}

impl MicrophoneInput {
    pub fn new(window: Duration, device: Option<String>, stt: Transcriber) -> Self {
        Self {
            window,
            device,
            stt,
        }
    }

    async fn listen(&self) -> anyhow::Result<String> {
        let window = self.window;
        let device = self.device.clone();
        let audio =
            tokio::task::spawn_blocking(move || capture::record(window, device.as_deref()))
                .await??;
        self.stt.transcribe(&audio).await
    }
}

impl SpeechInput for MicrophoneInput {
    fn take_command(&self) -> BoxFuture<'_, Option<String>> {
        Box::pin(async move {
            match self.listen().await {
                Ok(text) => {
                    let text = text.trim().to_string();
                    (!text.is_empty()).then_some(text)
                }
                Err(e) => {
                    warn!("Speech recognition failed: {:#}", e);
                    None
                }
            }
        })
    }
}

/// Build the speech input from config. `Ok(None)` when no STT adapter is set.
pub fn create_speech_input(
    config: &SpeechConfig,
    client: reqwest::Client,
) -> anyhow::Result<Option<Arc<dyn SpeechInput>>> {
    let adapter = stt::create_stt_engine(
        &config.stt_adapter,
        config.stt_api_key.as_deref(),
        config.stt_endpoint.as_deref(),
        client,
    )?;
    Ok(adapter.map(|stt| {
        Arc::new(MicrophoneInput::new(
            Duration::from_secs(config.listen_seconds.max(1)),
            config.input_device.clone(),
            stt,
        )) as Arc<dyn SpeechInput>
    }))
}

/// Build the speaker from config.
pub fn create_speaker(
    config: &SpeechConfig,
    ui: Arc<dyn UiBridge>,
    client: reqwest::Client,
) -> anyhow::Result<Arc<dyn Speaker>> {
    let engine = tts::create_tts_engine(
        &config.tts_adapter,
        config.tts_voice.as_deref(),
        config.tts_api_key.as_deref(),
        client,
    )?;
    Ok(Arc::new(VoiceOutput::new(ui, engine, config.tts_volume)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<UiEvent>>);

    impl UiBridge for Recorder {
        fn emit(&self, event: UiEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    #[tokio::test]
    async fn test_voice_output_forwards_to_ui() {
        let ui = Arc::new(Recorder::default());
        let speaker = VoiceOutput::new(ui.clone(), None, 1.0);
        speaker.speak("Hello there").await;

        let events = ui.0.lock().unwrap();
        assert_eq!(
            *events,
            vec![UiEvent::Speak {
                text: "Hello there".into()
            }]
        );
    }

    #[test]
    fn test_no_stt_adapter_means_no_input() {
        let config = SpeechConfig::default();
        let input = create_speech_input(&config, reqwest::Client::new()).unwrap();
        assert!(input.is_none());
    }
}
