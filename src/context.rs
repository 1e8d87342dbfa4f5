//! Everything a dispatch needs, wired once at startup.

use std::sync::Arc;

use tracing::info;

use crate::config::AssistantConfig;
use crate::handlers::currency::{ExchangeRateClient, RateService};
use crate::handlers::encyclopedia::{Encyclopedia, WikipediaClient};
use crate::handlers::launcher::{Launcher, SystemLauncher};
use crate::handlers::media::{VideoPlayer, YouTubePlayer};
use crate::handlers::messaging::{MessageScheduler, WhatsAppWebScheduler};
use crate::handlers::translate::{GoogleTranslator, Translator};
use crate::handlers::weather::{Geolocator, IpInfoClient, OpenWeatherClient, WeatherService};
use crate::ipc::UiBridge;
use crate::sounds::{RodioSounds, SoundPlayer};
use crate::speech::{self, SpeechInput, Speaker};
use crate::store::LookupStore;

pub struct AssistantContext {
    pub config: AssistantConfig,
    pub store: LookupStore,
    pub ui: Arc<dyn UiBridge>,
    pub speaker: Arc<dyn Speaker>,
    /// `None` when no speech-to-text adapter is configured.
    pub speech_input: Option<Arc<dyn SpeechInput>>,
    pub sounds: Arc<dyn SoundPlayer>,
    pub launcher: Arc<dyn Launcher>,
    pub encyclopedia: Arc<dyn Encyclopedia>,
    pub videos: Arc<dyn VideoPlayer>,
    pub weather: Arc<dyn WeatherService>,
    pub geolocator: Arc<dyn Geolocator>,
    pub rates: Arc<dyn RateService>,
    pub translator: Arc<dyn Translator>,
    pub messages: Arc<dyn MessageScheduler>,
}

impl AssistantContext {
    /// Build the production collaborators from `config`.
    pub fn from_config(config: AssistantConfig, ui: Arc<dyn UiBridge>) -> anyhow::Result<Self> {
        let client = config.http_client()?;
        let store = LookupStore::open(&config.database_path())?;
        let launcher: Arc<dyn Launcher> = Arc::new(SystemLauncher);
        let services = &config.services;

        let speaker = speech::create_speaker(&config.speech, ui.clone(), client.clone())?;
        let speech_input = speech::create_speech_input(&config.speech, client.clone())?;
        if speech_input.is_none() {
            info!("No speech-to-text adapter configured; typed commands only");
        }

        Ok(Self {
            store,
            ui,
            speaker,
            speech_input,
            sounds: Arc::new(RodioSounds::new(
                config.sound_dir(),
                config.background_failures,
            )),
            encyclopedia: Arc::new(WikipediaClient::new(
                &services.encyclopedia_url,
                client.clone(),
            )),
            videos: Arc::new(YouTubePlayer::new(
                &services.video_url,
                client.clone(),
                launcher.clone(),
            )),
            weather: Arc::new(OpenWeatherClient::new(
                &services.weather_url,
                config.weather_api_key.clone(),
                client.clone(),
            )),
            geolocator: Arc::new(IpInfoClient::new(&services.geolocation_url, client.clone())),
            rates: Arc::new(ExchangeRateClient::new(
                &services.currency_url,
                config.currency_api_key.clone(),
                client.clone(),
            )),
            translator: Arc::new(GoogleTranslator::new(&services.translate_url, client)),
            messages: Arc::new(WhatsAppWebScheduler::new(
                &services.messaging_url,
                launcher.clone(),
                config.background_failures,
            )),
            launcher,
            config,
        })
    }
}
