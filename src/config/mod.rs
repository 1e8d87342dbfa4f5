//! Configuration reading and data directory paths.

pub mod paths;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use paths::{get_data_dir, get_desktop_dir};

/// assistant_config.json shape. Every field is optional on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantConfig {
    /// Wake word stripped from "open" commands.
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,
    #[serde(default)]
    pub weather_api_key: Option<String>,
    #[serde(default)]
    pub currency_api_key: Option<String>,
    /// Service URLs sit at the top level of the file.
    #[serde(flatten)]
    pub services: ServiceEndpoints,
    #[serde(default)]
    pub dataset_dir: Option<PathBuf>,
    #[serde(default)]
    pub sound_dir: Option<PathBuf>,
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    /// Static contact directory: lowercase name -> phone number.
    #[serde(default)]
    pub contacts: BTreeMap<String, String>,
    #[serde(default = "default_message_delay")]
    pub message_delay_minutes: u32,
    #[serde(default = "default_creator_credit")]
    pub creator_credit: String,
    #[serde(default)]
    pub background_failures: BackgroundFailures,
    /// `None` keeps HTTP calls unbounded.
    #[serde(default)]
    pub http_timeout_secs: Option<u64>,
    #[serde(default)]
    pub speech: SpeechConfig,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            assistant_name: default_assistant_name(),
            weather_api_key: None,
            currency_api_key: None,
            services: ServiceEndpoints::default(),
            dataset_dir: None,
            sound_dir: None,
            database_path: None,
            contacts: BTreeMap::new(),
            message_delay_minutes: default_message_delay(),
            creator_credit: default_creator_credit(),
            background_failures: BackgroundFailures::default(),
            http_timeout_secs: None,
            speech: SpeechConfig::default(),
        }
    }
}

/// Base URLs of the HTTP capabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEndpoints {
    #[serde(default = "default_weather_url")]
    pub weather_url: String,
    #[serde(default = "default_geolocation_url")]
    pub geolocation_url: String,
    #[serde(default = "default_currency_url")]
    pub currency_url: String,
    #[serde(default = "default_encyclopedia_url")]
    pub encyclopedia_url: String,
    #[serde(default = "default_translate_url")]
    pub translate_url: String,
    #[serde(default = "default_video_url")]
    pub video_url: String,
    #[serde(default = "default_messaging_url")]
    pub messaging_url: String,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            weather_url: default_weather_url(),
            geolocation_url: default_geolocation_url(),
            currency_url: default_currency_url(),
            encyclopedia_url: default_encyclopedia_url(),
            translate_url: default_translate_url(),
            video_url: default_video_url(),
            messaging_url: default_messaging_url(),
        }
    }
}

/// What happens when a detached background job (sound, timer, scheduled
/// message) fails. Neither option reports to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundFailures {
    #[default]
    Silent,
    Log,
}

impl BackgroundFailures {
    /// Apply the policy to a finished background job.
    pub fn report(self, job: &str, result: anyhow::Result<()>) {
        if let Err(e) = result {
            if self == Self::Log {
                warn!(job, "Background job failed: {:#}", e);
            }
        }
    }
}

/// Speech input/output adapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig {
    /// "none" or "openai-tts".
    #[serde(default = "default_none")]
    pub tts_adapter: String,
    #[serde(default)]
    pub tts_api_key: Option<String>,
    #[serde(default)]
    pub tts_voice: Option<String>,
    #[serde(default = "default_volume")]
    pub tts_volume: f32,
    /// "none", "openai-cloud" or "custom-cloud".
    #[serde(default = "default_none")]
    pub stt_adapter: String,
    #[serde(default)]
    pub stt_api_key: Option<String>,
    #[serde(default)]
    pub stt_endpoint: Option<String>,
    #[serde(default = "default_listen_seconds")]
    pub listen_seconds: u64,
    #[serde(default)]
    pub input_device: Option<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            tts_adapter: default_none(),
            tts_api_key: None,
            tts_voice: None,
            tts_volume: default_volume(),
            stt_adapter: default_none(),
            stt_api_key: None,
            stt_endpoint: None,
            listen_seconds: default_listen_seconds(),
            input_device: None,
        }
    }
}

fn default_assistant_name() -> String {
    "man".into()
}
fn default_message_delay() -> u32 {
    2
}
fn default_creator_credit() -> String {
    "I was made by the Desk Assistant team.".into()
}
fn default_weather_url() -> String {
    "http://api.openweathermap.org/data/2.5/weather".into()
}
fn default_geolocation_url() -> String {
    "https://ipinfo.io/json".into()
}
fn default_currency_url() -> String {
    "https://v6.exchangerate-api.com/v6".into()
}
fn default_encyclopedia_url() -> String {
    "https://en.wikipedia.org".into()
}
fn default_translate_url() -> String {
    "https://translate.googleapis.com/translate_a/single".into()
}
fn default_video_url() -> String {
    "https://www.youtube.com".into()
}
fn default_messaging_url() -> String {
    "https://web.whatsapp.com/send".into()
}
fn default_none() -> String {
    "none".into()
}
fn default_volume() -> f32 {
    1.0
}
fn default_listen_seconds() -> u64 {
    5
}

impl AssistantConfig {
    /// Load from `path`, or from the data directory when `None`, then apply
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);
        let mut config: Self = read_json_file(&path).unwrap_or_default();
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        let env = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        if let Some(key) = env("DESK_ASSISTANT_WEATHER_KEY") {
            self.weather_api_key = Some(key);
        }
        if let Some(key) = env("DESK_ASSISTANT_CURRENCY_KEY") {
            self.currency_api_key = Some(key);
        }
        if let Some(key) = env("DESK_ASSISTANT_TTS_KEY") {
            self.speech.tts_api_key = Some(key);
        }
        if let Some(key) = env("DESK_ASSISTANT_STT_KEY") {
            self.speech.stt_api_key = Some(key);
        }
    }

    pub fn dataset_dir(&self) -> PathBuf {
        self.dataset_dir.clone().unwrap_or_else(get_desktop_dir)
    }

    pub fn sound_dir(&self) -> PathBuf {
        self.sound_dir
            .clone()
            .unwrap_or_else(|| get_data_dir().join("sounds"))
    }

    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| get_data_dir().join("assistant.db"))
    }

    /// Look up a contact case-insensitively.
    pub fn contact_number(&self, name: &str) -> Option<&str> {
        let wanted = name.to_lowercase();
        self.contacts
            .iter()
            .find(|(k, _)| k.to_lowercase() == wanted)
            .map(|(_, v)| v.as_str())
    }

    /// Shared HTTP client honoring `httpTimeoutSecs`.
    pub fn http_client(&self) -> anyhow::Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            "desk-assistant/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(secs) = self.http_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(builder.build()?)
    }
}

/// Path to assistant_config.json.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("assistant_config.json")
}

/// Generic helper: read a JSON file and deserialize it.
fn read_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(val) => Some(val),
            Err(e) => {
                warn!("Failed to parse {}: {}", path.display(), e);
                None
            }
        },
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to read {}: {}", path.display(), e);
            }
            None
        }
    }
}
