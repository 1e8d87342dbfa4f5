//! Recording fakes shared by handler and dispatcher tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveTime;
use futures_util::future::BoxFuture;

use super::currency::{RateService, RateTable};
use super::encyclopedia::{Article, Encyclopedia};
use super::launcher::Launcher;
use super::media::VideoPlayer;
use super::messaging::MessageScheduler;
use super::translate::Translator;
use super::weather::{Geolocator, WeatherReport, WeatherService};
use crate::config::AssistantConfig;
use crate::context::AssistantContext;
use crate::ipc::{UiBridge, UiEvent};
use crate::store::LookupStore;
use crate::sounds::{Sound, SoundPlayer};
use crate::speech::Speaker;

#[derive(Debug, Clone, PartialEq)]
pub enum Launch {
    Path(String),
    Url(String),
    Name(String),
}

#[derive(Default)]
pub struct RecordingLauncher {
    pub launches: Mutex<Vec<Launch>>,
    pub fail: bool,
}

impl RecordingLauncher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn taken(&self) -> Vec<Launch> {
        self.launches.lock().unwrap().clone()
    }

    fn record(&self, launch: Launch) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("launch refused");
        }
        self.launches.lock().unwrap().push(launch);
        Ok(())
    }
}

impl Launcher for RecordingLauncher {
    fn launch_path(&self, path: &str) -> anyhow::Result<()> {
        self.record(Launch::Path(path.to_string()))
    }

    fn open_url(&self, url: &str) -> anyhow::Result<()> {
        self.record(Launch::Url(url.to_string()))
    }

    fn launch_by_name(&self, name: &str) -> anyhow::Result<()> {
        self.record(Launch::Name(name.to_string()))
    }
}

#[derive(Default)]
pub struct RecordingSpeaker(pub Mutex<Vec<String>>);

impl RecordingSpeaker {
    pub fn spoken(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl Speaker for RecordingSpeaker {
    fn speak<'a>(&'a self, text: &'a str) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            self.0.lock().unwrap().push(text.to_string());
        })
    }
}

#[derive(Default)]
pub struct RecordingSounds(pub Mutex<Vec<(Sound, Option<Duration>)>>);

impl RecordingSounds {
    pub fn played(&self) -> Vec<(Sound, Option<Duration>)> {
        self.0.lock().unwrap().clone()
    }
}

impl SoundPlayer for RecordingSounds {
    fn play(&self, sound: Sound) {
        self.0.lock().unwrap().push((sound, None));
    }

    fn play_for(&self, sound: Sound, duration: Duration) {
        self.0.lock().unwrap().push((sound, Some(duration)));
    }
}

#[derive(Default)]
pub struct RecordingUi(pub Mutex<Vec<UiEvent>>);

impl RecordingUi {
    pub fn events(&self) -> Vec<UiEvent> {
        self.0.lock().unwrap().clone()
    }
}

impl UiBridge for RecordingUi {
    fn emit(&self, event: UiEvent) {
        self.0.lock().unwrap().push(event);
    }
}

/// Every network collaborator at once, always failing.
pub struct Offline;

fn offline<T>() -> anyhow::Result<T> {
    anyhow::bail!("offline")
}

impl Encyclopedia for Offline {
    fn lookup<'a>(&'a self, _topic: &'a str) -> BoxFuture<'a, anyhow::Result<Article>> {
        Box::pin(async { offline() })
    }
}

impl VideoPlayer for Offline {
    fn play<'a>(&'a self, _term: &'a str) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async { offline() })
    }
}

impl WeatherService for Offline {
    fn current<'a>(
        &'a self,
        _city: &'a str,
    ) -> BoxFuture<'a, anyhow::Result<Option<WeatherReport>>> {
        Box::pin(async { offline() })
    }
}

impl Geolocator for Offline {
    fn city(&self) -> BoxFuture<'_, anyhow::Result<Option<String>>> {
        Box::pin(async { offline() })
    }
}

impl RateService for Offline {
    fn latest<'a>(&'a self, _base: &'a str) -> BoxFuture<'a, anyhow::Result<RateTable>> {
        Box::pin(async { offline() })
    }
}

impl Translator for Offline {
    fn translate<'a>(
        &'a self,
        _text: &'a str,
        _target_lang: &'a str,
    ) -> BoxFuture<'a, anyhow::Result<String>> {
        Box::pin(async { offline() })
    }
}

impl MessageScheduler for Offline {
    fn schedule(&self, _phone: &str, _body: &str, _at: NaiveTime) -> anyhow::Result<()> {
        offline()
    }
}

/// Recorders handed out by [`context`], for assertions.
pub struct Observers {
    pub ui: Arc<RecordingUi>,
    pub speaker: Arc<RecordingSpeaker>,
    pub sounds: Arc<RecordingSounds>,
    pub launcher: Arc<RecordingLauncher>,
}

/// A context with in-memory storage, recording I/O and offline services.
pub fn context() -> (AssistantContext, Observers) {
    let seen = Observers {
        ui: Arc::new(RecordingUi::default()),
        speaker: Arc::new(RecordingSpeaker::default()),
        sounds: Arc::new(RecordingSounds::default()),
        launcher: Arc::new(RecordingLauncher::default()),
    };
    let ctx = AssistantContext {
        config: AssistantConfig::default(),
        store: LookupStore::in_memory().unwrap(),
        ui: seen.ui.clone(),
        speaker: seen.speaker.clone(),
        speech_input: None,
        sounds: seen.sounds.clone(),
        launcher: seen.launcher.clone(),
        encyclopedia: Arc::new(Offline),
        videos: Arc::new(Offline),
        weather: Arc::new(Offline),
        geolocator: Arc::new(Offline),
        rates: Arc::new(Offline),
        translator: Arc::new(Offline),
        messages: Arc::new(Offline),
    };
    (ctx, seen)
}
