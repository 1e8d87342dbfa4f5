//! Short feedback sounds.
//!
//! Every call spawns a detached blocking task: nothing waits for it, nothing
//! can cancel it, and its failure never reaches the user. The configured
//! [`BackgroundFailures`] policy decides whether failures are logged.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};
use tracing::debug;

use crate::config::BackgroundFailures;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    Click,
    Startup,
    Alarm,
    Timer,
}

impl Sound {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Click => "click_sound.mp3",
            Self::Startup => "start_sound.mp3",
            Self::Alarm => "alarm.wav",
            Self::Timer => "timer.mp3",
        }
    }
}

pub trait SoundPlayer: Send + Sync {
    /// Play once, without waiting.
    fn play(&self, sound: Sound);

    /// Loop the sound for `duration`, without waiting.
    fn play_for(&self, sound: Sound, duration: Duration);
}

/// Plays sound files from a directory through rodio.
pub struct RodioSounds {
    dir: PathBuf,
    failures: BackgroundFailures,
}

impl RodioSounds {
    pub fn new(dir: PathBuf, failures: BackgroundFailures) -> Self {
        Self { dir, failures }
    }

    fn spawn(&self, sound: Sound, looping: Option<Duration>) {
        let path = self.dir.join(sound.file_name());
        let failures = self.failures;
        debug!(path = %path.display(), ?looping, "Playing sound");
        // Dropping the JoinHandle detaches the task.
        drop(tokio::task::spawn_blocking(move || {
            failures.report("sound", play_file(&path, looping));
        }));
    }
}

impl SoundPlayer for RodioSounds {
    fn play(&self, sound: Sound) {
        self.spawn(sound, None);
    }

    fn play_for(&self, sound: Sound, duration: Duration) {
        self.spawn(sound, Some(duration));
    }
}

/// Decode and play `path` on the current thread.
fn play_file(path: &Path, looping: Option<Duration>) -> anyhow::Result<()> {
    let file = File::open(path)
        .map_err(|e| anyhow::anyhow!("Failed to open {}: {}", path.display(), e))?;
    let source = Decoder::new(BufReader::new(file))
        .map_err(|e| anyhow::anyhow!("Failed to decode {}: {}", path.display(), e))?;

    let (_stream, handle) = OutputStream::try_default()
        .map_err(|e| anyhow::anyhow!("Failed to open audio output: {}", e))?;
    let sink = Sink::try_new(&handle)
        .map_err(|e| anyhow::anyhow!("Failed to create audio sink: {}", e))?;

    match looping {
        Some(duration) => {
            sink.append(source.repeat_infinite());
            std::thread::sleep(duration);
            sink.stop();
        }
        None => {
            sink.append(source);
            sink.sleep_until_end();
        }
    }
    Ok(())
}
