//! Countdown timers and the current date and time.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use tracing::info;

use crate::sounds::{Sound, SoundPlayer};
use crate::speech::Speaker;

/// Start a countdown in the background and confirm immediately.
///
/// The timer tone loops for the whole countdown, then the alarm sounds and
/// "Time's up!" is spoken. A running timer cannot be cancelled.
pub fn set_timer(speaker: Arc<dyn Speaker>, sounds: Arc<dyn SoundPlayer>, seconds: u64) -> String {
    let duration = Duration::from_secs(seconds);
    info!(seconds, "Timer started");

    drop(tokio::spawn(async move {
        sounds.play_for(Sound::Timer, duration);
        tokio::time::sleep(duration).await;
        sounds.play(Sound::Alarm);
        speaker.speak("Time's up!").await;
    }));

    format!("Timer started for {} seconds", seconds)
}

/// e.g. "Today is Friday, 01 March 2024 and the time is 09:05 AM"
pub fn describe_now(now: DateTime<Local>) -> String {
    format!(
        "Today is {} and the time is {}",
        now.format("%A, %d %B %Y"),
        now.format("%I:%M %p")
    )
}
