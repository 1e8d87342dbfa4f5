//! Scheduled WhatsApp messages.
//!
//! The send is handed to WhatsApp Web a few minutes from now. Once scheduled
//! there is no cancellation and no delivery confirmation.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime, NaiveTime, Timelike};
use tracing::info;

use super::launcher::Launcher;
use crate::config::{AssistantConfig, BackgroundFailures};
use crate::error::{AssistantError, AssistantResult};

pub trait MessageScheduler: Send + Sync {
    /// Arrange for `body` to be sent to `phone` at wall-clock time `at`.
    fn schedule(&self, phone: &str, body: &str, at: NaiveTime) -> anyhow::Result<()>;
}

/// Opens a prefilled WhatsApp Web chat at the scheduled minute.
pub struct WhatsAppWebScheduler {
    url: String,
    launcher: Arc<dyn Launcher>,
    failures: BackgroundFailures,
}

impl WhatsAppWebScheduler {
    pub fn new(url: &str, launcher: Arc<dyn Launcher>, failures: BackgroundFailures) -> Self {
        Self {
            url: url.to_string(),
            launcher,
            failures,
        }
    }

    fn chat_url(&self, phone: &str, body: &str) -> anyhow::Result<url::Url> {
        Ok(url::Url::parse_with_params(
            &self.url,
            &[("phone", phone), ("text", body)],
        )?)
    }
}

impl MessageScheduler for WhatsAppWebScheduler {
    fn schedule(&self, phone: &str, body: &str, at: NaiveTime) -> anyhow::Result<()> {
        let url = self.chat_url(phone, body)?;
        let wait = delay_until(Local::now().naive_local(), at);
        info!(at = %at.format("%H:%M"), wait_secs = wait.as_secs(), "Message scheduled");

        self.open_after(url, wait);
        Ok(())
    }
}

impl WhatsAppWebScheduler {
    fn open_after(&self, url: url::Url, wait: Duration) {
        let launcher = self.launcher.clone();
        let failures = self.failures;
        // Detached: the JoinHandle is dropped.
        drop(tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            failures.report("message", launcher.open_url(url.as_str()));
        }));
    }
}

/// `now` plus `delay_minutes`, on the minute, wrapping past midnight.
pub fn send_time(now: NaiveTime, delay_minutes: u32) -> NaiveTime {
    const DAY: u32 = 24 * 60;
    let total = (now.hour() * 60 + now.minute() + delay_minutes % DAY) % DAY;
    NaiveTime::from_hms_opt(total / 60, total % 60, 0).unwrap_or(now)
}

/// Time from `now` until the next occurrence of `at`.
///
/// A target inside the current minute is due immediately.
pub fn delay_until(now: NaiveDateTime, at: NaiveTime) -> Duration {
    let mut target = now.date().and_time(at);
    if target <= now {
        if now - target < chrono::Duration::minutes(1) {
            return Duration::ZERO;
        }
        target += chrono::Duration::days(1);
    }
    (target - now).to_std().unwrap_or_default()
}

pub fn send_message(
    config: &AssistantConfig,
    scheduler: &dyn MessageScheduler,
    contact: &str,
    body: &str,
) -> AssistantResult<String> {
    let phone = config.contact_number(contact).ok_or_else(|| {
        AssistantError::not_found(format!(
            "I couldn't find the number for {}. Please check your contact list.",
            contact
        ))
    })?;

    let at = send_time(Local::now().time(), config.message_delay_minutes);
    scheduler
        .schedule(phone, body, at)
        .map_err(|e| AssistantError::service("Sorry, I couldn't schedule that message.", e))?;
    Ok(format!("Sending WhatsApp message to {}", contact))
}
