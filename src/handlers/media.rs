//! Playing the top YouTube result for a search term.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};

use super::launcher::Launcher;
use crate::error::{AssistantError, AssistantResult};

static VIDEO_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""videoId":"([A-Za-z0-9_-]{11})""#).expect("valid regex"));

pub trait VideoPlayer: Send + Sync {
    fn play<'a>(&'a self, term: &'a str) -> BoxFuture<'a, anyhow::Result<()>>;
}

/// Scrapes the results page for the first video and opens it.
pub struct YouTubePlayer {
    base_url: String,
    client: reqwest::Client,
    launcher: Arc<dyn Launcher>,
}

impl YouTubePlayer {
    pub fn new(base_url: &str, client: reqwest::Client, launcher: Arc<dyn Launcher>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            launcher,
        }
    }

    fn results_url(&self, term: &str) -> anyhow::Result<url::Url> {
        Ok(url::Url::parse_with_params(
            &format!("{}/results", self.base_url),
            &[("search_query", term)],
        )?)
    }

    async fn first_video(&self, results: &url::Url) -> anyhow::Result<Option<String>> {
        let page = self
            .client
            .get(results.as_str())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(first_video_id(&page))
    }
}

impl VideoPlayer for YouTubePlayer {
    fn play<'a>(&'a self, term: &'a str) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async move {
            let results = self.results_url(term)?;
            let target = match self.first_video(&results).await {
                Ok(Some(id)) => format!("{}/watch?v={}", self.base_url, id),
                Ok(None) => results.to_string(),
                Err(e) => {
                    warn!("YouTube search failed, opening results page: {:#}", e);
                    results.to_string()
                }
            };
            info!(url = %target, "Playing video");
            self.launcher.open_url(&target)
        })
    }
}

fn first_video_id(page: &str) -> Option<String> {
    VIDEO_ID_RE
        .captures(page)
        .map(|caps| caps[1].to_string())
}

pub async fn play_media(player: &dyn VideoPlayer, term: &str) -> AssistantResult<String> {
    player
        .play(term)
        .await
        .map_err(|e| AssistantError::service("Sorry, I couldn't play that on YouTube.", e))?;
    Ok(format!("Playing {} on YouTube", term))
}
