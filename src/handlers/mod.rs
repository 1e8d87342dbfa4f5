//! Action handlers: one per intent, each phrasing its own response and its
//! own failures.
//!
//! External capabilities sit behind traits (`Launcher`, `Encyclopedia`,
//! `WeatherService`, ...) so the handlers can be driven by fakes.

pub mod currency;
pub mod dataset;
pub mod encyclopedia;
pub mod launcher;
pub mod media;
pub mod messaging;
pub mod timer;
pub mod translate;
pub mod weather;

#[cfg(test)]
pub mod fakes;

use chrono::Local;
use tracing::{debug, info};

use crate::context::AssistantContext;
use crate::error::{AssistantError, AssistantResult};
use crate::intent::Intent;
use crate::store::LookupStore;

use launcher::Launcher;

/// Run the handler for `intent` and return the response text.
pub async fn execute(ctx: &AssistantContext, intent: Intent) -> AssistantResult<String> {
    match intent {
        Intent::SmallTalk(reply) => Ok(reply),
        Intent::OpenTarget(target) => open_target(&ctx.store, ctx.launcher.as_ref(), &target),
        Intent::PlayMedia(term) => media::play_media(ctx.videos.as_ref(), &term).await,
        Intent::SearchTopic(term) => {
            encyclopedia::search_topic(ctx.encyclopedia.as_ref(), &term).await
        }
        Intent::ShowDateTime => Ok(timer::describe_now(Local::now())),
        Intent::ShowWeather(city) => {
            weather::show_weather(
                ctx.weather.as_ref(),
                ctx.geolocator.as_ref(),
                ctx.speaker.as_ref(),
                city.as_deref(),
            )
            .await
        }
        Intent::AnalyzeDataset { file, model } => {
            let dir = ctx.config.dataset_dir();
            let lines = tokio::task::spawn_blocking(move || dataset::analyze(&dir, &file, model))
                .await
                .map_err(|e| {
                    AssistantError::service("An error occurred during data analysis.", e)
                })??;
            Ok(lines.join(" "))
        }
        Intent::ConvertCurrency(request) => {
            currency::convert_currency(ctx.rates.as_ref(), &request).await
        }
        Intent::SetTimer(seconds) => Ok(timer::set_timer(
            ctx.speaker.clone(),
            ctx.sounds.clone(),
            seconds,
        )),
        Intent::SendMessage { contact, body } => {
            messaging::send_message(&ctx.config, ctx.messages.as_ref(), &contact, &body)
        }
        Intent::Translate { text, target_lang } => {
            translate::translate(ctx.translator.as_ref(), &text, &target_lang).await
        }
        Intent::Unrecognized => Err(AssistantError::Unrecognized),
    }
}

/// Open an application alias, then a website alias, then whatever the
/// system can find under that name.
pub fn open_target(
    store: &LookupStore,
    launcher: &dyn Launcher,
    target: &str,
) -> AssistantResult<String> {
    let target = target.trim();
    let failed = |e: anyhow::Error| AssistantError::Service {
        message: format!("Something went wrong: {}", e),
        detail: format!("opening '{}'", target),
    };

    if target.is_empty() {
        debug!("Empty open target");
        launcher.launch_by_name(target).map_err(failed)?;
        return Ok("Opening".to_string());
    }

    if let Some(path) = store.lookup_application(target).map_err(failed)? {
        info!(alias = %target, path = %path, "Opening application alias");
        launcher.launch_path(&path).map_err(failed)?;
    } else if let Some(url) = store.lookup_website(target).map_err(failed)? {
        info!(alias = %target, url = %url, "Opening website alias");
        launcher.open_url(&url).map_err(failed)?;
    } else {
        launcher.launch_by_name(target).map_err(failed)?;
    }
    Ok(format!("Opening {}", target))
}
