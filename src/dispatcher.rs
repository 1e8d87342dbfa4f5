//! Command dispatch: acquire the command, classify it, run the handler and
//! report the response.
//!
//! Every call ends with exactly one idle-state callback, whatever happened
//! on the way. Handler errors become spoken responses and a panicking
//! handler is caught, so no single command can take the process down.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use tracing::{error, info, info_span, warn, Instrument};

use crate::context::AssistantContext;
use crate::error::ErrorKind;
use crate::handlers;
use crate::intent::{self, IntentParser};
use crate::ipc::UiEvent;
use crate::sounds::Sound;

pub struct Dispatcher {
    ctx: AssistantContext,
    parser: IntentParser,
}

impl Dispatcher {
    pub fn new(ctx: AssistantContext) -> Self {
        let parser = IntentParser::new(&ctx.config.assistant_name, &ctx.config.creator_credit);
        Self { ctx, parser }
    }

    pub fn context(&self) -> &AssistantContext {
        &self.ctx
    }

    /// Handle one command. `None` (or an empty string) means listen for it.
    pub async fn all_commands(&self, command: Option<String>) {
        let span = info_span!("dispatch", id = %uuid::Uuid::new_v4());
        self.dispatch(command).instrument(span).await;
        self.ctx.ui.show_idle_state();
    }

    pub fn play_click_sound(&self) {
        self.ctx.sounds.play(Sound::Click);
    }

    async fn dispatch(&self, command: Option<String>) {
        let Some(raw) = self.acquire(command).await else {
            return;
        };

        let query = intent::normalize(&raw);
        if query.is_empty() {
            self.say("I didn't catch that.").await;
            return;
        }
        info!(query = %query, "Command received");

        let outcome = AssertUnwindSafe(self.run(&query)).catch_unwind().await;
        let response = match outcome {
            Ok(text) => text,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!("Handler panicked: {}", message);
                format!("An error occurred: {}", message)
            }
        };
        self.respond(&response).await;
    }

    /// Typed text is echoed back; otherwise one utterance is captured.
    /// `None` means the dispatch is already answered.
    async fn acquire(&self, command: Option<String>) -> Option<String> {
        if let Some(text) = command.filter(|c| !c.is_empty()) {
            self.say(&format!("You typed: {}", text)).await;
            return Some(text);
        }

        let Some(input) = &self.ctx.speech_input else {
            self.say("Microphone input is not configured.").await;
            return None;
        };

        self.say("Listening...").await;
        self.ctx.ui.emit(UiEvent::Listening {});
        match input.take_command().await {
            Some(heard) => {
                self.say(&format!("You said: {}", heard)).await;
                Some(heard)
            }
            None => Some(String::new()),
        }
    }

    async fn run(&self, query: &str) -> String {
        let result = match self.parser.classify(query) {
            Ok(intent) => {
                info!(intent = intent.name(), "Intent matched");
                handlers::execute(&self.ctx, intent).await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(text) => text,
            Err(e) => {
                match e.kind() {
                    ErrorKind::Service => warn!("Handler failed: {:?}", e),
                    kind => info!(?kind, "Handler declined: {}", e),
                }
                e.to_string()
            }
        }
    }

    async fn say(&self, text: &str) {
        self.ctx.speaker.speak(text).await;
    }

    async fn respond(&self, text: &str) {
        self.ctx.speaker.speak(text).await;
        self.ctx.ui.display_message(text);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown error".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::currency::{RateService, RateTable};
    use crate::handlers::encyclopedia::{Article, Encyclopedia};
    use crate::handlers::fakes::{self, Launch};
    use crate::intent::small_talk;
    use crate::speech::SpeechInput;
    use futures_util::future::BoxFuture;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    fn idle_count(events: &[UiEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, UiEvent::ShowIdleState {}))
            .count()
    }

    fn displayed(events: &[UiEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                UiEvent::DisplayMessage { text } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    struct Silence;

    impl SpeechInput for Silence {
        fn take_command(&self) -> BoxFuture<'_, Option<String>> {
            Box::pin(async { None })
        }
    }

    struct Heard(&'static str);

    impl SpeechInput for Heard {
        fn take_command(&self) -> BoxFuture<'_, Option<String>> {
            Box::pin(async move { Some(self.0.to_string()) })
        }
    }

    #[tokio::test]
    async fn test_nothing_heard_still_goes_idle_once() {
        let (mut ctx, seen) = fakes::context();
        ctx.speech_input = Some(Arc::new(Silence));
        let dispatcher = Dispatcher::new(ctx);

        dispatcher.all_commands(None).await;

        let events = seen.ui.events();
        assert_eq!(idle_count(&events), 1);
        assert!(events.contains(&UiEvent::Listening {}));
        assert_eq!(
            seen.speaker.spoken(),
            vec!["Listening...", "I didn't catch that."]
        );
    }

    #[tokio::test]
    async fn test_no_microphone() {
        let (ctx, seen) = fakes::context();
        let dispatcher = Dispatcher::new(ctx);

        dispatcher.all_commands(Some(String::new())).await;

        assert_eq!(
            seen.speaker.spoken(),
            vec!["Microphone input is not configured."]
        );
        assert_eq!(idle_count(&seen.ui.events()), 1);
    }

    #[tokio::test]
    async fn test_voice_command_is_echoed_and_handled() {
        let (mut ctx, seen) = fakes::context();
        ctx.speech_input = Some(Arc::new(Heard("Hello")));
        let dispatcher = Dispatcher::new(ctx);

        dispatcher.all_commands(None).await;

        assert_eq!(
            seen.speaker.spoken(),
            vec!["Listening...", "You said: Hello", small_talk::GREETING_REPLY]
        );
    }

    #[tokio::test]
    async fn test_typed_greeting() {
        let (ctx, seen) = fakes::context();
        let dispatcher = Dispatcher::new(ctx);

        dispatcher.all_commands(Some("Hi".into())).await;

        assert_eq!(
            seen.speaker.spoken(),
            vec!["You typed: Hi", small_talk::GREETING_REPLY]
        );
        let events = seen.ui.events();
        assert_eq!(displayed(&events), vec![small_talk::GREETING_REPLY]);
        assert_eq!(idle_count(&events), 1);
        assert_eq!(events.last(), Some(&UiEvent::ShowIdleState {}));
    }

    #[tokio::test]
    async fn test_blank_typed_command() {
        let (ctx, seen) = fakes::context();
        Dispatcher::new(ctx).all_commands(Some("   ".into())).await;

        assert_eq!(
            seen.speaker.spoken().last().map(String::as_str),
            Some("I didn't catch that.")
        );
        assert!(displayed(&seen.ui.events()).is_empty());
        assert_eq!(idle_count(&seen.ui.events()), 1);
    }

    #[tokio::test]
    async fn test_unrecognized_command() {
        let (ctx, seen) = fakes::context();
        Dispatcher::new(ctx)
            .all_commands(Some("make me a sandwich".into()))
            .await;

        let events = seen.ui.events();
        assert_eq!(displayed(&events), vec!["Sorry, I couldn't understand."]);
        assert_eq!(idle_count(&events), 1);
    }

    struct UsdOnly;

    impl RateService for UsdOnly {
        fn latest<'a>(&'a self, _base: &'a str) -> BoxFuture<'a, anyhow::Result<RateTable>> {
            Box::pin(async {
                Ok(RateTable {
                    result: "success".into(),
                    conversion_rates: HashMap::from([("EUR".into(), 0.5)]),
                })
            })
        }
    }

    #[tokio::test]
    async fn test_unsupported_currency_is_answered() {
        let (mut ctx, seen) = fakes::context();
        ctx.rates = Arc::new(UsdOnly);
        let dispatcher = Dispatcher::new(ctx);

        dispatcher.all_commands(Some("convert 10 usd to abc".into())).await;
        dispatcher.all_commands(Some("convert 10 usd to eur".into())).await;

        let events = seen.ui.events();
        assert_eq!(
            displayed(&events),
            vec![
                "Currency ABC not supported.",
                "10.0 USD is approximately 5.00 EUR."
            ]
        );
        assert_eq!(idle_count(&events), 2);
    }

    #[tokio::test]
    async fn test_timer_command_uses_seconds() {
        let (ctx, seen) = fakes::context();
        Dispatcher::new(ctx)
            .all_commands(Some("set timer for 2 minutes".into()))
            .await;

        assert_eq!(
            displayed(&seen.ui.events()),
            vec!["Timer started for 120 seconds"]
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(
            seen.sounds.played(),
            vec![(Sound::Timer, Some(Duration::from_secs(120)))]
        );
    }

    #[tokio::test]
    async fn test_open_goes_through_store() {
        let (ctx, seen) = fakes::context();
        ctx.store
            .add(crate::store::AliasKind::Website, "github", "https://github.com")
            .unwrap();
        Dispatcher::new(ctx)
            .all_commands(Some("Man open GitHub".into()))
            .await;

        assert_eq!(
            seen.launcher.taken(),
            vec![Launch::Url("https://github.com".into())]
        );
        assert_eq!(displayed(&seen.ui.events()), vec!["Opening github"]);
    }

    #[tokio::test]
    async fn test_service_failure_is_spoken() {
        let (ctx, seen) = fakes::context();
        Dispatcher::new(ctx)
            .all_commands(Some("translate hello in french".into()))
            .await;

        assert_eq!(displayed(&seen.ui.events()), vec!["Translation failed."]);
    }

    struct Exploding;

    impl Encyclopedia for Exploding {
        fn lookup<'a>(&'a self, _topic: &'a str) -> BoxFuture<'a, anyhow::Result<Article>> {
            Box::pin(async { panic!("index out of range") })
        }
    }

    #[tokio::test]
    async fn test_panicking_handler_is_contained() {
        let (mut ctx, seen) = fakes::context();
        ctx.encyclopedia = Arc::new(Exploding);
        let dispatcher = Dispatcher::new(ctx);

        dispatcher.all_commands(Some("who is ada".into())).await;
        dispatcher.all_commands(Some("hello".into())).await;

        let events = seen.ui.events();
        assert_eq!(
            displayed(&events),
            vec![
                "An error occurred: index out of range".to_string(),
                small_talk::GREETING_REPLY.to_string()
            ]
        );
        assert_eq!(idle_count(&events), 2);
    }

    #[tokio::test]
    async fn test_click_sound() {
        let (ctx, seen) = fakes::context();
        Dispatcher::new(ctx).play_click_sound();
        assert_eq!(seen.sounds.played(), vec![(Sound::Click, None)]);
    }
}
