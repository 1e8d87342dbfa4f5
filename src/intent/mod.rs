//! Intent classification.
//!
//! A command is lowercased and trimmed, then checked against a fixed list of
//! triggers in priority order. The first trigger that fires decides the
//! intent; there is no backtracking. Several triggers share words ("time"
//! and "timer", "about" and "tell me about"), so the order is part of the
//! contract.

pub mod extract;
pub mod small_talk;

use crate::error::{AssistantError, AssistantResult};

pub use extract::CurrencyRequest;

/// Canned model used for dataset analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Knn,
    NaiveBayes,
    LinearRegression,
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Knn => write!(f, "knn"),
            Self::NaiveBayes => write!(f, "naive bayes"),
            Self::LinearRegression => write!(f, "linear regression"),
        }
    }
}

/// The classified purpose of a command, with its extracted parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    SmallTalk(String),
    OpenTarget(String),
    PlayMedia(String),
    SearchTopic(String),
    ShowDateTime,
    ShowWeather(Option<String>),
    AnalyzeDataset { file: String, model: ModelKind },
    ConvertCurrency(CurrencyRequest),
    SetTimer(u64),
    SendMessage { contact: String, body: String },
    Translate { text: String, target_lang: String },
    Unrecognized,
}

impl Intent {
    /// Short label for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SmallTalk(_) => "small_talk",
            Self::OpenTarget(_) => "open",
            Self::PlayMedia(_) => "play_media",
            Self::SearchTopic(_) => "search",
            Self::ShowDateTime => "datetime",
            Self::ShowWeather(_) => "weather",
            Self::AnalyzeDataset { .. } => "analyze_dataset",
            Self::ConvertCurrency(_) => "convert_currency",
            Self::SetTimer(_) => "set_timer",
            Self::SendMessage { .. } => "send_message",
            Self::Translate { .. } => "translate",
            Self::Unrecognized => "unrecognized",
        }
    }
}

/// Lowercase and trim a raw command.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Turns normalized commands into intents.
#[derive(Debug, Clone)]
pub struct IntentParser {
    wake_word: String,
    creator_credit: String,
}

impl IntentParser {
    pub fn new(wake_word: impl Into<String>, creator_credit: impl Into<String>) -> Self {
        Self {
            wake_word: wake_word.into(),
            creator_credit: creator_credit.into(),
        }
    }

    /// Classify a normalized command.
    ///
    /// Returns `Err(Malformed)` when a trigger fires but its payload pattern
    /// does not match; the hint tells the user how to phrase it.
    pub fn classify(&self, query: &str) -> AssistantResult<Intent> {
        if let Some(reply) = small_talk::reply(query, &self.creator_credit) {
            return Ok(Intent::SmallTalk(reply));
        }

        if query.contains("open") {
            return Ok(Intent::OpenTarget(extract::open_target(
                query,
                &self.wake_word,
            )));
        }

        if query.contains("play") && query.contains("youtube") {
            return extract::media_term(query)
                .map(Intent::PlayMedia)
                .ok_or_else(|| {
                    AssistantError::malformed("Sorry, I couldn't find what to play on YouTube.")
                });
        }

        if extract::SEARCH_PHRASES.iter().any(|p| query.contains(p)) {
            return Ok(Intent::SearchTopic(extract::search_term(query)));
        }

        if (query.contains("time") || query.contains("date") || query.contains("day"))
            && !query.contains("timer")
        {
            return Ok(Intent::ShowDateTime);
        }

        if query.contains("weather") || query.contains("temperature") {
            return Ok(Intent::ShowWeather(extract::city(query)));
        }

        if query.contains("analyze") && query.contains(".csv") {
            let file = extract::csv_file(query)
                .ok_or_else(|| AssistantError::malformed("Please specify the CSV file name."))?;
            return Ok(Intent::AnalyzeDataset {
                file,
                model: extract::model_kind(query),
            });
        }

        if query.contains("convert") {
            return extract::currency(query)
                .map(Intent::ConvertCurrency)
                .ok_or_else(|| {
                    AssistantError::malformed("Please say like 'convert 10 USD to EUR'.")
                });
        }

        if query.contains("set timer") {
            return extract::timer_seconds(query)
                .map(Intent::SetTimer)
                .ok_or_else(|| {
                    AssistantError::malformed("Please say like 'set timer for 2 minutes'")
                });
        }

        if query.contains("message") {
            return extract::message(query)
                .map(|(contact, body)| Intent::SendMessage { contact, body })
                .ok_or_else(|| {
                    AssistantError::malformed("Please specify the contact and message.")
                });
        }

        if query.contains("translate") {
            return extract::translation(query)
                .map(|(text, target_lang)| Intent::Translate { text, target_lang })
                .ok_or_else(|| {
                    AssistantError::malformed("Please say like 'translate hello in french'.")
                });
        }

        Ok(Intent::Unrecognized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn parser() -> IntentParser {
        IntentParser::new("jarvis", "Made by tests.")
    }

    fn classify(raw: &str) -> AssistantResult<Intent> {
        parser().classify(&normalize(raw))
    }

    #[test]
    fn test_small_talk_beats_everything() {
        assert_eq!(
            classify("hi").unwrap(),
            Intent::SmallTalk(small_talk::GREETING_REPLY.into())
        );
        // "what is" would otherwise route to search
        assert_eq!(
            classify("whats up, what is new").unwrap(),
            Intent::SmallTalk(small_talk::WELLBEING_REPLY.into())
        );
    }

    #[test]
    fn test_open_wins_over_later_triggers() {
        assert_eq!(
            classify("Jarvis open YouTube").unwrap(),
            Intent::OpenTarget("youtube".into())
        );
        assert_eq!(
            classify("open the weather app").unwrap(),
            Intent::OpenTarget("the weather app".into())
        );
        assert_eq!(classify("open").unwrap(), Intent::OpenTarget(String::new()));
        assert_eq!(
            classify("open youtube and play songs").unwrap(),
            Intent::OpenTarget("youtube and play songs".into())
        );
    }

    #[test]
    fn test_play_requires_youtube() {
        assert_eq!(
            classify("play imagine dragons on youtube").unwrap(),
            Intent::PlayMedia("imagine dragons".into())
        );
        assert_eq!(classify("play some music").unwrap(), Intent::Unrecognized);
    }

    #[test]
    fn test_search_family() {
        assert_eq!(
            classify("who is ada lovelace").unwrap(),
            Intent::SearchTopic("ada lovelace".into())
        );
        assert_eq!(classify("search").unwrap(), Intent::SearchTopic(String::new()));
        // search keywords are checked before date/time
        assert_eq!(
            classify("what is the time").unwrap(),
            Intent::SearchTopic("the time".into())
        );
    }

    #[test]
    fn test_timer_excludes_datetime() {
        assert_eq!(classify("what day is it").unwrap(), Intent::ShowDateTime);
        assert_eq!(classify("current date").unwrap(), Intent::ShowDateTime);
        assert_eq!(classify("set timer for 2 minutes").unwrap(), Intent::SetTimer(120));

        let status = classify("show the timer status").unwrap();
        assert_ne!(status, Intent::ShowDateTime);
        assert_eq!(status, Intent::Unrecognized);

        // "what is" routes to search before the timer exclusion is consulted
        assert_ne!(
            classify("what is the timer status").unwrap(),
            Intent::ShowDateTime
        );
    }

    #[test]
    fn test_weather_with_and_without_city() {
        assert_eq!(
            classify("weather in London").unwrap(),
            Intent::ShowWeather(Some("london".into()))
        );
        assert_eq!(classify("temperature").unwrap(), Intent::ShowWeather(None));
        // "today" contains "day"
        assert_eq!(classify("weather today").unwrap(), Intent::ShowDateTime);
    }

    #[test]
    fn test_dataset_model_priority() {
        assert_eq!(
            classify("analyze sales.csv using naive bayes").unwrap(),
            Intent::AnalyzeDataset {
                file: "sales.csv".into(),
                model: ModelKind::NaiveBayes
            }
        );
        assert_eq!(
            classify("analyze knn.csv using naive bayes and knn").unwrap(),
            Intent::AnalyzeDataset {
                file: "knn.csv".into(),
                model: ModelKind::NaiveBayes
            }
        );
        assert_eq!(
            classify("analyze Data.CSV").unwrap(),
            Intent::AnalyzeDataset {
                file: "data.csv".into(),
                model: ModelKind::Knn
            }
        );
        let err = classify("analyze .csv").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
    }

    #[test]
    fn test_currency_usage_hint() {
        assert_eq!(
            classify("convert 10 USD to EUR").unwrap(),
            Intent::ConvertCurrency(CurrencyRequest {
                amount: 10.0,
                from: "usd".into(),
                to: "eur".into(),
            })
        );
        let err = classify("convert some money").unwrap_err();
        assert_eq!(err.to_string(), "Please say like 'convert 10 USD to EUR'.");
    }

    #[test]
    fn test_set_timer_malformed() {
        let err = classify("set timer for later").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
    }

    #[test]
    fn test_message_and_translate() {
        assert_eq!(
            classify("message Alice running late").unwrap(),
            Intent::SendMessage {
                contact: "alice".into(),
                body: "running late".into()
            }
        );
        assert_eq!(
            classify("translate thank you in spanish").unwrap(),
            Intent::Translate {
                text: "thank you".into(),
                target_lang: "spanish".into()
            }
        );
        assert_eq!(
            classify("translate").unwrap_err().kind(),
            ErrorKind::Malformed
        );
    }

    #[test]
    fn test_play_before_search() {
        assert_eq!(
            classify("play who is that on youtube").unwrap(),
            Intent::PlayMedia("who is that".into())
        );
    }

    #[test]
    fn test_weather_before_dataset() {
        assert_eq!(
            classify("analyze temperature.csv").unwrap(),
            Intent::ShowWeather(None)
        );
    }

    #[test]
    fn test_dataset_before_currency() {
        assert_eq!(
            classify("analyze convert.csv").unwrap(),
            Intent::AnalyzeDataset {
                file: "convert.csv".into(),
                model: ModelKind::Knn
            }
        );
    }

    #[test]
    fn test_currency_before_timer() {
        assert_eq!(
            classify("convert 10 usd to eur then set timer").unwrap(),
            Intent::ConvertCurrency(CurrencyRequest {
                amount: 10.0,
                from: "usd".into(),
                to: "eur".into(),
            })
        );
    }

    #[test]
    fn test_timer_before_message() {
        assert_eq!(
            classify("set timer for 5 minutes message").unwrap(),
            Intent::SetTimer(300)
        );
    }

    #[test]
    fn test_message_before_translate() {
        assert_eq!(
            classify("translate message hi in french").unwrap(),
            Intent::SendMessage {
                contact: "hi".into(),
                body: "in french".into()
            }
        );
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(classify("make me a sandwich").unwrap(), Intent::Unrecognized);
    }
}
