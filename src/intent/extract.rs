//! Payload extractors.
//!
//! Every function takes the normalized (lowercased, trimmed) command and
//! either returns a payload or `None`. None of them has side effects.

use once_cell::sync::Lazy;
use regex::Regex;

use super::ModelKind;

/// Phrases removed from a search query, in this order.
pub const SEARCH_PHRASES: &[&str] = &["search", "about", "who is", "what is", "tell me about"];

static MEDIA_TERM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)play\s+(.*?)(?:\s+on\s+youtube)?$").expect("valid regex"));
static CITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"in\s+([a-zA-Z\s]+)").expect("valid regex"));
static CSV_FILE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+\.csv)").expect("valid regex"));
static CURRENCY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"convert\s+(\d+\.?\d*)\s+(\w+)\s+to\s+(\w+)").expect("valid regex")
});
static TIMER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"set timer for (\d+)\s*(seconds|minutes)").expect("valid regex"));
static MESSAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"message\s+(\w+)\s+(.+)").expect("valid regex"));
static TRANSLATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"translate (.+) in (\w+)").expect("valid regex"));

/// Currency conversion payload. Codes are kept as typed; handlers uppercase.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyRequest {
    pub amount: f64,
    pub from: String,
    pub to: String,
}

/// Strip the wake word and every "open" from the query.
///
/// May return an empty string.
pub fn open_target(query: &str, wake_word: &str) -> String {
    let mut text = query.to_lowercase();
    let wake_word = wake_word.trim().to_lowercase();
    if !wake_word.is_empty() {
        text = text.replace(&wake_word, "");
    }
    text.replace("open", "").trim().to_string()
}

/// Remove the search trigger phrases. May return an empty string.
pub fn search_term(query: &str) -> String {
    let mut text = query.to_lowercase();
    for phrase in SEARCH_PHRASES {
        text = text.replace(phrase, "");
    }
    text.trim().to_string()
}

/// What to play, without a trailing "on youtube".
pub fn media_term(query: &str) -> Option<String> {
    MEDIA_TERM
        .captures(query)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|term| !term.is_empty())
}

/// City named after "in", if any.
pub fn city(query: &str) -> Option<String> {
    CITY.captures(query)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|city| !city.is_empty())
}

/// First `<word>.csv` token.
pub fn csv_file(query: &str) -> Option<String> {
    CSV_FILE
        .captures(query)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Model named in the query: naive bayes, then linear regression, then knn.
/// Defaults to knn.
pub fn model_kind(query: &str) -> ModelKind {
    if query.contains("naive bayes") {
        ModelKind::NaiveBayes
    } else if query.contains("linear regression") {
        ModelKind::LinearRegression
    } else {
        ModelKind::Knn
    }
}

pub fn currency(query: &str) -> Option<CurrencyRequest> {
    let caps = CURRENCY.captures(query)?;
    let amount = caps.get(1)?.as_str().parse::<f64>().ok()?;
    Some(CurrencyRequest {
        amount,
        from: caps.get(2)?.as_str().to_string(),
        to: caps.get(3)?.as_str().to_string(),
    })
}

/// Timer duration in seconds; minutes are converted.
pub fn timer_seconds(query: &str) -> Option<u64> {
    let caps = TIMER.captures(query)?;
    let amount = caps.get(1)?.as_str().parse::<u64>().ok()?;
    match caps.get(2)?.as_str() {
        "minutes" => amount.checked_mul(60),
        _ => Some(amount),
    }
}

/// `(contact, body)` from "message <contact> <body>".
pub fn message(query: &str) -> Option<(String, String)> {
    let caps = MESSAGE.captures(query)?;
    Some((
        caps.get(1)?.as_str().to_string(),
        caps.get(2)?.as_str().to_string(),
    ))
}

/// `(text, language)` from "translate <text> in <language>".
pub fn translation(query: &str) -> Option<(String, String)> {
    let caps = TRANSLATE.captures(query)?;
    Some((
        caps.get(1)?.as_str().to_string(),
        caps.get(2)?.as_str().to_string(),
    ))
}
