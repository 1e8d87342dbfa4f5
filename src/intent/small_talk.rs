//! Canned conversational replies, checked before any functional intent.

const GREETINGS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "good morning",
    "good afternoon",
    "good evening",
];

const HOW_ARE_YOU: &[&str] = &["how are you", "how are you doing", "whats up", "how is it going"];

const FAREWELLS: &[&str] = &["bye", "goodbye", "see you"];

pub const GREETING_REPLY: &str = "Hello! How can I help you today?";
pub const WELLBEING_REPLY: &str = "I'm doing great, thanks for asking! How about you?";
pub const FAREWELL_REPLY: &str = "Goodbye! Have a great day!";

/// Reply to small talk, or `None` when the query is not small talk.
///
/// Greetings and farewells must match the whole query; the "how are you"
/// family and creator questions match anywhere in it.
pub fn reply(query: &str, creator_credit: &str) -> Option<String> {
    let query = query.trim().to_lowercase();

    if GREETINGS.contains(&query.as_str()) {
        return Some(GREETING_REPLY.to_string());
    }
    if HOW_ARE_YOU.iter().any(|phrase| query.contains(phrase)) {
        return Some(WELLBEING_REPLY.to_string());
    }
    if query.contains("who created you") || query.contains("who made you") {
        return Some(creator_credit.to_string());
    }
    if FAREWELLS.contains(&query.as_str()) {
        return Some(FAREWELL_REPLY.to_string());
    }
    None
}
