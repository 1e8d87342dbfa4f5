//! Translation into a spoken target language.

use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::error::{AssistantError, AssistantResult};

/// Language names as people say them, with their ISO 639-1 codes.
const LANGUAGES: &[(&str, &str)] = &[
    ("afrikaans", "af"),
    ("arabic", "ar"),
    ("bengali", "bn"),
    ("bulgarian", "bg"),
    ("chinese", "zh-CN"),
    ("croatian", "hr"),
    ("czech", "cs"),
    ("danish", "da"),
    ("dutch", "nl"),
    ("english", "en"),
    ("finnish", "fi"),
    ("french", "fr"),
    ("german", "de"),
    ("greek", "el"),
    ("gujarati", "gu"),
    ("hebrew", "iw"),
    ("hindi", "hi"),
    ("hungarian", "hu"),
    ("indonesian", "id"),
    ("italian", "it"),
    ("japanese", "ja"),
    ("kannada", "kn"),
    ("korean", "ko"),
    ("malay", "ms"),
    ("malayalam", "ml"),
    ("marathi", "mr"),
    ("nepali", "ne"),
    ("norwegian", "no"),
    ("persian", "fa"),
    ("polish", "pl"),
    ("portuguese", "pt"),
    ("punjabi", "pa"),
    ("romanian", "ro"),
    ("russian", "ru"),
    ("serbian", "sr"),
    ("spanish", "es"),
    ("swahili", "sw"),
    ("swedish", "sv"),
    ("tamil", "ta"),
    ("telugu", "te"),
    ("thai", "th"),
    ("turkish", "tr"),
    ("ukrainian", "uk"),
    ("urdu", "ur"),
    ("vietnamese", "vi"),
];

/// Resolve a language name or code to the code the service expects.
pub fn language_code(language: &str) -> Option<&'static str> {
    let language = language.trim().to_lowercase();
    LANGUAGES
        .iter()
        .find(|(name, code)| *name == language || code.to_lowercase() == language)
        .map(|(_, code)| *code)
}

pub trait Translator: Send + Sync {
    fn translate<'a>(
        &'a self,
        text: &'a str,
        target_lang: &'a str,
    ) -> BoxFuture<'a, anyhow::Result<String>>;
}

/// Google Translate `translate_a/single` client, source language detected.
pub struct GoogleTranslator {
    url: String,
    client: reqwest::Client,
}

impl GoogleTranslator {
    pub fn new(url: &str, client: reqwest::Client) -> Self {
        Self {
            url: url.to_string(),
            client,
        }
    }
}

impl Translator for GoogleTranslator {
    fn translate<'a>(
        &'a self,
        text: &'a str,
        target_lang: &'a str,
    ) -> BoxFuture<'a, anyhow::Result<String>> {
        Box::pin(async move {
            let code = language_code(target_lang)
                .ok_or_else(|| anyhow::anyhow!("Unsupported language: {}", target_lang))?;
            let json: Value = self
                .client
                .get(&self.url)
                .query(&[
                    ("client", "gtx"),
                    ("sl", "auto"),
                    ("tl", code),
                    ("dt", "t"),
                    ("q", text),
                ])
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            parse_translation(&json)
                .ok_or_else(|| anyhow::anyhow!("Unexpected translation response"))
        })
    }
}

/// The response is `[[[translated, original, ...], ...], ...]`, one inner
/// entry per sentence.
fn parse_translation(json: &Value) -> Option<String> {
    let translated: String = json
        .get(0)?
        .as_array()?
        .iter()
        .filter_map(|segment| segment.get(0)?.as_str())
        .collect();
    (!translated.is_empty()).then_some(translated)
}

pub async fn translate(
    translator: &dyn Translator,
    text: &str,
    target_lang: &str,
) -> AssistantResult<String> {
    let translated = translator
        .translate(text, target_lang)
        .await
        .map_err(|e| AssistantError::service("Translation failed.", e))?;
    Ok(format!("{} in {} is {}", text, target_lang, translated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Shouting;

    impl Translator for Shouting {
        fn translate<'a>(
            &'a self,
            text: &'a str,
            target_lang: &'a str,
        ) -> BoxFuture<'a, anyhow::Result<String>> {
            Box::pin(async move {
                language_code(target_lang).ok_or_else(|| anyhow::anyhow!("unsupported"))?;
                Ok(text.to_uppercase())
            })
        }
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(language_code("French"), Some("fr"));
        assert_eq!(language_code("de"), Some("de"));
        assert_eq!(language_code("zh-cn"), Some("zh-CN"));
        assert_eq!(language_code("klingon"), None);
    }

    #[test]
    fn test_parse_translation_joins_sentences() {
        let json = json!([[["Bonjour. ", "Hello. ", null], ["Merci", "Thanks", null]], null, "en"]);
        assert_eq!(parse_translation(&json).as_deref(), Some("Bonjour. Merci"));
        assert_eq!(parse_translation(&json!({"error": 1})), None);
    }

    #[tokio::test]
    async fn test_translate_response_and_failure() {
        assert_eq!(
            translate(&Shouting, "thank you", "spanish").await.unwrap(),
            "thank you in spanish is THANK YOU"
        );
        let err = translate(&Shouting, "hello", "klingon").await.unwrap_err();
        assert_eq!(err.to_string(), "Translation failed.");
    }
}
