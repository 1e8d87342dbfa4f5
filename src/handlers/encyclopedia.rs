//! Topic summaries from Wikipedia.

use futures_util::future::BoxFuture;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AssistantError, AssistantResult};

/// How many sentences of the summary are read out.
const SUMMARY_SENTENCES: usize = 4;
/// Summaries shorter than this are replaced by the article's first paragraph.
const MIN_SUMMARY_CHARS: usize = 50;

/// Result of an encyclopedia lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Article {
    Summary(String),
    /// The topic names several pages; candidates in relevance order.
    Disambiguation(Vec<String>),
    Missing,
}

pub trait Encyclopedia: Send + Sync {
    fn lookup<'a>(&'a self, topic: &'a str) -> BoxFuture<'a, anyhow::Result<Article>>;
}

/// MediaWiki search + REST summary client.
pub struct WikipediaClient {
    base_url: String,
    client: reqwest::Client,
}

impl WikipediaClient {
    pub fn new(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    async fn search(&self, topic: &str) -> anyhow::Result<Vec<String>> {
        let json: Value = self
            .client
            .get(format!("{}/w/api.php", self.base_url))
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", topic),
                ("srlimit", "5"),
                ("format", "json"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(parse_search_titles(&json))
    }

    async fn summary(&self, title: &str) -> anyhow::Result<Option<Value>> {
        let mut url = url::Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Encyclopedia URL cannot be a base"))?
            .pop_if_empty()
            .extend(["api", "rest_v1", "page", "summary", title]);

        let resp = self.client.get(url).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(resp.error_for_status()?.json().await?))
    }

    async fn first_paragraph(&self, title: &str) -> anyhow::Result<Option<String>> {
        let json: Value = self
            .client
            .get(format!("{}/w/api.php", self.base_url))
            .query(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("format", "json"),
                ("titles", title),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(parse_page_extract(&json).and_then(|text| first_paragraph(&text)))
    }
}

impl Encyclopedia for WikipediaClient {
    fn lookup<'a>(&'a self, topic: &'a str) -> BoxFuture<'a, anyhow::Result<Article>> {
        Box::pin(async move {
            let titles = self.search(topic).await?;
            let Some(title) = titles.first() else {
                return Ok(Article::Missing);
            };
            debug!(topic = %topic, title = %title, "Resolved encyclopedia title");

            let Some(page) = self.summary(title).await? else {
                return Ok(Article::Missing);
            };

            if page["type"].as_str() == Some("disambiguation") {
                let mut options: Vec<String> = titles[1..].to_vec();
                if options.is_empty() {
                    options.push(title.clone());
                }
                return Ok(Article::Disambiguation(options));
            }

            let extract = page["extract"].as_str().unwrap_or_default();
            let mut summary = first_sentences(extract, SUMMARY_SENTENCES);
            if summary.chars().count() < MIN_SUMMARY_CHARS {
                match self.first_paragraph(title).await {
                    Ok(Some(paragraph)) => summary = paragraph,
                    Ok(None) => {}
                    Err(e) => warn!("Full extract fetch failed: {:#}", e),
                }
            }

            if summary.is_empty() {
                Ok(Article::Missing)
            } else {
                Ok(Article::Summary(summary))
            }
        })
    }
}

fn parse_search_titles(json: &Value) -> Vec<String> {
    json["query"]["search"]
        .as_array()
        .map(|hits| {
            hits.iter()
                .filter_map(|hit| hit["title"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn parse_page_extract(json: &Value) -> Option<String> {
    json["query"]["pages"]
        .as_object()?
        .values()
        .find_map(|page| page["extract"].as_str().map(str::to_string))
}

fn first_paragraph(text: &str) -> Option<String> {
    text.split("\n\n")
        .map(str::trim)
        .find(|p| !p.is_empty())
        .map(str::to_string)
}

/// Keep the first `n` sentences. A sentence ends at `.`, `!` or `?`
/// followed by whitespace or the end of the text.
fn first_sentences(text: &str, n: usize) -> String {
    let text = text.trim();
    let mut seen = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let at_boundary = chars.peek().map_or(true, |(_, next)| next.is_whitespace());
            if at_boundary {
                seen += 1;
                if seen == n {
                    return text[..i + c.len_utf8()].to_string();
                }
            }
        }
    }
    text.to_string()
}

/// Look up `term` and phrase the answer.
pub async fn search_topic(encyclopedia: &dyn Encyclopedia, term: &str) -> AssistantResult<String> {
    if term.trim().is_empty() {
        return Err(AssistantError::malformed(
            "Please tell me what you want to search for.",
        ));
    }

    match encyclopedia.lookup(term).await {
        Ok(Article::Summary(summary)) => Ok(format!("According to Wikipedia, {}", summary)),
        Ok(Article::Disambiguation(options)) => Err(AssistantError::Ambiguous {
            suggestion: options.into_iter().next().unwrap_or_default(),
        }),
        Ok(Article::Missing) => Err(AssistantError::not_found(
            "Sorry, I couldn't find any information on that topic.",
        )),
        Err(e) => Err(AssistantError::service(
            "An error occurred while searching Wikipedia.",
            e,
        )),
    }
}
