//! Currency conversion with live rates.

use std::collections::HashMap;

use futures_util::future::BoxFuture;
use serde::Deserialize;

use crate::error::{AssistantError, AssistantResult};
use crate::intent::CurrencyRequest;

/// Latest rates relative to one base currency.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RateTable {
    /// `"success"` or `"error"`.
    pub result: String,
    #[serde(default)]
    pub conversion_rates: HashMap<String, f64>,
}

impl RateTable {
    pub fn is_success(&self) -> bool {
        self.result == "success"
    }
}

pub trait RateService: Send + Sync {
    fn latest<'a>(&'a self, base: &'a str) -> BoxFuture<'a, anyhow::Result<RateTable>>;
}

/// exchangerate-api.com v6 client.
pub struct ExchangeRateClient {
    url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl ExchangeRateClient {
    pub fn new(url: &str, api_key: Option<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            api_key,
            client,
        }
    }
}

impl RateService for ExchangeRateClient {
    fn latest<'a>(&'a self, base: &'a str) -> BoxFuture<'a, anyhow::Result<RateTable>> {
        Box::pin(async move {
            let key = self
                .api_key
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("No currency API key configured"))?;
            // Error responses still carry a JSON body with `result: "error"`.
            let table = self
                .client
                .get(format!("{}/{}/latest/{}", self.url, key, base))
                .send()
                .await?
                .json::<RateTable>()
                .await?;
            Ok(table)
        })
    }
}

pub async fn convert_currency(
    rates: &dyn RateService,
    request: &CurrencyRequest,
) -> AssistantResult<String> {
    let from = request.from.to_uppercase();
    let to = request.to.to_uppercase();

    let table = rates
        .latest(&from)
        .await
        .map_err(|e| AssistantError::service("Error in currency conversion.", e))?;
    if !table.is_success() {
        return Err(AssistantError::Service {
            message: "Failed to retrieve currency data.".into(),
            detail: format!("rate lookup for {} returned '{}'", from, table.result),
        });
    }

    let rate = table
        .conversion_rates
        .get(&to)
        .ok_or_else(|| AssistantError::not_found(format!("Currency {} not supported.", to)))?;
    let converted = request.amount * rate;
    // The amount keeps its decimal point: "10.0 USD".
    Ok(format!(
        "{:?} {} is approximately {:.2} {}.",
        request.amount, from, converted, to
    ))
}
