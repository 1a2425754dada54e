//! Alpha Vantage `GLOBAL_QUOTE` endpoint.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Url};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::QuoteUnavailable;
use crate::quote::QuoteSource;
use crate::ticker::Ticker;

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";
const PRICE_FIELD: &str = "05. price";

#[derive(Clone)]
pub struct AlphaVantage {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl std::fmt::Debug for AlphaVantage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlphaVantage")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize, Debug)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<HashMap<String, Value>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

impl AlphaVantage {
    pub fn new(api_key: impl Into<String>, base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid quote url {}", base_url))?;
        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
        })
    }

    fn quote_url(&self, ticker: &Ticker) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("function", "GLOBAL_QUOTE")
            .append_pair("symbol", ticker.as_str())
            .append_pair("apikey", &self.api_key);
        url
    }
}

impl QuoteSource for AlphaVantage {
    async fn get_price(&self, ticker: &Ticker) -> Result<Decimal, QuoteUnavailable> {
        // reqwest errors embed the url, which carries the api key
        let transport = |err: reqwest::Error| QuoteUnavailable::Transport {
            ticker: ticker.clone(),
            reason: err.without_url().to_string(),
        };

        debug!("Getting quote for {}", ticker);
        let res = self
            .client
            .get(self.quote_url(ticker))
            .send()
            .await
            .map_err(transport)?;

        let status = res.status();
        if !status.is_success() {
            return Err(QuoteUnavailable::HttpStatus {
                ticker: ticker.clone(),
                status: status.as_u16(),
            });
        }

        let body = res.text().await.map_err(transport)?;
        debug!("Quote for {} : {}", ticker, body);

        parse_global_quote(ticker, &body)
    }
}

/// Extracts the price from a `GLOBAL_QUOTE` response body.
pub fn parse_global_quote(ticker: &Ticker, body: &str) -> Result<Decimal, QuoteUnavailable> {
    let response: GlobalQuoteResponse =
        serde_json::de::from_str(body).map_err(|err| QuoteUnavailable::Malformed {
            ticker: ticker.clone(),
            reason: err.to_string(),
        })?;

    if let Some(message) = response.note.or(response.information) {
        return Err(QuoteUnavailable::RateLimited {
            ticker: ticker.clone(),
            message,
        });
    }
    if response.error_message.is_some() {
        return Err(QuoteUnavailable::UnknownTicker {
            ticker: ticker.clone(),
        });
    }

    // unknown symbols come back as an empty "Global Quote" object
    let quote = match response.global_quote {
        Some(quote) if !quote.is_empty() => quote,
        _ => {
            return Err(QuoteUnavailable::UnknownTicker {
                ticker: ticker.clone(),
            })
        }
    };

    let value = quote
        .get(PRICE_FIELD)
        .ok_or_else(|| QuoteUnavailable::MissingPrice {
            ticker: ticker.clone(),
        })?;
    let price = match value {
        Value::String(price) => Decimal::from_str(price.trim()).ok(),
        Value::Number(price) => Decimal::from_str(&price.to_string()).ok(),
        _ => None,
    };
    match price {
        Some(price) if price >= Decimal::ZERO => Ok(price),
        _ => Err(QuoteUnavailable::Malformed {
            ticker: ticker.clone(),
            reason: format!("Invalid price {}", value),
        }),
    }
}
