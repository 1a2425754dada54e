use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;

use crate::error::{QuoteUnavailable, ValidationError};
use crate::quote::QuoteSource;
use crate::ticker::Ticker;

/// Price table held in memory, for offline runs.
///
/// The JSON form is a single object of ticker to price, prices given as
/// strings or numbers: `{"AAPL": "160.00", "MSFT": 410.5}`.
#[derive(Debug, Clone, Default)]
pub struct FixedQuotes {
    prices: HashMap<Ticker, Decimal>,
}

impl FixedQuotes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, ticker: &str, price: Decimal) -> Result<Self, ValidationError> {
        let ticker = Ticker::parse(ticker)?;
        if price < Decimal::ZERO {
            return Err(ValidationError::NegativePrice(price));
        }
        self.prices.insert(ticker, price);
        Ok(self)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let prices: HashMap<Ticker, Decimal> =
            serde_json::de::from_str(json).context("Invalid quotes file")?;
        if let Some((ticker, price)) = prices.iter().find(|(_, price)| **price < Decimal::ZERO) {
            bail!("Invalid quotes file: {} has negative price {}", ticker, price);
        }
        Ok(Self { prices })
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read quotes from {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl QuoteSource for FixedQuotes {
    async fn get_price(&self, ticker: &Ticker) -> Result<Decimal, QuoteUnavailable> {
        self.prices
            .get(ticker)
            .copied()
            .ok_or_else(|| QuoteUnavailable::UnknownTicker {
                ticker: ticker.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_from_json() {
        let quotes = FixedQuotes::from_json(r#"{"aapl": "160.00", "MSFT": 410.5}"#).unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(
            quotes.prices.get(&Ticker::parse("AAPL").unwrap()),
            Some(&dec!(160.00))
        );
        assert_eq!(
            quotes.prices.get(&Ticker::parse("MSFT").unwrap()),
            Some(&dec!(410.5))
        );
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(FixedQuotes::from_json(r#"{"": "1"}"#).is_err());
        assert!(FixedQuotes::from_json(r#"{"AAPL": "abc"}"#).is_err());
        assert!(FixedQuotes::from_json("[]").is_err());
        assert!(FixedQuotes::from_json(r#"{"AAPL": "160", "MSFT": -3}"#).is_err());
        assert!(FixedQuotes::from_json(r#"{"AAPL": "-0.01"}"#).is_err());
    }

    #[test]
    fn test_with_negative_price() {
        assert_eq!(
            FixedQuotes::new().with_price("AAPL", dec!(-3)).unwrap_err(),
            ValidationError::NegativePrice(dec!(-3))
        );
        assert!(FixedQuotes::new().with_price("AAPL", dec!(0)).is_ok());
    }

    #[tokio::test]
    async fn test_get_price() {
        let quotes = FixedQuotes::new().with_price("ibm", dec!(180)).unwrap();
        let ibm = Ticker::parse("IBM").unwrap();
        let nope = Ticker::parse("NOPE").unwrap();

        assert_eq!(quotes.get_price(&ibm).await, Ok(dec!(180)));
        assert_eq!(
            quotes.get_price(&nope).await,
            Err(QuoteUnavailable::UnknownTicker { ticker: nope })
        );
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let res = FixedQuotes::load(Path::new("/nonexistent/quotes.json")).await;
        assert!(res.is_err());
    }
}
