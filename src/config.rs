use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::info;

use crate::error::QuoteUnavailable;
use crate::portfolio::Portfolio;
use crate::quote::alpha_vantage::DEFAULT_BASE_URL;
use crate::quote::{AlphaVantage, FixedQuotes, Guarded, QuoteSource, RetryPolicy};
use crate::shell::{parse_buy_price, parse_quantity};
use crate::ticker::Ticker;

#[derive(Parser, Debug)]
#[command(name = "portfolio", about = "Track stock holdings against current market prices")]
pub struct Args {
    /// Alpha Vantage api key
    #[arg(long, env = "ALPHA_VANTAGE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    #[arg(long, env = "ALPHA_VANTAGE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
    /// JSON object of ticker to price, used instead of the network
    #[arg(long)]
    pub quotes_path: Option<PathBuf>,
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
    pub quote_timeout_secs: u64,
    #[arg(long, default_value = "2")]
    pub quote_retries: u32,
    #[arg(long, default_value = "500")]
    pub retry_backoff_ms: u64,
    #[arg(long)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum Commands {
    /// Interactive menu (default)
    Shell,
    /// Print one report for the given holdings and exit
    Report {
        /// TICKER:QUANTITY:BUY_PRICE
        #[arg(long = "holding", value_delimiter = ',', required = true)]
        holdings: Vec<String>,
    },
}

impl Args {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            timeout: Duration::from_secs(self.quote_timeout_secs),
            retries: self.quote_retries,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    pub async fn quote_provider(&self) -> Result<QuoteProvider> {
        if let Some(path) = &self.quotes_path {
            let quotes = FixedQuotes::load(path).await?;
            info!("Loaded {} quotes from {}", quotes.len(), path.display());
            return Ok(QuoteProvider::Fixed(quotes));
        }

        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .context("No quote source: set ALPHA_VANTAGE_API_KEY or pass --quotes-path")?;
        let policy = self.retry_policy();
        let source = AlphaVantage::new(api_key, &self.base_url, policy.timeout)?;
        info!("Using Alpha Vantage quotes from {}", self.base_url);
        Ok(QuoteProvider::AlphaVantage(Guarded::new(source, policy)))
    }
}

/// Quote source picked at start-up.
#[derive(Debug, Clone)]
pub enum QuoteProvider {
    AlphaVantage(Guarded<AlphaVantage>),
    Fixed(FixedQuotes),
}

impl QuoteSource for QuoteProvider {
    async fn get_price(&self, ticker: &Ticker) -> Result<Decimal, QuoteUnavailable> {
        match self {
            Self::AlphaVantage(source) => source.get_price(ticker).await,
            Self::Fixed(source) => source.get_price(ticker).await,
        }
    }
}

/// Builds a portfolio from `TICKER:QUANTITY:BUY_PRICE` arguments.
pub fn portfolio_from_args(holdings: &[String]) -> Result<Portfolio> {
    let mut portfolio = Portfolio::new();
    for arg in holdings {
        let parts: Vec<&str> = arg.split(':').collect();
        let [ticker, quantity, buy_price] = parts.as_slice() else {
            return Err(anyhow!(
                "Invalid holding {:?}, expected TICKER:QUANTITY:BUY_PRICE",
                arg
            ));
        };
        let quantity =
            parse_quantity(quantity).with_context(|| format!("Invalid holding {:?}", arg))?;
        let buy_price =
            parse_buy_price(buy_price).with_context(|| format!("Invalid holding {:?}", arg))?;
        portfolio
            .add(ticker, quantity, buy_price)
            .with_context(|| format!("Invalid holding {:?}", arg))?;
    }
    Ok(portfolio)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_parse_report_command() {
        let args = Args::try_parse_from([
            "portfolio",
            "--quotes-path",
            "quotes.json",
            "--quote-retries",
            "0",
            "report",
            "--holding",
            "AAPL:10:150,msft:5:300.5",
            "--holding",
            "TSLA:1:200",
        ])
        .unwrap();

        assert_eq!(args.quotes_path, Some(PathBuf::from("quotes.json")));
        assert_eq!(args.retry_policy().retries, 0);
        assert_eq!(args.retry_policy().timeout, Duration::from_secs(10));
        assert_eq!(
            args.command,
            Some(Commands::Report {
                holdings: vec![
                    "AAPL:10:150".to_string(),
                    "msft:5:300.5".to_string(),
                    "TSLA:1:200".to_string()
                ]
            })
        );
    }

    #[test]
    fn test_default_command() {
        let args = Args::try_parse_from(["portfolio", "--no-color"]).unwrap();
        assert!(args.no_color);
        assert_eq!(args.command, None);
        assert_eq!(args.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(Args::try_parse_from(["portfolio", "--quote-timeout-secs", "0"]).is_err());

        let args = Args::try_parse_from(["portfolio", "--quote-timeout-secs", "1"]).unwrap();
        assert_eq!(args.retry_policy().timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_portfolio_from_args() {
        let portfolio = portfolio_from_args(&[
            "AAPL:10:150".to_string(),
            "msft:5:300.5".to_string(),
            "AAPL:2:100".to_string(),
        ])
        .unwrap();

        assert_eq!(portfolio.len(), 2);
        assert_eq!(portfolio.get("AAPL").unwrap().quantity, 2);
        assert_eq!(portfolio.get("MSFT").unwrap().buy_price, dec!(300.5));
    }

    #[test]
    fn test_portfolio_from_bad_args() {
        assert!(portfolio_from_args(&["AAPL:10".to_string()]).is_err());
        assert!(portfolio_from_args(&["AAPL:x:1".to_string()]).is_err());
        assert!(portfolio_from_args(&["AAPL:1:-5".to_string()]).is_err());
        assert!(portfolio_from_args(&[":1:5".to_string()]).is_err());
        let huge = "AAPL:9223372036854775807:100000000000".to_string();
        assert!(portfolio_from_args(&[huge]).is_err());
    }

    #[tokio::test]
    async fn test_fixed_provider() {
        let path = std::env::temp_dir().join(format!("quotes-{}.json", std::process::id()));
        tokio::fs::write(&path, r#"{"AAPL": "160"}"#).await.unwrap();

        let args = Args::try_parse_from([
            "portfolio",
            "--quotes-path",
            path.to_str().unwrap(),
        ])
        .unwrap();
        let provider = args.quote_provider().await.unwrap();
        let _ = tokio::fs::remove_file(&path).await;

        assert!(matches!(provider, QuoteProvider::Fixed(_)));
        let aapl = Ticker::parse("AAPL").unwrap();
        assert_eq!(provider.get_price(&aapl).await, Ok(dec!(160)));
    }

    #[tokio::test]
    async fn test_alpha_vantage_provider() {
        let args = Args::try_parse_from(["portfolio", "--api-key", "demo"]).unwrap();
        let provider = args.quote_provider().await.unwrap();
        assert!(matches!(provider, QuoteProvider::AlphaVantage(_)));

        let args = Args::try_parse_from(["portfolio", "--api-key", " "]).unwrap();
        assert!(args.quote_provider().await.is_err());
    }
}
