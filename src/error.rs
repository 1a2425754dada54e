use rust_decimal::Decimal;
use thiserror::Error;

use crate::ticker::Ticker;

/// Rejected input to a portfolio operation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Ticker must not be empty")]
    EmptyTicker,

    #[error("Invalid ticker: {0:?}")]
    InvalidTicker(String),

    #[error("Quantity must be positive, got {0}")]
    NonPositiveQuantity(i64),

    #[error("Buy price must not be negative, got {0}")]
    NegativeBuyPrice(Decimal),

    #[error("Holding too large: {quantity} x {buy_price}")]
    CostOverflow { quantity: i64, buy_price: Decimal },

    #[error("Quote price must not be negative, got {0}")]
    NegativePrice(Decimal),

    #[error("Invalid {field}: {input:?}")]
    InvalidNumber { field: &'static str, input: String },
}

/// A price could not be obtained for one ticker.
///
/// Every variant is recoverable: the valuation skips the ticker and keeps going.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QuoteUnavailable {
    #[error("Quote request for {ticker} failed: {reason}")]
    Transport { ticker: Ticker, reason: String },

    #[error("Quote provider answered {status} for {ticker}")]
    HttpStatus { ticker: Ticker, status: u16 },

    #[error("Malformed quote payload for {ticker}: {reason}")]
    Malformed { ticker: Ticker, reason: String },

    #[error("Quote for {ticker} has no price")]
    MissingPrice { ticker: Ticker },

    #[error("Quote provider throttled request for {ticker}: {message}")]
    RateLimited { ticker: Ticker, message: String },

    #[error("Unknown ticker {ticker}")]
    UnknownTicker { ticker: Ticker },

    #[error("Quote for {ticker} timed out after {millis}ms")]
    Timeout { ticker: Ticker, millis: u64 },
}

impl QuoteUnavailable {
    pub fn ticker(&self) -> &Ticker {
        match self {
            Self::Transport { ticker, .. }
            | Self::HttpStatus { ticker, .. }
            | Self::Malformed { ticker, .. }
            | Self::MissingPrice { ticker }
            | Self::RateLimited { ticker, .. }
            | Self::UnknownTicker { ticker }
            | Self::Timeout { ticker, .. } => ticker,
        }
    }

    /// Whether asking again later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::RateLimited { .. } | Self::Timeout { .. } => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            Self::Malformed { .. } | Self::MissingPrice { .. } | Self::UnknownTicker { .. } => {
                false
            }
        }
    }
}
