use rust_decimal::Decimal;

use crate::error::QuoteUnavailable;
use crate::ticker::Ticker;

pub mod alpha_vantage;
pub mod fixed;
pub mod guarded;

pub use alpha_vantage::AlphaVantage;
pub use fixed::FixedQuotes;
pub use guarded::{Guarded, RetryPolicy};

/// Looks up the current market price of a single ticker.
pub trait QuoteSource {
    async fn get_price(&self, ticker: &Ticker) -> Result<Decimal, QuoteUnavailable>;
}

impl<Q: QuoteSource> QuoteSource for &Q {
    async fn get_price(&self, ticker: &Ticker) -> Result<Decimal, QuoteUnavailable> {
        (**self).get_price(ticker).await
    }
}
