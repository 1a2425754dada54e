use std::time::Duration;

use rust_decimal::Decimal;
use tracing::warn;

use crate::error::QuoteUnavailable;
use crate::quote::QuoteSource;
use crate::ticker::Ticker;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Limit for a single attempt.
    pub timeout: Duration,
    /// Extra attempts after the first one, for transient failures only.
    pub retries: u32,
    /// Delay before the first retry, doubled for each further one.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            retries: 2,
            backoff: Duration::from_millis(500),
        }
    }
}

/// Adds a per-lookup timeout and bounded retries to another source.
#[derive(Debug, Clone)]
pub struct Guarded<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: QuoteSource> Guarded<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    async fn attempt(&self, ticker: &Ticker) -> Result<Decimal, QuoteUnavailable> {
        match tokio::time::timeout(self.policy.timeout, self.inner.get_price(ticker)).await {
            Ok(res) => res,
            Err(_) => Err(QuoteUnavailable::Timeout {
                ticker: ticker.clone(),
                millis: self.policy.timeout.as_millis() as u64,
            }),
        }
    }
}

impl<S: QuoteSource> QuoteSource for Guarded<S> {
    async fn get_price(&self, ticker: &Ticker) -> Result<Decimal, QuoteUnavailable> {
        let mut attempt = 0;
        loop {
            match self.attempt(ticker).await {
                Err(err) if err.is_transient() && attempt < self.policy.retries => {
                    let delay = self
                        .policy
                        .backoff
                        .saturating_mul(2_u32.saturating_pow(attempt));
                    warn!(
                        "{} (attempt {}/{}), retrying in {:?}",
                        err,
                        attempt + 1,
                        self.policy.retries + 1,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                res => return res,
            }
        }
    }
}
