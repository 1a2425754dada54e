use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::ValidationError;
use crate::ticker::Ticker;

#[derive(Clone, Debug, PartialEq)]
pub struct Holding {
    pub ticker: Ticker,
    pub quantity: u64,
    pub buy_price: Decimal,
}

impl Holding {
    /// `None` when quantity x buy price does not fit in a `Decimal`.
    pub fn cost(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.buy_price)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RemoveOutcome {
    Removed(Holding),
    NotFound(Ticker),
}

/// Holdings keyed by ticker, iterated in insertion order.
///
/// Re-adding a ticker replaces its holding but keeps its position.
#[derive(Clone, Debug, Default)]
pub struct Portfolio {
    holdings: HashMap<Ticker, Holding>,
    order: Vec<Ticker>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        ticker: &str,
        quantity: i64,
        buy_price: Decimal,
    ) -> Result<&Holding, ValidationError> {
        let ticker = Ticker::parse(ticker)?;
        if quantity <= 0 {
            return Err(ValidationError::NonPositiveQuantity(quantity));
        }
        if buy_price < Decimal::ZERO {
            return Err(ValidationError::NegativeBuyPrice(buy_price));
        }
        if Decimal::from(quantity).checked_mul(buy_price).is_none() {
            return Err(ValidationError::CostOverflow {
                quantity,
                buy_price,
            });
        }

        let holding = Holding {
            ticker: ticker.clone(),
            quantity: quantity.unsigned_abs(),
            buy_price,
        };
        if self.holdings.insert(ticker.clone(), holding).is_some() {
            debug!("Replaced holding for {}", ticker);
        } else {
            self.order.push(ticker.clone());
        }

        // just inserted
        Ok(&self.holdings[&ticker])
    }

    pub fn remove(&mut self, ticker: &str) -> Result<RemoveOutcome, ValidationError> {
        let ticker = Ticker::parse(ticker)?;
        match self.holdings.remove(&ticker) {
            Some(holding) => {
                self.order.retain(|t| *t != ticker);
                Ok(RemoveOutcome::Removed(holding))
            }
            None => Ok(RemoveOutcome::NotFound(ticker)),
        }
    }

    pub fn get(&self, ticker: &str) -> Option<&Holding> {
        let ticker = Ticker::parse(ticker).ok()?;
        self.holdings.get(&ticker)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Holding> {
        self.order.iter().filter_map(|ticker| self.holdings.get(ticker))
    }

    /// Owned copy of the current holdings; unaffected by later mutation.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            holdings: self.iter().cloned().collect(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    holdings: Vec<Holding>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Holding> {
        self.holdings.iter()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Holding;
    type IntoIter = std::slice::Iter<'a, Holding>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
