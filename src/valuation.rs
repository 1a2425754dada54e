use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::QuoteUnavailable;
use crate::portfolio::{Holding, Snapshot};
use crate::quote::QuoteSource;
use crate::ticker::Ticker;

#[derive(Clone, Debug, PartialEq)]
pub struct ValuationRow {
    pub ticker: Ticker,
    pub quantity: u64,
    pub buy_price: Decimal,
    pub current_price: Decimal,
    pub market_value: Decimal,
    pub cost: Decimal,
    pub profit_loss: Decimal,
}

impl ValuationRow {
    /// `None` when the value or cost of the holding overflows a `Decimal`.
    pub fn new(holding: &Holding, current_price: Decimal) -> Option<Self> {
        let market_value = Decimal::from(holding.quantity).checked_mul(current_price)?;
        let cost = holding.cost()?;
        Some(Self {
            ticker: holding.ticker.clone(),
            quantity: holding.quantity,
            buy_price: holding.buy_price,
            current_price,
            market_value,
            cost,
            profit_loss: market_value.checked_sub(cost)?,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PortfolioTotals {
    pub total_value: Decimal,
    pub total_cost: Decimal,
    pub overall_profit_loss: Decimal,
}

impl PortfolioTotals {
    fn checked_add(&self, row: &ValuationRow) -> Option<Self> {
        let total_value = self.total_value.checked_add(row.market_value)?;
        let total_cost = self.total_cost.checked_add(row.cost)?;
        Some(Self {
            total_value,
            total_cost,
            overall_profit_loss: total_value.checked_sub(total_cost)?,
        })
    }
}

/// Outcome of one report run.
///
/// Holdings without a price appear only in `unavailable`, and holdings whose
/// value does not fit in a `Decimal` only in `overflowed`. Neither is part of
/// `totals`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Valuation {
    pub rows: Vec<ValuationRow>,
    pub totals: PortfolioTotals,
    pub unavailable: Vec<QuoteUnavailable>,
    pub overflowed: Vec<Ticker>,
}

impl Valuation {
    /// True when at least one holding was left out of the totals.
    pub fn is_partial(&self) -> bool {
        !self.unavailable.is_empty() || !self.overflowed.is_empty()
    }

    /// Number of holdings left out of the totals.
    pub fn skipped(&self) -> usize {
        self.unavailable.len() + self.overflowed.len()
    }
}

/// Prices every holding of `snapshot`, one lookup at a time, in snapshot order.
pub async fn valuate<Q: QuoteSource>(snapshot: &Snapshot, quotes: &Q) -> Valuation {
    let mut valuation = Valuation::default();

    for holding in snapshot {
        let price = match quotes.get_price(&holding.ticker).await {
            Ok(price) => price,
            Err(err) => {
                warn!("Could not fetch data for {} : {}", holding.ticker, err);
                valuation.unavailable.push(err);
                continue;
            }
        };

        let valued = ValuationRow::new(holding, price)
            .and_then(|row| Some((valuation.totals.checked_add(&row)?, row)));
        let Some((totals, row)) = valued else {
            warn!(
                "Value of {} x {} @ {} is out of range",
                holding.ticker, holding.quantity, price
            );
            valuation.overflowed.push(holding.ticker.clone());
            continue;
        };

        debug!(
            "{} x {} @ {} = {} (P/L {})",
            row.ticker, row.quantity, row.current_price, row.market_value, row.profit_loss
        );
        valuation.totals = totals;
        valuation.rows.push(row);
    }

    valuation
}
