use std::fmt::Write;

use colored::Colorize;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::valuation::Valuation;

/// Renders `valuation` as the portfolio table followed by the totals.
///
/// Skipped holdings are listed after the priced rows, unpriced ones first.
///
/// `holdings` is the size of the valued snapshot; an empty snapshot renders
/// as a single notice instead of an empty table.
pub fn render(valuation: &Valuation, holdings: usize, color: bool) -> String {
    if holdings == 0 {
        return String::from("Your portfolio is empty.\n");
    }

    let mut s = String::new();
    let _ = writeln!(
        s,
        "{:<10} {:<10} {:<10} {:<15} {:<10} {}",
        "Ticker", "Quantity", "Buy Price", "Current Price", "Value", "P/L"
    );
    for row in valuation.rows.iter() {
        let _ = writeln!(
            s,
            "{:<10} {:<10} {:<10} {:<15} {:<10} {}",
            row.ticker,
            row.quantity,
            money(row.buy_price),
            money(row.current_price),
            money(row.market_value),
            profit_loss(row.profit_loss, color)
        );
    }
    for err in valuation.unavailable.iter() {
        let _ = writeln!(s, "Could not fetch data for {}.", err.ticker());
    }
    for ticker in valuation.overflowed.iter() {
        let _ = writeln!(s, "Value of {} is out of range.", ticker);
    }

    let totals = &valuation.totals;
    let _ = writeln!(s);
    let _ = writeln!(s, "Total Portfolio Value: {}", money(totals.total_value));
    let _ = writeln!(s, "Total Cost: {}", money(totals.total_cost));
    let _ = writeln!(
        s,
        "Overall P/L: {}",
        profit_loss(totals.overall_profit_loss, color)
    );
    s
}

fn money(value: Decimal) -> String {
    format!(
        "{:.2}",
        value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

fn profit_loss(value: Decimal, color: bool) -> String {
    let text = money(value);
    match color {
        false => text,
        true if value < Decimal::ZERO => text.red().to_string(),
        true => text.green().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::error::QuoteUnavailable;
    use crate::portfolio::Portfolio;
    use crate::ticker::Ticker;
    use crate::valuation::{PortfolioTotals, ValuationRow};

    fn sample() -> Valuation {
        let mut portfolio = Portfolio::new();
        portfolio.add("AAPL", 10, dec!(150)).unwrap();
        portfolio.add("MSFT", 2, dec!(300.456)).unwrap();
        let snapshot = portfolio.snapshot();
        let mut holdings = snapshot.iter();
        let aapl = ValuationRow::new(holdings.next().unwrap(), dec!(160.005)).unwrap();
        let msft = ValuationRow::new(holdings.next().unwrap(), dec!(250)).unwrap();
        let totals = PortfolioTotals {
            total_value: aapl.market_value + msft.market_value,
            total_cost: aapl.cost + msft.cost,
            overall_profit_loss: aapl.profit_loss + msft.profit_loss,
        };
        Valuation {
            rows: vec![aapl, msft],
            totals,
            unavailable: vec![QuoteUnavailable::UnknownTicker {
                ticker: Ticker::parse("XYZ").unwrap(),
            }],
            overflowed: vec![Ticker::parse("HUGE").unwrap()],
        }
    }

    #[test]
    fn test_render_table() {
        let report = render(&sample(), 4, false);
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(
            lines,
            vec![
                "Ticker     Quantity   Buy Price  Current Price   Value      P/L",
                "AAPL       10         150.00     160.01          1600.05    100.05",
                "MSFT       2          300.46     250.00          500.00     -100.91",
                "Could not fetch data for XYZ.",
                "Value of HUGE is out of range.",
                "",
                "Total Portfolio Value: 2100.05",
                "Total Cost: 2100.91",
                "Overall P/L: -0.86",
            ]
        );
    }

    #[test]
    fn test_render_empty_portfolio() {
        assert_eq!(
            render(&Valuation::default(), 0, false),
            "Your portfolio is empty.\n"
        );
    }

    #[test]
    fn test_render_nothing_priced() {
        let report = render(&Valuation::default(), 2, false);
        assert!(report.contains("Total Portfolio Value: 0.00"));
        assert!(report.contains("Total Cost: 0.00"));
        assert!(report.contains("Overall P/L: 0.00"));
    }

    #[test]
    fn test_profit_loss_color() {
        colored::control::set_override(true);
        assert_eq!(profit_loss(dec!(-1), true), "-1.00".red().to_string());
        assert_eq!(profit_loss(dec!(0), true), "0.00".green().to_string());
        assert_eq!(profit_loss(dec!(-1), false), "-1.00");
    }
}
