use std::io;
use std::str::FromStr;

use rust_decimal::Decimal;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::error::ValidationError;
use crate::portfolio::{Portfolio, RemoveOutcome};
use crate::quote::QuoteSource;
use crate::report;
use crate::valuation::valuate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum MenuChoice {
    #[strum(to_string = "Add Stock")]
    Add,
    #[strum(to_string = "Remove Stock")]
    Remove,
    #[strum(to_string = "View Portfolio")]
    View,
    #[strum(to_string = "Exit")]
    Exit,
}

impl MenuChoice {
    /// Menu entries are numbered from 1.
    pub fn from_input(input: &str) -> Option<Self> {
        let n: usize = input.trim().parse().ok()?;
        Self::iter().nth(n.checked_sub(1)?)
    }
}

pub fn parse_quantity(input: &str) -> Result<i64, ValidationError> {
    input
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidNumber {
            field: "quantity",
            input: input.trim().to_string(),
        })
}

/// Plain decimal notation only, so `NaN` or `inf` never reach the portfolio.
pub fn parse_buy_price(input: &str) -> Result<Decimal, ValidationError> {
    Decimal::from_str(input.trim()).map_err(|_| ValidationError::InvalidNumber {
        field: "buy price",
        input: input.trim().to_string(),
    })
}

/// Menu-driven loop over a portfolio it owns.
pub struct Shell<Q, R, W> {
    portfolio: Portfolio,
    quotes: Q,
    input: R,
    output: W,
    color: bool,
}

impl<Q, R, W> Shell<Q, R, W>
where
    Q: QuoteSource,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(portfolio: Portfolio, quotes: Q, input: R, output: W) -> Self {
        Self {
            portfolio,
            quotes,
            input,
            output,
            color: false,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    /// Runs until Exit is chosen or the input ends.
    pub async fn run(&mut self) -> io::Result<()> {
        loop {
            self.write_menu().await?;
            let Some(choice) = self.prompt("Enter your choice: ").await? else {
                debug!("Input closed");
                break;
            };
            match MenuChoice::from_input(&choice) {
                Some(MenuChoice::Add) => self.add_holding().await?,
                Some(MenuChoice::Remove) => self.remove_holding().await?,
                Some(MenuChoice::View) => self.view_report().await?,
                Some(MenuChoice::Exit) => {
                    self.say("Exiting the portfolio tracker.").await?;
                    break;
                }
                None => self.say("Invalid choice. Please try again.").await?,
            }
        }
        Ok(())
    }

    async fn write_menu(&mut self) -> io::Result<()> {
        let mut menu = String::from("\nStock Portfolio Tracker\n");
        for (i, choice) in MenuChoice::iter().enumerate() {
            menu.push_str(&format!("{}. {}\n", i + 1, choice));
        }
        self.write(&menu).await
    }

    async fn add_holding(&mut self) -> io::Result<()> {
        let Some(ticker) = self.prompt("Enter stock ticker: ").await? else {
            return Ok(());
        };
        let Some(quantity) = self.prompt("Enter quantity: ").await? else {
            return Ok(());
        };
        let quantity = match parse_quantity(&quantity) {
            Ok(quantity) => quantity,
            Err(err) => return self.say(&err.to_string()).await,
        };
        let Some(buy_price) = self.prompt("Enter buy price: ").await? else {
            return Ok(());
        };
        let buy_price = match parse_buy_price(&buy_price) {
            Ok(buy_price) => buy_price,
            Err(err) => return self.say(&err.to_string()).await,
        };

        let message = match self.portfolio.add(&ticker, quantity, buy_price) {
            Ok(holding) => {
                info!(
                    "Added {} x {} @ {}",
                    holding.ticker, holding.quantity, holding.buy_price
                );
                format!("Added {} to portfolio.", holding.ticker)
            }
            Err(err) => err.to_string(),
        };
        self.say(&message).await
    }

    async fn remove_holding(&mut self) -> io::Result<()> {
        let Some(ticker) = self.prompt("Enter stock ticker to remove: ").await? else {
            return Ok(());
        };
        let message = match self.portfolio.remove(&ticker) {
            Ok(RemoveOutcome::Removed(holding)) => {
                info!("Removed {}", holding.ticker);
                format!("Removed {} from portfolio.", holding.ticker)
            }
            Ok(RemoveOutcome::NotFound(ticker)) => format!("{} is not in the portfolio.", ticker),
            Err(err) => err.to_string(),
        };
        self.say(&message).await
    }

    async fn view_report(&mut self) -> io::Result<()> {
        let snapshot = self.portfolio.snapshot();
        let valuation = valuate(&snapshot, &self.quotes).await;
        let rendered = report::render(&valuation, snapshot.len(), self.color);
        self.write(&rendered).await
    }

    async fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        self.write(text).await?;
        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    async fn say(&mut self, line: &str) -> io::Result<()> {
        self.write(&format!("{}\n", line)).await
    }

    async fn write(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await
    }
}
