use std::io::IsTerminal;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncWriteExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use stock_portfolio::config::{portfolio_from_args, Args, Commands, QuoteProvider};
use stock_portfolio::portfolio::Portfolio;
use stock_portfolio::report;
use stock_portfolio::shell::Shell;
use stock_portfolio::valuation::valuate;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // logs go to stderr, stdout is for the menu and the report
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!(
                "stock_portfolio=info,{}=info,reqwest=warn",
                env!("CARGO_CRATE_NAME")
            )
            .into()
        }))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    if let Err(err) = run(args).await {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let color = !args.no_color && std::io::stdout().is_terminal();
    colored::control::set_override(color);

    let quotes = args.quote_provider().await?;

    match args.command {
        Some(Commands::Report { holdings }) => {
            let portfolio = portfolio_from_args(&holdings)?;
            run_report(portfolio, quotes, color).await
        }
        Some(Commands::Shell) | None => run_shell(quotes, color).await,
    }
}

async fn run_report(portfolio: Portfolio, quotes: QuoteProvider, color: bool) -> Result<()> {
    let snapshot = portfolio.snapshot();
    let valuation = valuate(&snapshot, &quotes).await;
    if valuation.is_partial() {
        info!(
            "{} of {} holdings left out of the totals",
            valuation.skipped(),
            snapshot.len()
        );
    }

    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(report::render(&valuation, snapshot.len(), color).as_bytes())
        .await
        .context("Failed to write report")?;
    stdout.flush().await?;
    Ok(())
}

async fn run_shell(quotes: QuoteProvider, color: bool) -> Result<()> {
    let input = BufReader::new(tokio::io::stdin());
    let mut shell =
        Shell::new(Portfolio::new(), quotes, input, tokio::io::stdout()).with_color(color);
    shell.run().await.context("Terminal closed")?;
    Ok(())
}
