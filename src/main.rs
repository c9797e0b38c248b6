//! Market report CLI
//!
//! Runs the daily forecast pipeline and publishes the result.

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use market_report::{
    calendar::WeekdayCalendar,
    client::{MarketDataProvider, YahooClient},
    config::Config,
    ml::{PredictorConfig, SymbolPredictor},
    pipeline::{ReportPipeline, RunOptions, RunOutcome},
    publish::{PublishCoordinator, SettleWait, ThreadsClient},
    storage::CsvHistory,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "market-report")]
#[command(about = "Daily AI forecast report for an equity watchlist")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and publish
    Run {
        /// Ignore the trading-day check
        #[arg(long)]
        force: bool,
        /// Print the report without publishing or recording history
        #[arg(long)]
        dry_run: bool,
        /// Report date (defaults to today, local time)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Predict a single symbol
    Predict {
        symbol: String,
    },
    /// Check the Threads token by resolving its user id
    Whoami,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Run { force, dry_run, date } => run_report(config, force, dry_run, date).await,
        Commands::Predict { symbol } => predict_symbol(config, &symbol).await,
        Commands::Whoami => whoami(config).await,
    }
}

fn market_data(config: &Config) -> anyhow::Result<YahooClient> {
    Ok(YahooClient::new(
        &config.data.base_url,
        Duration::from_secs(config.data.timeout_secs),
    )?)
}

async fn run_report(
    config: Config,
    force: bool,
    dry_run: bool,
    date: Option<NaiveDate>,
) -> anyhow::Result<()> {
    let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
    tracing::info!("Starting report run for {}", date);

    if dry_run {
        tracing::warn!("Running in DRY RUN mode - nothing will be published");
    }

    let publisher = if dry_run {
        None
    } else {
        let client = ThreadsClient::from_config(&config.publish)
            .context("publishing needs THREADS_TOKEN")?;
        Some(PublishCoordinator::new(
            Arc::new(client),
            SettleWait::new(config.publish.settle_delay()),
        ))
    };

    let provider = Arc::new(market_data(&config)?);
    let calendar = Arc::new(WeekdayCalendar::new(config.calendar.holidays.clone()));
    let history = Arc::new(CsvHistory::new(config.history.resolved_path()));

    let pipeline = ReportPipeline::new(config, provider, calendar, history, publisher);
    let outcome = pipeline
        .run(RunOptions {
            date,
            force,
            dry_run,
        })
        .await?;

    match outcome {
        RunOutcome::MarketClosed => {
            println!("Market closed on {}; use --force to run anyway", date);
        }
        RunOutcome::Completed(summary) => {
            println!("{}", summary.report.render());
            println!("---");
            println!(
                "{} evaluated, {} skipped, {} chars",
                summary.evaluation.results.len(),
                summary.evaluation.skipped.len(),
                summary.report.char_count()
            );
            for (symbol, reason) in &summary.evaluation.skipped {
                println!("  skipped {}: {}", symbol, reason);
            }
            if let Some(receipt) = &summary.receipt {
                println!(
                    "Published {}{} ({} history rows)",
                    receipt.published_id,
                    if receipt.degraded { " [degraded]" } else { "" },
                    summary.history_rows
                );
            }
        }
    }

    Ok(())
}

async fn predict_symbol(config: Config, symbol: &str) -> anyhow::Result<()> {
    let provider = market_data(&config)?;
    let series = provider
        .fetch_series(symbol, &config.data.lookback)
        .await
        .with_context(|| format!("fetching {}", symbol))?;

    let predictor = SymbolPredictor::new(PredictorConfig::from(&config.model));
    match predictor.predict(&series) {
        Ok(result) => {
            println!("Symbol:     {}", result.symbol);
            println!("Bars:       {}", series.len());
            println!("Forecast:   {:+.2}%", result.predicted_pct());
            println!("Last close: {:.2}", result.last_close);
            if let Some(pivot) = result.pivot {
                println!("Support:    {:.1}", pivot.support);
                println!("Resistance: {:.1}", pivot.resistance);
            }
        }
        Err(reason) => println!("{} skipped: {}", symbol, reason),
    }

    Ok(())
}

async fn whoami(config: Config) -> anyhow::Result<()> {
    let client = ThreadsClient::from_config(&config.publish)?;
    let id = client.user_id().await?;
    println!("Threads user id: {}", id);
    Ok(())
}
