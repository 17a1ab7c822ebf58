use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use prospect_common::{Config, IntentOverrides, RunMode};
use prospect_discovery::runner::{DiscoveryRunner, RunRequest};
use prospect_discovery::sink::JsonFileSink;
use prospect_fetch::HttpFetcher;
use serper_client::SerperClient;

#[derive(Parser)]
#[command(
    name = "prospect-discovery",
    about = "Run one guarded prospect discovery cycle"
)]
struct Args {
    /// Intent template to run. Defaults to the catalog default.
    #[arg(long)]
    intent: Option<String>,

    /// Simulate persistence: candidates are reported but nothing is
    /// durably written.
    #[arg(long)]
    dry_run: bool,

    /// Run mode: manual, daily or test.
    #[arg(long, default_value = "manual")]
    mode: String,

    /// Override target countries (ISO codes, repeatable).
    #[arg(long = "country")]
    countries: Vec<String>,

    /// Explicit queries replacing the intent's seed expansion (repeatable).
    #[arg(long = "query")]
    queries: Vec<String>,

    #[arg(long)]
    max_companies: Option<u32>,

    #[arg(long)]
    max_leads: Option<u32>,

    /// Convert search results directly without fetching and scoring
    /// each page.
    #[arg(long)]
    no_scrape: bool,

    #[arg(long, default_value = "cli")]
    triggered_by: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("prospect_discovery=info".parse()?),
        )
        .init();

    info!("Prospect discovery starting...");

    let args = Args::parse();
    let config = Config::from_env();
    config.log_redacted();

    let searcher = Arc::new(SerperClient::new(&config.serper_api_key));
    let fetcher = Arc::new(HttpFetcher::new(Duration::from_secs(
        config.fetch_timeout_secs,
    )));
    let sink = Arc::new(JsonFileSink::open(config.data_dir.join("prospects"))?);

    let runner = DiscoveryRunner::new(config, searcher, fetcher, sink);

    let mut request = RunRequest::manual(args.triggered_by.clone());
    request.dry_run = args.dry_run;
    request.mode = RunMode::from_str_loose(&args.mode);
    request.intent_id = args.intent.clone();
    request.scrape = !args.no_scrape;
    request.overrides = IntentOverrides {
        countries: (!args.countries.is_empty()).then(|| args.countries.clone()),
        queries: (!args.queries.is_empty()).then(|| args.queries.clone()),
        max_companies: args.max_companies,
        max_leads: args.max_leads,
        ..Default::default()
    };

    let receipt = runner.run(request).await;

    info!(run_id = %receipt.run_id, status = %receipt.status, "Run finished");
    println!("{}", receipt.stats);

    if !receipt.success {
        std::process::exit(1);
    }
    Ok(())
}
