use anyhow::Result;
use clap::Parser;
use core_logic::{setup_logger, MetricsCollector, ProxyManager, WalletManager, Worker, WorkerRunner};
use dotenv::dotenv;
use indicatif::{ProgressBar, ProgressStyle};
use nu_ansi_term::Color;
use ronin_checker::api::{ApiClient, WalletApi};
use ronin_checker::config::CheckerConfig;
use ronin_checker::inspector::AddressInspector;
use ronin_checker::price_cache::PriceCache;
use ronin_checker::results::{fmt_usd, ResultsManager};
use ronin_checker::worker::CheckerWorker;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config.toml")]
    config: String,
    /// Override the addresses file from the config
    #[arg(short, long)]
    addresses: Option<String>,
    /// Override the proxy file from the config
    #[arg(short, long)]
    proxies: Option<String>,
    /// Override the worker count from the config
    #[arg(long)]
    concurrency: Option<usize>,
    /// Write a JSON metrics snapshot here after the run
    #[arg(long)]
    export_metrics: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let args = Args::parse();
    let mut config = match CheckerConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config {}: {:#}", args.config, e);
            return Err(e);
        }
    };

    if let Some(addresses) = args.addresses {
        config.addresses_file = addresses;
    }
    if let Some(proxies) = args.proxies {
        config.proxies_file = proxies;
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }

    let _log_guards = setup_logger(&config.logs_dir);
    info!("Configuration loaded for chain ID: {}", config.chain_id);

    println!("Loading addresses and private keys...");
    let entries = match WalletManager::load_entries(&config.addresses_file) {
        Ok(entries) => entries,
        Err(e) => {
            error!("Failed to load input: {:#}", e);
            eprintln!("Failed to load input: {:#}", e);
            return Err(e);
        }
    };
    let with_keys = entries.iter().filter(|e| e.private_key.is_some()).count();
    println!(
        "Loaded {} entries, {} of them private keys.",
        entries.len(),
        with_keys
    );

    let proxies = Arc::new(ProxyManager::load(&config.proxies_file)?);
    if proxies.is_empty() {
        eprintln!(
            "Warning: no proxies loaded from {}; every API call will fail",
            config.proxies_file
        );
    } else {
        info!("Loaded {} proxies for rotation.", proxies.len());
    }

    let results = match ResultsManager::create(&config.results_dir, entries.len()) {
        Ok(results) => Arc::new(results),
        Err(e) => {
            error!("Failed to set up results sink: {:#}", e);
            eprintln!("Failed to set up results sink: {:#}", e);
            return Err(e);
        }
    };

    let metrics = Arc::new(MetricsCollector::default());
    let api: Arc<dyn WalletApi> = Arc::new(ApiClient::new(
        &config,
        proxies.clone(),
        metrics.clone(),
    ));
    let prices = Arc::new(PriceCache::new(Duration::from_secs(config.price_ttl_secs)));
    let inspector = Arc::new(AddressInspector::new(api, prices, &config));

    let entries = Arc::new(entries);
    let worker_count = config.concurrency.min(entries.len()).max(1);

    let progress = ProgressBar::new(entries.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("Progress [{bar:40}] {percent}% | {pos}/{len} | {msg}")?
            .progress_chars("█░"),
    );
    progress.set_message("Axies: 0 | Total: 0.00$");

    let workers: Vec<Box<dyn Worker>> = (0..worker_count)
        .map(|k| {
            Box::new(CheckerWorker::new(
                k,
                worker_count,
                entries.clone(),
                inspector.clone(),
                results.clone(),
                metrics.clone(),
                progress.clone(),
            )) as Box<dyn Worker>
        })
        .collect();

    let stats = WorkerRunner::run_workers(workers).await?;
    progress.finish();

    let totals = results.totals().await;
    info!("Run metrics: {}", metrics.to_compact_json());

    if let Some(path) = &args.export_metrics {
        if let Err(e) = metrics.export_to_file(path).await {
            error!("Failed to export metrics to {}: {}", path, e);
        }
    }

    println!("\nDone! Checked {} addresses.", stats.processed);
    println!(
        "Total Axies found: {}",
        Color::LightGreen.bold().paint(totals.total_axies.to_string())
    );
    println!(
        "Total value: {}",
        Color::LightGreen
            .bold()
            .paint(format!("{}$", fmt_usd(totals.total_usd_value)))
    );
    println!("Results saved to: {}", results.path().display());

    Ok(())
}
