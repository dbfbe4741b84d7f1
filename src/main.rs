use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use tracing::info;
use url::Url;

use pricewatch::notifier::default_notifier;
use pricewatch::scraping::product_extractor::winning_strategy;
use pricewatch::scraping::{HttpPageLoader, PageLoader};
use pricewatch::stats::{domain_of, price_label, sort_items, DealScore, PriceChange, SortMode};
use pricewatch::store::TrackerStore;
use pricewatch::tools::{track_url, PriceChecker};
use pricewatch::{extract_product_data, AlertConfig, AppState, Page};

const USAGE: &str = "\
Usage: pricewatch <command>

Commands:
  extract <url>                     Extract the product price from a live page
  extract --file <path> [--url <u>] Extract from a saved HTML file
  track <url>                       Start tracking a product page
  list [--sort recent|drop|high]    Show tracked products
  remove <url>                      Stop tracking a product
  alert <url> [--target-price N] [--target-percent N]
                                    Set (or clear, with no thresholds) a drop alert
  check                             Re-check every tracked product once
  watch                             Re-check periodically until Ctrl-C";

#[derive(Debug, PartialEq)]
enum Command {
    Extract {
        url: Option<String>,
        file: Option<PathBuf>,
    },
    Track(String),
    List(SortMode),
    Remove(String),
    Alert {
        url: String,
        alert: AlertConfig,
    },
    Check,
    Watch,
    Help,
}

/// Value of `--name value` or `--name=value`.
fn flag_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    let mut iter = args.iter();
    while let Some(a) = iter.next() {
        if a == name {
            return iter.next().cloned();
        }
        if let Some(rest) = a.strip_prefix(&prefix) {
            return Some(rest.to_string());
        }
    }
    None
}

fn flag_number(args: &[String], name: &str) -> Result<Option<f64>, String> {
    match flag_value(args, name) {
        None => Ok(None),
        Some(v) => v
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite() && *n > 0.0)
            .map(Some)
            .ok_or_else(|| format!("{} expects a positive number, got '{}'", name, v)),
    }
}

/// First argument that is neither a flag nor a flag's value.
fn positional(args: &[String]) -> Option<String> {
    let mut iter = args.iter();
    while let Some(a) = iter.next() {
        if a.starts_with("--") {
            if !a.contains('=') {
                iter.next();
            }
            continue;
        }
        return Some(a.clone());
    }
    None
}

fn parse_command(args: &[String]) -> Result<Command, String> {
    let Some((name, rest)) = args.split_first() else {
        return Ok(Command::Help);
    };
    let required_url = |what: &str| positional(rest).ok_or_else(|| format!("{} needs a URL", what));

    match name.as_str() {
        "extract" => {
            let file = flag_value(rest, "--file").map(PathBuf::from);
            let url = flag_value(rest, "--url").or_else(|| positional(rest));
            if file.is_none() && url.is_none() {
                return Err("extract needs a URL or --file".to_string());
            }
            Ok(Command::Extract { url, file })
        }
        "track" => Ok(Command::Track(required_url("track")?)),
        "list" => {
            let sort = match flag_value(rest, "--sort") {
                Some(v) => SortMode::parse_str(&v).ok_or_else(|| format!("unknown sort mode '{}'", v))?,
                None => SortMode::default(),
            };
            Ok(Command::List(sort))
        }
        "remove" => Ok(Command::Remove(required_url("remove")?)),
        "alert" => Ok(Command::Alert {
            url: required_url("alert")?,
            alert: AlertConfig {
                target_price: flag_number(rest, "--target-price")?,
                target_percent: flag_number(rest, "--target-percent")?,
            },
        }),
        "check" => Ok(Command::Check),
        "watch" => Ok(Command::Watch),
        "help" | "--help" | "-h" => Ok(Command::Help),
        other => Err(format!("unknown command '{}'", other)),
    }
}

async fn run_extract(state: &AppState, url: Option<String>, file: Option<PathBuf>) -> Result<()> {
    let (html, page_url) = match file {
        Some(path) => {
            let html = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let page_url = match url {
                Some(u) => Url::parse(&u).map_err(|e| anyhow!("Invalid URL '{}': {}", u, e))?,
                None => {
                    let abs = std::fs::canonicalize(&path)?;
                    Url::from_file_path(&abs)
                        .map_err(|_| anyhow!("Cannot build a file URL for {}", abs.display()))?
                }
            };
            (html, page_url)
        }
        None => {
            let u = url.ok_or_else(|| anyhow!("extract needs a URL"))?;
            let page_url = Url::parse(&u).map_err(|e| anyhow!("Invalid URL '{}': {}", u, e))?;
            let html = HttpPageLoader::new(state.http_client.clone()).load(&u).await?;
            (html, page_url)
        }
    };

    let page = Page::parse(&html, page_url);
    match extract_product_data(&page) {
        Some(snapshot) => {
            info!("strategy: {}", winning_strategy(&page).unwrap_or("unknown"));
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        None => println!("No product price detected on {}", page.url()),
    }
    Ok(())
}

fn print_items(store: &TrackerStore, sort: SortMode) {
    if store.items().is_empty() {
        println!("No tracked items. Run `pricewatch track <url>` on a product page to get started.");
        return;
    }
    for item in sort_items(store.items(), sort) {
        let current = item
            .latest_price()
            .map(|p| price_label(p, &item.currency))
            .unwrap_or_else(|| "--".to_string());
        let deal = DealScore::from_history(&item.prices)
            .map(|d| d.as_str())
            .unwrap_or("--");
        let updated = item
            .last_updated
            .map(|d| d.format("%b %e").to_string())
            .unwrap_or_else(|| "--".to_string());
        println!(
            "{:<48} {:>16} {:>8}  deal: {:<5}  {}  {}",
            item.title,
            current,
            PriceChange::of(item).badge(),
            deal,
            updated,
            domain_of(&item.url)
        );
        if let Some(alert) = &item.alert {
            let mut parts = Vec::new();
            if let Some(p) = alert.target_price {
                parts.push(format!("≤ {}", price_label(p, &item.currency)));
            }
            if let Some(p) = alert.target_percent {
                parts.push(format!("drop ≥ {}%", p));
            }
            println!("    alert: {}", parts.join(" or "));
        }
    }
    if let Some(last) = store.last_sync() {
        println!("Last synced: {}", last.to_rfc3339());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_command(&args) {
        Ok(command) => command,
        Err(msg) => {
            eprintln!("error: {}\n\n{}", msg, USAGE);
            std::process::exit(2);
        }
    };
    if command == Command::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    let state = AppState::from_env()?;
    let store_path = state.config.resolve_store_path();
    let checker = PriceChecker::from_config(
        HttpPageLoader::new(state.http_client.clone()),
        default_notifier(),
        &state.config.checker,
    );

    match command {
        Command::Extract { url, file } => run_extract(&state, url, file).await?,
        Command::Track(url) => {
            let mut store = TrackerStore::open(&store_path)?;
            let item = track_url(&checker, &mut store, &url).await?;
            println!(
                "✓ Tracked {} at {}",
                item.title,
                item.latest_price()
                    .map(|p| price_label(p, &item.currency))
                    .unwrap_or_default()
            );
        }
        Command::List(sort) => print_items(&TrackerStore::open(&store_path)?, sort),
        Command::Remove(url) => {
            let mut store = TrackerStore::open(&store_path)?;
            if store.remove(&url) {
                store.save()?;
                println!("Item removed");
            } else {
                println!("{} is not tracked", url);
            }
        }
        Command::Alert { url, alert } => {
            let mut store = TrackerStore::open(&store_path)?;
            let cleared = alert.is_empty();
            store.update_alert(&url, alert)?;
            store.save()?;
            println!("{}", if cleared { "Alert cleared." } else { "Alert saved successfully." });
        }
        Command::Check => {
            let report = checker.check_store_at(&store_path).await?;
            println!("{}", report);
        }
        Command::Watch => {
            let shutdown = async {
                let _ = tokio::signal::ctrl_c().await;
            };
            checker
                .run_periodic(&store_path, state.config.checker.resolve_interval(), shutdown)
                .await?;
        }
        Command::Help => unreachable!("handled above"),
    }

    Ok(())
}
