//! wxmon - Weather monitor for the console.
//!
//! Run with: `cargo run -p wxmon-app`

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;

use wxmon_app::{Config, Refresher, ViewState};
use wxmon_core::{OpenMeteoClient, WeatherSource};
use wxmon_store::CacheStore;
use wxmon_types::WeatherSnapshot;

/// wxmon - Weather monitor with cached snapshots and automatic refresh.
#[derive(Parser, Debug)]
#[command(name = "wxmon")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Automatic refresh interval in seconds (overrides config).
    #[arg(short, long, global = true)]
    interval: Option<u64>,

    /// Disable the automatic refresh timer.
    #[arg(long, global = true)]
    no_auto_refresh: bool,

    /// Cache file path (overrides config).
    #[arg(long, global = true)]
    cache_path: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the monitor in the foreground (default behavior).
    Run,

    /// Fetch once, print the result, and exit.
    Fetch,

    /// Inspect or clear the snapshot cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// Print the raw cached record.
    Show,

    /// Delete the cache file.
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wxmon=info".parse()?),
        )
        .init();

    let config = load_config(&args)?;
    let store = CacheStore::open(&config.cache.path);

    match args.command {
        Some(Command::Fetch) => fetch_once(store).await,
        Some(Command::Cache { action }) => handle_cache_action(store, action),
        Some(Command::Run) | None => run_monitor(config, store).await,
    }
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default().unwrap_or_default(),
    };

    // Override config with CLI args
    if let Some(interval) = args.interval {
        config.refresh.interval = interval;
    }
    if args.no_auto_refresh {
        config.refresh.auto = false;
    }
    if let Some(path) = &args.cache_path {
        config.cache.path = path.clone();
    }

    config.validate()?;
    Ok(config)
}

async fn run_monitor(config: Config, store: CacheStore) -> anyhow::Result<()> {
    let client = OpenMeteoClient::new()?;
    let refresher = Refresher::new(
        Arc::new(client),
        store,
        config.refresh.interval_duration(),
        config.refresh.auto,
    );
    let mut state_rx = refresher.subscribe();

    info!(
        interval = config.refresh.interval,
        auto = config.refresh.auto,
        "starting weather monitor"
    );
    refresher.start();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                refresher.shutdown();
                break;
            }
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = state_rx.borrow_and_update().clone();
                render(&state);
            }
        }
    }

    Ok(())
}

async fn fetch_once(store: CacheStore) -> anyhow::Result<()> {
    let client = OpenMeteoClient::new()?;
    let snapshot = client.fetch(&CancellationToken::new()).await?;

    print_snapshot(&snapshot);
    store.save(&snapshot);

    Ok(())
}

fn handle_cache_action(store: CacheStore, action: CacheAction) -> anyhow::Result<()> {
    match action {
        CacheAction::Show => match store.info() {
            Some(record) => {
                let valid = record.is_valid(time::OffsetDateTime::now_utc());
                println!("{}", serde_json::to_string_pretty(&record)?);
                println!();
                println!(
                    "cached at {}, {} (expires {})",
                    record.timestamp,
                    if valid { "valid" } else { "expired" },
                    record.expires_at
                );
            }
            None => println!("cache is empty ({})", store.path().display()),
        },
        CacheAction::Clear => {
            store.clear();
            println!("cache cleared ({})", store.path().display());
        }
    }
    Ok(())
}

fn render(state: &ViewState) {
    if state.busy {
        println!("refreshing...");
        return;
    }

    if let Some(snapshot) = &state.snapshot {
        print_snapshot(snapshot);
        if let Some(updated) = state.last_updated {
            println!("updated {updated}");
        }
    }

    if let Some(error) = &state.error {
        eprintln!("warning: {error}");
    }
}

fn print_snapshot(snapshot: &WeatherSnapshot) {
    println!("{}", snapshot.location_name);

    if let Some(current) = &snapshot.current {
        println!(
            "  now: {:.1} C (feels like {:.1} C), code {}",
            current.temperature_c, current.apparent_temperature_c, current.weather_code
        );
        println!(
            "  humidity {}%, clouds {}%, pressure {:.0} hPa",
            current.relative_humidity_pct, current.cloud_cover_pct, current.pressure_msl_hpa
        );
        println!(
            "  wind {:.1} km/h from {} deg, gusts {:.1} km/h",
            current.wind_speed_kmh, current.wind_direction_deg, current.wind_gust_kmh
        );
    }

    for day in &snapshot.daily {
        println!(
            "  {}: {:.0}..{:.0} C, {:.1} mm, gusts {:.0} km/h, code {}",
            day.date,
            day.temperature_min_c,
            day.temperature_max_c,
            day.precipitation_sum_mm,
            day.wind_gust_max_kmh,
            day.weather_code
        );
    }
}
