use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wallet_holdings::cache::{JsonFilePriceCache, PriceCache};
use wallet_holdings::clock::{Clock, SystemClock};
use wallet_holdings::config::{default_config_path, ResolvedConfig};
use wallet_holdings::duration::parse_duration;
use wallet_holdings::holdings::{HoldingsRequest, HoldingsService};
use wallet_holdings::models::NetworkMode;
use wallet_holdings::prices::ReferencePriceService;

const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Parser)]
#[command(name = "wallet-holdings")]
#[command(about = "Wallet holdings with USD values and dust filtering")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_COMMIT_HASH"), ")"))]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the reference price TTL (e.g. "30s", "5m")
    #[arg(long, global = true, value_parser = parse_duration)]
    price_ttl: Option<Duration>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Enrich and filter a wallet's balances, printing the view as JSON
    Show {
        /// JSON holdings request; "-" reads stdin
        #[arg(default_value = "-")]
        request: PathBuf,

        /// Treat the wallet as living on the legacy network
        #[arg(long)]
        classic: bool,

        /// Keep low-value coins
        #[arg(long)]
        show_all: bool,

        /// Keep low-value IBC and CW20 tokens
        #[arg(long)]
        show_all_tokens: bool,

        /// Skip remote prices and use only what is cached
        #[arg(long)]
        no_prices: bool,
    },
    /// Resolve and print the reference prices and FX table
    Prices {
        /// Print cached prices without network access
        #[arg(long)]
        cached: bool,
    },
    /// Show current configuration
    Config,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true).json())
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .init();
    }
}

fn read_request(path: &Path) -> Result<HoldingsRequest> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read holdings request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read holdings request: {}", path.display()))?
    };

    serde_json::from_str(&content).context("Failed to parse holdings request")
}

fn render_json<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", render_json(value)?);
    Ok(())
}

/// Cache, clock and HTTP client shared by the commands that resolve prices.
struct Runtime {
    cache: Arc<dyn PriceCache>,
    clock: Arc<dyn Clock>,
    client: reqwest::Client,
}

impl Runtime {
    fn new(config: &ResolvedConfig) -> Result<Self> {
        let file_cache = JsonFilePriceCache::new(&config.cache_path);
        debug!(path = %file_cache.path().display(), "using price cache");
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("wallet-holdings/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            cache: Arc::new(file_cache),
            clock: Arc::new(SystemClock),
            client,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config_path = cli.config.unwrap_or_else(default_config_path);
    let mut config = ResolvedConfig::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config: {}", config_path.display()))?;

    if let Some(price_ttl) = cli.price_ttl {
        config.refresh.price_ttl = price_ttl;
    }

    match cli.command {
        Command::Config => {
            // stdout carries only the JSON document.
            eprintln!("Config file: {}", config_path.display());
            print_json(&config)
        }
        Command::Show {
            request,
            classic,
            show_all,
            show_all_tokens,
            no_prices,
        } => {
            let mut request = read_request(&request)?;
            if classic {
                request.mode = NetworkMode::Classic;
            }
            request.show_low_value_coins |= show_all;
            request.show_low_value_tokens |= show_all_tokens;
            if no_prices {
                request.prices_enabled = false;
            }

            let rt = Runtime::new(&config)?;
            let service = HoldingsService::from_config(&config, rt.cache, rt.clock, rt.client);
            print_json(&service.build(&request).await)
        }
        Command::Prices { cached } => {
            let rt = Runtime::new(&config)?;
            let service = ReferencePriceService::from_config(&config, rt.cache, rt.clock, rt.client);
            let prices = if cached {
                service.cached()
            } else {
                service.resolve().await
            };
            print_json(&prices)
        }
    }
}
