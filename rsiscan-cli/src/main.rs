//! RSIScan CLI: scan the watch-list and print or deliver the signal table.
//!
//! Commands:
//! - `scan`: load closes, classify every symbol, print the table (or JSON)
//! - `config init`: write the default configuration as TOML
//! - `config show`: print the effective configuration

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use rsiscan_core::data::{CsvDirProvider, PriceProvider, YahooProvider};
use rsiscan_runner::{
    build_payload, deliver, load_watchlist, payload_json, render_table, scan, LoadOptions,
    Palette, ScanConfig, WebhookNotifier,
};

#[derive(Parser)]
#[command(
    name = "rsiscan",
    about = "RSIScan CLI: RSI signals with per-symbol buy limits and an MA120 trend gate"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the watch-list and print the signal table.
    Scan {
        /// Path to a TOML config file. Defaults to the built-in watch-list.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Symbols to scan instead of the configured watch-list.
        symbols: Vec<String>,

        /// Read `<SYMBOL>.csv` files from this directory instead of Yahoo Finance.
        #[arg(long)]
        csv_dir: Option<PathBuf>,

        /// Offline mode: no network access.
        #[arg(long, default_value_t = false)]
        offline: bool,

        /// Use synthetic data when a symbol cannot be loaded.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Last day of history (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Print the JSON payload instead of the table.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Disable ANSI colours (also implied when stdout is not a terminal).
        #[arg(long, default_value_t = false)]
        no_color: bool,

        /// Post the plain table to the configured webhook.
        #[arg(long, default_value_t = false)]
        notify: bool,

        /// Webhook URL; overrides config and RSISCAN_WEBHOOK_URL.
        #[arg(long)]
        webhook: Option<String>,
    },
    /// Configuration commands.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default configuration to a file.
    Init {
        /// Destination path.
        #[arg(long, default_value = "rsiscan.toml")]
        path: PathBuf,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Print the effective configuration (defaults merged with the file).
    Show {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            config,
            symbols,
            csv_dir,
            offline,
            synthetic,
            end,
            json,
            no_color,
            notify,
            webhook,
        } => run_scan(ScanArgs {
            config,
            symbols,
            csv_dir,
            offline,
            synthetic,
            end,
            json,
            no_color,
            notify,
            webhook,
        }),
        Commands::Config { action } => match action {
            ConfigAction::Init { path, force } => run_config_init(&path, force),
            ConfigAction::Show { config } => run_config_show(config.as_deref()),
        },
    }
}

struct ScanArgs {
    config: Option<PathBuf>,
    symbols: Vec<String>,
    csv_dir: Option<PathBuf>,
    offline: bool,
    synthetic: bool,
    end: Option<String>,
    json: bool,
    no_color: bool,
    notify: bool,
    webhook: Option<String>,
}

fn load_config(path: Option<&Path>) -> Result<ScanConfig> {
    match path {
        Some(path) => ScanConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => {
            let mut config = ScanConfig::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }
}

fn run_scan(args: ScanArgs) -> Result<()> {
    let started = Instant::now();

    let mut config = load_config(args.config.as_deref())?;
    if !args.symbols.is_empty() {
        config.watchlist = args.symbols.iter().map(|s| s.to_uppercase()).collect();
    }
    if let Some(url) = args.webhook {
        config.notify.webhook_url = Some(url);
    }
    config.validate()?;

    if args.offline && args.csv_dir.is_none() && !args.synthetic {
        bail!("--offline needs --csv-dir or --synthetic");
    }

    let end = args
        .end
        .as_deref()
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("--end must be YYYY-MM-DD")?
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let provider: Option<Box<dyn PriceProvider>> = match args.csv_dir {
        Some(dir) => Some(Box::new(CsvDirProvider::new(dir))),
        None if args.offline => None,
        None => Some(Box::new(YahooProvider::new()?)),
    };

    let opts = LoadOptions::lookback(end, config.data.lookback_days, args.synthetic)?;
    let loaded = load_watchlist(&config.watchlist, provider.as_deref(), &opts);
    let report = scan(&loaded, &config);
    let executed_at = chrono::Local::now().naive_local();

    if args.json {
        let payload = build_payload(&report, &config, executed_at)?;
        println!("{}", payload_json(&payload)?);
    } else {
        let palette = if args.no_color || !std::io::stdout().is_terminal() {
            Palette::Plain
        } else {
            Palette::Ansi
        };
        print!("{}", render_table(&report, &config, palette, executed_at));
    }

    if args.notify {
        let Some(url) = config.notify.webhook_url.as_deref() else {
            bail!("--notify needs a webhook url (config, RSISCAN_WEBHOOK_URL or --webhook)");
        };
        let text = render_table(&report, &config, Palette::Plain, executed_at);
        let notifier = WebhookNotifier::new(url)?;
        let sent = deliver(&notifier, &text, config.notify.max_message_len)?;
        tracing::info!(chunks = sent, "report delivered to webhook");
    }

    tracing::info!(elapsed_ms = started.elapsed().as_millis() as u64, "done");
    Ok(())
}

fn run_config_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let text = ScanConfig::default().to_toml()?;
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

fn run_config_show(path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;
    print!("{}", config.to_toml()?);
    Ok(())
}
