//! fxconvert CLI
//!
//! Command-line front end for the currency converter.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fxconvert::storage::{self, KeyValueStore};
use fxconvert::{AppConfig, ConversionState, Converter, FileStore, Theme};
use fxconvert_common::{filter, format_amount, is_amount_input, lookup};
use fxconvert_fx::RateFetcher;

mod shell;

/// Currency converter with live exchange rates
#[derive(Parser, Debug)]
#[command(name = "fxconvert")]
#[command(about = "Convert between currencies with live exchange rates")]
struct Args {
    /// Storage file (overrides FXCONVERT_STORAGE_PATH)
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert an amount once
    Convert {
        amount: String,
        from: String,
        to: String,
    },
    /// List supported currencies, optionally filtered by code or name
    Currencies { query: Option<String> },
    /// Show the last successful conversion
    Last,
    /// Show or change the theme (light, dark or toggle)
    Theme { value: Option<String> },
    /// Interactive session
    Shell,
}

/// Normalize a user-typed code and require it to be in the catalog.
pub(crate) fn catalog_code(raw: &str) -> anyhow::Result<String> {
    let code = raw.trim().to_uppercase();
    lookup(&code)
        .map(|currency| currency.code.to_string())
        .ok_or_else(|| anyhow!("Unsupported currency: {}", raw))
}

pub(crate) fn print_currencies(query: &str) {
    let matches = filter(query);
    if matches.is_empty() {
        println!("No currencies found");
        return;
    }
    for currency in matches {
        println!("{}", currency);
    }
}

pub(crate) fn render(state: &ConversionState) {
    if let Some(message) = &state.error {
        println!("Error: {}", message);
    }

    match state.converted_amount {
        Some(converted) => {
            let amount = state.amount.parse::<f64>().unwrap_or(f64::NAN);
            println!(
                "{} {} = {} {}",
                format_amount(amount, &state.from_currency),
                state.from_currency,
                format_amount(converted, &state.to_currency),
                state.to_currency
            );
            if let Some(rate) = state.exchange_rate {
                println!("1 {} = {:.4} {}", state.from_currency, rate, state.to_currency);
            }
            if let Some(updated) = state.last_updated {
                println!("Last updated: {}", updated.to_rfc2822());
            }
        }
        None => {
            println!(
                "{} -> {} (amount: {})",
                state.from_currency,
                state.to_currency,
                if state.amount.is_empty() { "-" } else { state.amount.as_str() }
            );
        }
    }
}

pub(crate) fn apply_theme(store: &dyn KeyValueStore, value: Option<&str>) -> anyhow::Result<Theme> {
    let current = storage::load_theme(store);
    let next = match value {
        None => return Ok(current),
        Some("toggle") => current.toggled(),
        Some(other) => other.parse::<Theme>().map_err(|e| anyhow!(e))?,
    };
    storage::save_theme(store, next)?;
    Ok(next)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::from_env();
    if let Some(path) = args.storage.clone() {
        config.storage_path = path;
    }

    // Initialize logging
    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
    );
    if args.json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow!("Configuration error: {}", e));
    }

    let store: Arc<dyn KeyValueStore> = Arc::new(
        FileStore::open(&config.storage_path)
            .with_context(|| format!("opening {}", config.storage_path.display()))?,
    );

    match args.command {
        Command::Currencies { query } => {
            print_currencies(query.as_deref().unwrap_or(""));
        }
        Command::Last => match storage::load_last_conversion(store.as_ref()) {
            Some(last) => println!(
                "{} {} = {} {} (rate {}, saved {})",
                last.amount,
                last.from_currency,
                format_amount(last.converted_amount, &last.to_currency),
                last.to_currency,
                last.rate,
                last.timestamp.to_rfc3339()
            ),
            None => println!("No saved conversion"),
        },
        Command::Theme { value } => {
            let theme = apply_theme(store.as_ref(), value.as_deref())?;
            println!("{}", theme.as_str());
        }
        Command::Convert { amount, from, to } => {
            if !is_amount_input(&amount) {
                bail!("Amount may only contain digits and one decimal point");
            }
            let from = catalog_code(&from)?;
            let to = catalog_code(&to)?;

            let fetcher = Arc::new(RateFetcher::from_config(config.fetcher.clone())?);
            let converter = Converter::new(fetcher, store);
            converter.set_from_currency(from);
            converter.set_to_currency(to);
            converter.set_amount(amount);
            converter.convert().await;

            let state = converter.state();
            render(&state);
            if let Some(message) = state.error {
                return Err(anyhow!(message));
            }
        }
        Command::Shell => {
            info!(storage = %config.storage_path.display(), "Starting interactive session");
            let fetcher = Arc::new(RateFetcher::from_config(config.fetcher.clone())?);
            let converter = Converter::new(fetcher, store.clone());
            shell::run(&converter, store.as_ref()).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxconvert::MemoryStore;

    #[test]
    fn test_catalog_code() {
        assert_eq!(catalog_code(" usd ").unwrap(), "USD");
        assert!(catalog_code("XYZ").is_err());
    }

    #[test]
    fn test_apply_theme() {
        let store = MemoryStore::new();
        assert_eq!(apply_theme(&store, None).unwrap(), Theme::Light);
        assert_eq!(apply_theme(&store, Some("toggle")).unwrap(), Theme::Dark);
        assert_eq!(apply_theme(&store, None).unwrap(), Theme::Dark);
        assert_eq!(apply_theme(&store, Some("light")).unwrap(), Theme::Light);
        assert!(apply_theme(&store, Some("sepia")).is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["fxconvert", "convert", "100", "usd", "eur"]);
        assert!(matches!(args.command, Command::Convert { ref amount, .. } if amount == "100"));
    }
}
