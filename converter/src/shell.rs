//! Interactive session over stdin.

use fxconvert::storage;
use fxconvert::{Converter, KeyValueStore};
use fxconvert_common::is_amount_input;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::{apply_theme, catalog_code, print_currencies, render};

const HELP: &str = "\
commands:
  amount <value>      set the amount (digits and one decimal point)
  from <code>         set the source currency
  to <code>           set the target currency
  convert             convert with the live rate
  swap                swap currencies (and the result, if any)
  reset               clear the amount and result
  show                print the current state
  currencies [query]  list currencies
  theme [light|dark|toggle]
  clear-cache         force the next conversion to refetch rates
  quit";

#[derive(Debug, PartialEq)]
enum ShellCommand {
    Amount(String),
    From(String),
    To(String),
    Convert,
    Swap,
    Reset,
    Show,
    Currencies(String),
    Theme(Option<String>),
    ClearCache,
    Help,
    Quit,
}

fn parse_line(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "amount" => ShellCommand::Amount(rest.to_string()),
        "from" if !rest.is_empty() => ShellCommand::From(rest.to_string()),
        "to" if !rest.is_empty() => ShellCommand::To(rest.to_string()),
        "convert" => ShellCommand::Convert,
        "swap" => ShellCommand::Swap,
        "reset" => ShellCommand::Reset,
        "show" => ShellCommand::Show,
        "currencies" => ShellCommand::Currencies(rest.to_string()),
        "theme" => ShellCommand::Theme((!rest.is_empty()).then(|| rest.to_string())),
        "clear-cache" => ShellCommand::ClearCache,
        "help" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(format!("unknown command: {other} (try `help`)")),
    };
    Ok(Some(command))
}

/// Run until `quit` or end of input.
pub async fn run(converter: &Converter, store: &dyn KeyValueStore) -> anyhow::Result<()> {
    converter.restore_last_conversion();

    let mut updates = converter.subscribe();
    let watcher = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            debug!(?state, "State changed");
        }
    });

    println!("theme: {}", storage::load_theme(store).as_str());
    render(&converter.state());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        match command {
            ShellCommand::Amount(value) => {
                if is_amount_input(&value) {
                    converter.set_amount(value);
                } else {
                    println!("Amount may only contain digits and one decimal point");
                }
            }
            ShellCommand::From(code) => match catalog_code(&code) {
                Ok(code) => converter.set_from_currency(code),
                Err(e) => println!("{}", e),
            },
            ShellCommand::To(code) => match catalog_code(&code) {
                Ok(code) => converter.set_to_currency(code),
                Err(e) => println!("{}", e),
            },
            ShellCommand::Convert => {
                converter.convert().await;
                render(&converter.state());
            }
            ShellCommand::Swap => {
                converter.swap_currencies();
                render(&converter.state());
            }
            ShellCommand::Reset => {
                converter.reset();
                render(&converter.state());
            }
            ShellCommand::Show => render(&converter.state()),
            ShellCommand::Currencies(query) => print_currencies(&query),
            ShellCommand::Theme(value) => match apply_theme(store, value.as_deref()) {
                Ok(theme) => println!("theme: {}", theme.as_str()),
                Err(e) => println!("{}", e),
            },
            ShellCommand::ClearCache => converter.clear_cache(),
            ShellCommand::Help => println!("{}", HELP),
            ShellCommand::Quit => break,
        }
    }

    watcher.abort();
    Ok(())
}
