//! Interactive console for administering catalog categories and products.
//!
//! Reads one command per line from stdin and prints the page after each
//! one. Configuration comes from the environment (optionally a `.env`
//! file) and can be overridden on the command line. Logs go to stderr.

mod commands;
mod console;
mod render;
#[cfg(test)]
mod testing;

use std::io::{self, BufRead, Write};
use std::time::Duration;

use catalog_core::{CatalogApi, CategoriesPage, ClientConfig};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use console::Flow;

#[derive(Parser)]
#[command(name = "catalog-admin", about = "Manage catalog categories and products")]
struct Cli {
    /// API base URL (overrides CATALOG_API_URL).
    #[arg(long)]
    base_url: Option<String>,

    /// Request timeout in seconds (overrides CATALOG_API_TIMEOUT_SECS).
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_admin=info,catalog_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(secs) = cli.timeout_secs {
        config.timeout = Duration::from_secs(secs);
    }
    info!(base_url = %config.base_url, timeout = ?config.timeout, "starting console");

    let mut page = CategoriesPage::new(CatalogApi::from_config(&config));
    page.mount();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write!(out, "{}", render::render(&page))?;
    writeln!(out, "Type `help` for commands.")?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let command = match commands::parse(&line) {
            Ok(command) => command,
            Err(err) => {
                writeln!(out, "error: {err}")?;
                continue;
            }
        };
        match console::apply(&mut page, command) {
            Ok(Flow::Quit) => break,
            Ok(Flow::ShowHelp) => writeln!(out, "{}", commands::HELP)?,
            Ok(Flow::Continue) => write!(out, "\n{}", render::render(&page))?,
            Err(err) => writeln!(out, "error: {err}")?,
        }
        out.flush()?;
    }
    Ok(())
}
