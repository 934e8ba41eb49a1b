use std::{io::Read, sync::Arc};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app;
mod cli;
mod config;
mod eid;
mod metadata;
mod previews;
mod scrape;
mod storage;
mod submissions;
#[cfg(test)]
mod tests;
mod web;

use config::Config;
use storage::SqliteStore;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = cli::Args::parse();

    let mut config = Config::load_with(&args.config_dir)?;

    match args.command {
        cli::Command::Daemon { bind } => {
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }

            let store = Arc::new(SqliteStore::open(&config.database_url)?);
            web::start_daemon(config, store)?;

            log::info!("store closed");
            Ok(())
        }

        cli::Command::Fetch { url } => {
            let client = scrape::client()?;
            let result = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?
                .block_on(scrape::fetch_page(&client, &url));

            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }

        cli::Command::Extract { file } => {
            let raw_html_content = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {path}"))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("failed to read stdin")?;
                    buf
                }
            };

            let extractor = metadata::extractor_for(config.extractor);
            let meta = extractor.extract(&raw_html_content);

            println!("{}", serde_json::to_string_pretty(&meta)?);
            Ok(())
        }
    }
}
