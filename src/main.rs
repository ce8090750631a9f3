mod api;
mod config;
mod controllers;
mod error;
mod fetcher;
mod markup;
mod pricing;
mod state;
mod storefront;
mod types;

use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::routes::router;
use crate::config::Config;
use crate::error::Result;
use crate::fetcher::{build_client, fetch_page_markup};
use crate::markup::parse_page;
use crate::state::JsonFileStorage;
use crate::storefront::Storefront;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    let client = build_client()?;

    // --- Page markup ---
    let html = fetch_page_markup(&client, &cfg).await?;
    let markup = parse_page(&html)?;
    info!(
        "[PAGE] {} product cards parsed from {} (lang={})",
        markup.cards.len(),
        cfg.page_url,
        markup.lang,
    );
    if !markup.has_products_section {
        warn!("[PAGE] no .products section, search results notice disabled");
    }

    // --- Flag storage ---
    let storage = Arc::new(JsonFileStorage::new(&cfg.storage_path));
    info!("[STORAGE] flags persisted at {}", cfg.storage_path);

    // --- Page-ready: initializers, carousels, prices ---
    let api_port = cfg.api_port;
    let storefront = Storefront::new(cfg, markup, storage);
    storefront.page_ready(&client).await;

    // HTTP API server
    let app = router(Arc::clone(&storefront));
    let bind_addr = format!("0.0.0.0:{api_port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("ctrl-c handler failed: {e}");
            }
        })
        .await?;

    storefront.shutdown().await;
    Ok(())
}
