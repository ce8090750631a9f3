use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, PRAGMA};
use tracing::{debug, info, warn};

use crate::config::{Config, HTTP_TIMEOUT_SECS};
use crate::error::{AppError, Result};
use crate::types::PriceFeed;

pub fn build_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()?)
}

/// Storefront page markup, from `STOREFRONT_PAGE_FILE` if set, else fetched
/// from the page URL.
pub async fn fetch_page_markup(client: &reqwest::Client, cfg: &Config) -> Result<String> {
    if let Some(path) = &cfg.page_file {
        info!("[PAGE] reading markup from {path}");
        return Ok(tokio::fs::read_to_string(path).await?);
    }
    info!("[PAGE] fetching markup from {}", cfg.page_url);
    let resp = client.get(cfg.page_url.clone()).send().await?.error_for_status()?;
    Ok(resp.text().await?)
}

/// Fetch the price feed from the first candidate path (relative to
/// `page_url`) that answers with a success status. Later candidates are not
/// tried once one succeeds. Requests bypass caches.
pub async fn fetch_price_feed(
    client: &reqwest::Client,
    page_url: &reqwest::Url,
    candidates: &[&str],
) -> Result<PriceFeed> {
    for candidate in candidates {
        let url = match page_url.join(candidate) {
            Ok(u) => u,
            Err(e) => {
                warn!("[PRICES] bad candidate path {candidate:?}: {e}");
                continue;
            }
        };

        let attempt = client
            .get(url.clone())
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await;

        match attempt {
            Ok(resp) if resp.status().is_success() => {
                debug!("[PRICES] feed found at {url}");
                let body = resp.bytes().await?;
                return Ok(serde_json::from_slice::<PriceFeed>(&body)?);
            }
            Ok(resp) => debug!("[PRICES] {url} answered {}", resp.status()),
            Err(e) => debug!("[PRICES] {url} failed: {e}"),
        }
    }

    Err(AppError::FeedUnavailable(
        "no candidate path returned a price feed".to_string(),
    ))
}
