use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info};

use crate::config::{Config, PRICE_FEED_CANDIDATES};
use crate::controllers::carousel::{CarouselCmd, Step};
use crate::controllers::{search, BannerController, CarouselInput, Carousels, Equalizer, NavController};
use crate::error::{AppError, Result};
use crate::fetcher::fetch_price_feed;
use crate::markup::PageMarkup;
use crate::pricing::grades::{apply_grade_selection, attach_grade_handlers};
use crate::pricing::loader::{render_feed, show_prices_unavailable, show_skeletons};
use crate::pricing::order_links::build_order_links;
use crate::pricing::{messages, CurrencyFormatter, PricingContext};
use crate::state::{Card, CatalogStore, FlagStorage};
use crate::types::{Lang, PriceFeed};

// ---------------------------------------------------------------------------
// Page state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PriceStatus {
    Loading,
    Loaded { products: usize },
    Unavailable,
}

/// Page-level widgets outside the product cards.
#[derive(Debug, Default)]
struct PageChrome {
    nav: Option<NavController>,
    banner: Option<BannerController>,
    query: Option<String>,
    /// The single "no results" notice in `.products`.
    notice: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PageSnapshot {
    pub lang: Lang,
    pub prices: PriceStatus,
    pub nav: Option<NavController>,
    pub banner: Option<BannerController>,
    pub query: Option<String>,
    pub notice: Option<String>,
    pub cards: Vec<Card>,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub prices: PriceStatus,
    pub cards: usize,
    pub carousels: usize,
    pub equalizer_runs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub visible: usize,
    pub notice: Option<String>,
}

/// Outcome of filtering: visible count and the notice to show, if any.
fn run_search(store: &CatalogStore, lang: Lang, has_products_section: bool, query: &str) -> SearchOutcome {
    let visible = search::filter_cards(store, query);
    let blank = query.trim().is_empty();
    let notice = (visible == 0 && !blank && has_products_section)
        .then(|| messages::no_results(lang, query));
    SearchOutcome { visible, notice }
}

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

// ---------------------------------------------------------------------------
// Storefront
// ---------------------------------------------------------------------------

/// One loaded storefront page: cards, page chrome, pricing and the running
/// carousels.
pub struct Storefront {
    cfg: Config,
    lang: Lang,
    store: Arc<CatalogStore>,
    storage: Arc<dyn FlagStorage>,
    chrome: Mutex<PageChrome>,
    pricing: RwLock<Option<PricingContext>>,
    prices: RwLock<PriceStatus>,
    equalizer: Arc<Equalizer>,
    carousels: Mutex<Carousels>,
    has_products_section: bool,
}

impl Storefront {
    /// Run the synchronous initializers: nav, banner, search and price
    /// skeletons. Each one skips itself when its markup is missing.
    pub fn new(cfg: Config, markup: PageMarkup, storage: Arc<dyn FlagStorage>) -> Arc<Self> {
        let lang = markup.lang;
        let store = CatalogStore::from_markup(&markup.cards);
        let equalizer = Equalizer::new(Arc::clone(&store));

        let nav = markup.nav.as_ref().map(NavController::from_markup);
        if nav.is_none() {
            debug!("[NAV] no toggle/link list on page, skipping");
        }

        let banner = markup
            .banner
            .as_ref()
            .map(|b| BannerController::on_load(b, storage.as_ref(), now_ms()));
        if let Some(b) = &banner {
            debug!("[BANNER] initial state {:?}", b.state);
        }

        let mut chrome = PageChrome { nav, banner, ..PageChrome::default() };
        if cfg.on_catalog_page() {
            if let Some(q) = cfg.search_query() {
                let outcome = run_search(&store, lang, markup.has_products_section, &q);
                info!("[SEARCH] {:?} matched {} cards", q, outcome.visible);
                chrome.notice = outcome.notice;
                chrome.query = Some(q);
            }
        }

        show_skeletons(&store);
        info!("[PAGE] {} cards, lang={lang}", store.len());

        Arc::new(Self {
            cfg,
            lang,
            store,
            storage,
            chrome: Mutex::new(chrome),
            pricing: RwLock::new(None),
            prices: RwLock::new(PriceStatus::Loading),
            equalizer,
            carousels: Mutex::new(Carousels::default()),
            has_products_section: markup.has_products_section,
        })
    }

    pub fn store(&self) -> &Arc<CatalogStore> {
        &self.store
    }

    /// Page-ready: start carousels, lay out, then load prices.
    pub async fn page_ready(self: &Arc<Self>, client: &reqwest::Client) {
        *self.carousels.lock().await = Carousels::start_all(self.lang, &self.store, &self.equalizer);
        self.equalizer.equalize();
        self.load_prices(client).await;
    }

    /// Fetch the feed and apply it. Any failure leaves every price region
    /// showing the unavailable message. No retry.
    pub async fn load_prices(&self, client: &reqwest::Client) {
        *self.prices.write().await = PriceStatus::Loading;
        match fetch_price_feed(client, &self.cfg.page_url, PRICE_FEED_CANDIDATES).await {
            Ok(feed) => {
                self.apply_feed(&feed).await;
            }
            Err(e) => {
                error!("[PRICES] Could not load prices: {e}");
                self.mark_prices_unavailable().await;
            }
        }
    }

    /// Render a parsed feed, then build order links and run the grade
    /// handler once per selector. Returns the number of matched cards.
    pub async fn apply_feed(&self, feed: &PriceFeed) -> usize {
        let formatter = match CurrencyFormatter::new(feed.currency()) {
            Ok(f) => f,
            Err(e) => {
                error!("[PRICES] {e}");
                self.mark_prices_unavailable().await;
                return 0;
            }
        };

        // Held across the whole render so a concurrent grade change lands
        // either before the handlers run or after the context is published.
        let mut pricing = self.pricing.write().await;
        let ctx = PricingContext::new(&self.cfg, self.lang, formatter);
        let matched = render_feed(&self.store, feed, &ctx);
        build_order_links(&self.store, &ctx);
        let graded = attach_grade_handlers(&self.store, &ctx);
        let currency = ctx.formatter.code().to_string();
        *pricing = Some(ctx);
        drop(pricing);
        *self.prices.write().await = PriceStatus::Loaded { products: feed.products().len() };

        self.equalizer.equalize();
        info!(
            %currency,
            matched,
            graded,
            "[PRICES] Prices loaded for {} products",
            feed.products().len()
        );
        matched
    }

    async fn mark_prices_unavailable(&self) {
        show_prices_unavailable(&self.store);
        *self.prices.write().await = PriceStatus::Unavailable;
    }

    // --- Card events ---

    /// Grade selector change. Before prices load only the selection is
    /// recorded; it is reflected once the feed arrives.
    pub async fn select_grade(&self, card_id: &str, grade: &str) -> Result<Card> {
        let pricing = self.pricing.read().await;
        let updated = self
            .store
            .with_card(card_id, |card| {
                let Some(select) = card.grade_select.as_mut() else {
                    return Err(AppError::BadRequest(format!("{card_id} has no grade selector")));
                };
                if !select.select(grade) {
                    return Err(AppError::BadRequest(format!("{card_id} has no grade {grade:?}")));
                }
                if let Some(ctx) = pricing.as_ref() {
                    apply_grade_selection(card, ctx);
                }
                Ok(card.clone())
            })
            .ok_or_else(|| AppError::UnknownCard(card_id.to_string()))??;
        debug!("[GRADE] {card_id} -> {grade:?}");
        Ok(updated)
    }

    /// Pointer/touch input on a card's media region.
    pub async fn carousel(&self, card_id: &str, input: CarouselInput) -> Result<()> {
        let dots = self
            .store
            .with_card(card_id, |card| card.carousel.as_ref().map(|c| c.dot_count()))
            .ok_or_else(|| AppError::UnknownCard(card_id.to_string()))?;

        if let CarouselInput::Dot { index } = input {
            if index >= dots.unwrap_or(0) {
                return Err(AppError::BadRequest(format!("{card_id} has no dot {index}")));
            }
        }
        let Some(cmd) = input.command() else {
            debug!("[CAROUSEL] {card_id}: swipe below threshold ignored");
            return Ok(());
        };

        let carousels = self.carousels.lock().await;
        match carousels.get(card_id) {
            Some(handle) => handle.send(cmd).await,
            None => {
                // Not animated (single slide, or page not ready yet): apply in place.
                if let CarouselCmd::Navigate(step) = cmd {
                    self.step_in_place(card_id, step);
                }
                Ok(())
            }
        }
    }

    fn step_in_place(&self, card_id: &str, step: Step) {
        let lang = self.lang;
        self.store.with_card(card_id, |card| {
            if let Some(carousel) = card.carousel.as_mut() {
                carousel.step(step);
                card.finish_slide_transition(lang);
            }
        });
    }

    // --- Nav events ---

    pub async fn nav_toggle(&self) -> Result<NavController> {
        self.with_nav(NavController::toggle).await
    }

    pub async fn nav_link_clicked(&self) -> Result<NavController> {
        self.with_nav(NavController::link_clicked).await
    }

    pub async fn nav_outside_click(&self) -> Result<NavController> {
        self.with_nav(|nav| nav.document_clicked(false)).await
    }

    async fn with_nav(&self, f: impl FnOnce(&mut NavController)) -> Result<NavController> {
        let mut chrome = self.chrome.lock().await;
        let nav = chrome
            .nav
            .as_mut()
            .ok_or_else(|| AppError::BadRequest("page has no navigation menu".to_string()))?;
        f(nav);
        Ok(nav.clone())
    }

    // --- Banner events ---

    pub async fn dismiss_banner(&self) -> Result<BannerController> {
        let mut chrome = self.chrome.lock().await;
        let banner = chrome
            .banner
            .as_mut()
            .ok_or_else(|| AppError::BadRequest("page has no banner".to_string()))?;
        if banner.dismiss(self.storage.as_ref(), now_ms()) {
            info!("[BANNER] dismissed");
        }
        Ok(banner.clone())
    }

    pub async fn restore_banner(&self) -> Result<BannerController> {
        let mut chrome = self.chrome.lock().await;
        let banner = chrome
            .banner
            .as_mut()
            .ok_or_else(|| AppError::BadRequest("page has no banner".to_string()))?;
        if banner.restore(self.storage.as_ref()) {
            info!("[BANNER] restored");
        }
        Ok(banner.clone())
    }

    // --- Search & layout ---

    /// Re-run the filter. A blank query shows every card.
    pub async fn search(&self, query: &str) -> SearchOutcome {
        let outcome = run_search(&self.store, self.lang, self.has_products_section, query);
        let mut chrome = self.chrome.lock().await;
        chrome.query = Some(query.trim().to_string()).filter(|q| !q.is_empty());
        chrome.notice = outcome.notice.clone();
        info!("[SEARCH] {:?} matched {} cards", query, outcome.visible);
        outcome
    }

    pub fn resize(&self) {
        self.equalizer.schedule_after_resize();
    }

    // --- Read side ---

    pub async fn snapshot(&self) -> PageSnapshot {
        let chrome = self.chrome.lock().await;
        PageSnapshot {
            lang: self.lang,
            prices: *self.prices.read().await,
            nav: chrome.nav.clone(),
            banner: chrome.banner.clone(),
            query: chrome.query.clone(),
            notice: chrome.notice.clone(),
            cards: self.store.snapshot(),
        }
    }

    pub async fn health(&self) -> HealthReport {
        HealthReport {
            status: "ok",
            prices: *self.prices.read().await,
            cards: self.store.len(),
            carousels: self.carousels.lock().await.len(),
            equalizer_runs: self.equalizer.runs(),
        }
    }

    pub async fn shutdown(&self) {
        self.carousels.lock().await.stop_all();
        info!("[PAGE] carousels stopped");
    }
}
