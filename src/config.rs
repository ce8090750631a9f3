use crate::error::{AppError, Result};

pub const PAGE_URL: &str = "http://localhost:8080/products.html";
pub const WHATSAPP_URL: &str = "https://api.whatsapp.com";
pub const ORDER_PHONE: &str = "918016216344";

/// Relative locations tried, in order, for the price feed. Pages nested in
/// language folders (`bn/products.html`) resolve the later candidates.
pub const PRICE_FEED_CANDIDATES: &[&str] = &["prices.json", "../prices.json", "../../prices.json"];

/// Currency used when the feed omits one.
pub const DEFAULT_CURRENCY: &str = "INR";

/// Products with grade pricing that may still be ordered without picking a grade.
pub const EXEMPT_PRODUCTS: &[&str] = &["mud_crab_male", "mud_crab_female"];

/// Page that hosts the grade selectors.
pub const CATALOG_PAGE: &str = "products.html";

/// Storage key holding the banner dismissal timestamp (ms since epoch).
pub const BANNER_STORAGE_KEY: &str = "tch_trust_hidden";

/// A dismissed banner comes back after this long.
pub const BANNER_EXPIRY_MS: u64 = 24 * 60 * 60 * 1000;

/// Carousel auto-advance period.
pub const CAROUSEL_AUTO_MS: u64 = 7000;

/// Fade-out time before the carousel swaps the image source.
pub const CAROUSEL_FADE_MS: u64 = 250;

/// Minimum horizontal touch displacement (px) that counts as a swipe.
pub const SWIPE_THRESHOLD_PX: f64 = 40.0;

/// Debounce windows for the card height equalizer.
pub const EQUALIZE_RESIZE_DEBOUNCE_MS: u64 = 120;
pub const EQUALIZE_SWITCH_DEBOUNCE_MS: u64 = 80;

/// Timeout for page and feed requests (seconds).
pub const HTTP_TIMEOUT_SECS: u64 = 15;

/// Carousel command channel capacity.
pub const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct Config {
    /// Absolute URL of the storefront page (STOREFRONT_PAGE_URL). Feed
    /// candidates are resolved against it and `q` is read from it.
    pub page_url: reqwest::Url,
    /// Read markup from disk instead of fetching `page_url` (STOREFRONT_PAGE_FILE).
    pub page_file: Option<String>,
    pub whatsapp_url: String,
    pub order_phone: String,
    /// Grade-priced products orderable without a grade (EXEMPT_PRODUCTS, comma-separated).
    pub exempt_products: Vec<String>,
    /// JSON file backing the client flag store (STORAGE_PATH).
    pub storage_path: String,
    pub log_level: String,
    pub api_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let page_url = std::env::var("STOREFRONT_PAGE_URL").unwrap_or_else(|_| PAGE_URL.to_string());
        let page_url = reqwest::Url::parse(&page_url).map_err(|e| {
            AppError::Config(format!("STOREFRONT_PAGE_URL must be an absolute URL: {e}"))
        })?;

        let exempt_products = match std::env::var("EXEMPT_PRODUCTS") {
            Ok(list) => list
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => EXEMPT_PRODUCTS.iter().map(|s| s.to_string()).collect(),
        };

        Ok(Self {
            page_url,
            page_file: std::env::var("STOREFRONT_PAGE_FILE").ok().filter(|s| !s.is_empty()),
            whatsapp_url: std::env::var("WHATSAPP_URL").unwrap_or_else(|_| WHATSAPP_URL.to_string()),
            order_phone: std::env::var("ORDER_PHONE").unwrap_or_else(|_| ORDER_PHONE.to_string()),
            exempt_products,
            storage_path: std::env::var("STORAGE_PATH")
                .unwrap_or_else(|_| "storefront-storage.json".to_string()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
        })
    }

    /// Config for a page at `page_url` with every other setting at its default.
    pub fn for_page(page_url: reqwest::Url) -> Self {
        Self {
            page_url,
            page_file: None,
            whatsapp_url: WHATSAPP_URL.to_string(),
            order_phone: ORDER_PHONE.to_string(),
            exempt_products: EXEMPT_PRODUCTS.iter().map(|s| s.to_string()).collect(),
            storage_path: "storefront-storage.json".to_string(),
            log_level: "info".to_string(),
            api_port: 3000,
        }
    }

    /// Path component of the page URL, used for page-specific behavior.
    pub fn page_path(&self) -> &str {
        self.page_url.path()
    }

    /// True when the current page is the catalog page that hosts grade selectors.
    pub fn on_catalog_page(&self) -> bool {
        self.page_path().to_ascii_lowercase().contains(CATALOG_PAGE)
    }

    /// Value of the `q` query parameter, if present and non-empty.
    pub fn search_query(&self) -> Option<String> {
        self.page_url
            .query_pairs()
            .find(|(k, _)| k == "q")
            .map(|(_, v)| v.into_owned())
            .filter(|v| !v.is_empty())
    }
}
