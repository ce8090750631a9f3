pub mod format;
pub mod grades;
pub mod loader;
pub mod messages;
pub mod order_links;

pub use format::CurrencyFormatter;
pub use messages::OrderLinks;

use crate::config::Config;
use crate::types::Lang;

/// Everything the price renderers need once a feed has been accepted.
#[derive(Debug, Clone)]
pub struct PricingContext {
    pub lang: Lang,
    pub formatter: CurrencyFormatter,
    pub links: OrderLinks,
    /// Current page is the catalog page hosting the grade selectors.
    pub on_catalog_page: bool,
    pub exempt_products: Vec<String>,
}

impl PricingContext {
    pub fn new(cfg: &Config, lang: Lang, formatter: CurrencyFormatter) -> Self {
        Self {
            lang,
            formatter,
            links: OrderLinks::new(&cfg.whatsapp_url, &cfg.order_phone),
            on_catalog_page: cfg.on_catalog_page(),
            exempt_products: cfg.exempt_products.clone(),
        }
    }

    pub fn is_exempt(&self, product_id: &str) -> bool {
        self.exempt_products.iter().any(|p| p == product_id)
    }
}
