use std::collections::HashSet;

use tracing::warn;

use crate::pricing::{messages, PricingContext};
use crate::state::CatalogStore;
use crate::types::{PriceFeed, PricingMode, ResolvedProduct};

/// Placeholder state shown while the feed is in flight.
pub fn show_skeletons(store: &CatalogStore) {
    store.for_each_mut(|card| {
        if let Some(price) = card.price.as_mut() {
            price.unavailable = false;
            price.skeleton = true;
            price.text.clear();
        }
    });
}

/// Fixed fallback on every price region when the feed cannot be used.
pub fn show_prices_unavailable(store: &CatalogStore) {
    store.for_each_mut(|card| {
        if let Some(price) = card.price.as_mut() {
            price.skeleton = false;
            price.text = messages::PRICE_UNAVAILABLE.to_string();
            price.unavailable = true;
        }
    });
}

/// Attach each feed product to its card and render the initial price text.
/// Returns how many cards were matched. Cards with no feed entry keep their
/// skeleton.
pub fn render_feed(store: &CatalogStore, feed: &PriceFeed, ctx: &PricingContext) -> usize {
    let mut seen = HashSet::new();
    let mut matched = 0;

    for product in feed.products() {
        if !seen.insert(product.id.as_str()) {
            warn!("[PRICES] duplicate product id {:?} in feed, keeping the first", product.id);
            continue;
        }
        let resolved = ResolvedProduct::from(product);
        let hit = store.with_card(&product.id, |card| {
            if let Some(price) = card.price.as_mut() {
                price.skeleton = false;
                match &resolved.pricing {
                    PricingMode::GradeDependent { .. } => {
                        price.text = messages::price_depends_on_grade(ctx.lang).to_string();
                        price.unavailable = false;
                    }
                    PricingMode::Unavailable => {
                        price.text = messages::PRICE_UNAVAILABLE.to_string();
                        price.unavailable = true;
                    }
                    PricingMode::Fixed { amount } => {
                        price.text = ctx
                            .formatter
                            .format_with_unit(*amount, resolved.unit.as_deref());
                    }
                }
            }
            card.product = Some(resolved.clone());
        });
        if hit.is_some() {
            matched += 1;
        }
    }
    matched
}
