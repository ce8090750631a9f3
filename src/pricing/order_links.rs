use crate::config::CATALOG_PAGE;
use crate::pricing::{messages, PricingContext};
use crate::state::{Card, CatalogStore};

/// Initial order-action state for every card, once prices are known.
pub fn build_order_links(store: &CatalogStore, ctx: &PricingContext) {
    store.for_each_mut(|card| build_order_link(card, ctx));
}

/// True for hrefs that navigate to the catalog page rather than off-site.
fn links_to_catalog(href: &str) -> bool {
    href.to_ascii_lowercase().contains(CATALOG_PAGE) || href.starts_with('#')
}

pub fn build_order_link(card: &mut Card, ctx: &PricingContext) {
    let title = card.order_title();
    let grade_priced = card
        .product
        .as_ref()
        .is_some_and(|p| p.pricing.is_grade_dependent());
    let exempt = ctx.is_exempt(&card.id);
    let Some(anchor) = card.order.as_mut() else { return };

    let base_message = messages::base_order_message(ctx.lang, &title);

    if !grade_priced {
        anchor.enable();
        anchor.requires_grade = Some(false);
        anchor.href = Some(ctx.links.href(&base_message));
        anchor.message = Some(base_message);
        anchor.open_in_new_tab();
        return;
    }

    anchor.requires_grade = Some(true);
    anchor.base_message = Some(base_message.clone());
    let existing = anchor.href.clone().unwrap_or_default();

    if links_to_catalog(&existing) {
        anchor.go_to_product_page = true;
        if ctx.on_catalog_page {
            // Grade is chosen on this page; keep the in-page link.
            anchor.title = Some(messages::SELECT_GRADE_ON_PRODUCT_PAGE.to_string());
        } else {
            anchor.title = Some(messages::ORDER_VIA_WHATSAPP.to_string());
            anchor.allow_without_grade = true;
            if !anchor.href_is_whatsapp() {
                anchor.href = Some(ctx.links.href(&base_message));
                anchor.message = Some(base_message);
            }
            anchor.enable();
            anchor.open_in_new_tab();
        }
    } else if exempt {
        anchor.enable();
        anchor.allow_without_grade = true;
        if !anchor.href_is_whatsapp() {
            anchor.href = Some(ctx.links.href(&base_message));
            anchor.message = Some(base_message);
        }
        anchor.open_in_new_tab();
    } else {
        anchor.disable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::markup::CardMarkup;
    use crate::pricing::CurrencyFormatter;
    use crate::types::{FeedProduct, Lang, OrderAction, ResolvedProduct};
    use std::collections::BTreeMap;

    fn ctx(page: &str) -> PricingContext {
        let cfg = Config::for_page(reqwest::Url::parse(page).unwrap());
        PricingContext::new(&cfg, Lang::En, CurrencyFormatter::new("INR").unwrap())
    }

    fn card(id: &str, href: Option<&str>, graded: bool) -> Card {
        let mut card = Card::from_markup(&CardMarkup {
            id: Some(id.to_string()),
            title: Some("Mud Crab".to_string()),
            order: Some(OrderAction::with_href(href.map(str::to_string))),
            ..CardMarkup::default()
        })
        .unwrap();
        let product = FeedProduct {
            id: id.to_string(),
            price: if graded { None } else { Some(500.0) },
            unit: None,
            grades: graded.then(|| BTreeMap::from([("L".to_string(), Some(900.0))])),
        };
        card.product = Some(ResolvedProduct::from(&product));
        card
    }

    #[test]
    fn fixed_price_product_is_always_orderable() {
        let mut c = card("crab1", Some("#"), false);
        build_order_link(&mut c, &ctx("http://shop.test/products.html"));
        let a = c.order.unwrap();
        assert!(a.is_enabled());
        assert_eq!(a.requires_grade, Some(false));
        assert_eq!(a.target.as_deref(), Some("_blank"));
        let href = a.href.unwrap();
        assert!(href.starts_with("https://api.whatsapp.com/send?phone=918016216344&text="));
        assert!(href.contains("Mud%20Crab"));
    }

    #[test]
    fn card_without_feed_entry_is_orderable() {
        let mut c = card("crab1", None, false);
        c.product = None;
        build_order_link(&mut c, &ctx("http://shop.test/products.html"));
        assert!(c.order.unwrap().is_enabled());
    }

    #[test]
    fn graded_product_is_disabled_until_grade() {
        let mut c = card("crab2", Some("https://example.com/x"), true);
        build_order_link(&mut c, &ctx("http://shop.test/products.html"));
        let a = c.order.unwrap();
        assert!(!a.is_enabled());
        assert!(a.disabled && a.aria_disabled);
        assert_eq!(a.href, None);
        assert_eq!(a.tabindex, Some(-1));
        assert_eq!(a.requires_grade, Some(true));
        assert!(a.base_message.unwrap().contains("Mud Crab"));
    }

    #[test]
    fn exempt_product_orderable_without_grade() {
        let mut c = card("mud_crab_male", None, true);
        build_order_link(&mut c, &ctx("http://shop.test/products.html"));
        let a = c.order.unwrap();
        assert!(a.is_enabled());
        assert!(a.allow_without_grade);
        assert!(a.href_is_whatsapp());
    }

    #[test]
    fn catalog_link_off_catalog_page_goes_straight_to_whatsapp() {
        let mut c = card("crab2", Some("products.html#crab2"), true);
        build_order_link(&mut c, &ctx("http://shop.test/index.html"));
        let a = c.order.unwrap();
        assert!(a.is_enabled());
        assert!(a.allow_without_grade && a.go_to_product_page);
        assert_eq!(a.title.as_deref(), Some("Order via WhatsApp"));
        assert!(a.href_is_whatsapp());
    }

    #[test]
    fn catalog_link_on_catalog_page_keeps_navigation() {
        let mut c = card("crab2", Some("#crab2"), true);
        build_order_link(&mut c, &ctx("http://shop.test/bn/products.html"));
        let a = c.order.unwrap();
        assert_eq!(a.href.as_deref(), Some("#crab2"));
        assert!(a.go_to_product_page && !a.allow_without_grade);
        assert_eq!(a.title.as_deref(), Some("Select size/grade on the product page to order"));
    }

    #[test]
    fn existing_whatsapp_href_is_kept() {
        let mut c = card("mud_crab_female", Some("https://api.whatsapp.com/send?phone=1&text=hi"), true);
        build_order_link(&mut c, &ctx("http://shop.test/products.html"));
        assert_eq!(
            c.order.unwrap().href.as_deref(),
            Some("https://api.whatsapp.com/send?phone=1&text=hi")
        );
    }
}
