use crate::pricing::{messages, PricingContext};
use crate::state::{Card, CatalogStore};

/// Runs the grade handler once for every card with a grade selector,
/// reflecting any preselected option.
pub fn attach_grade_handlers(store: &CatalogStore, ctx: &PricingContext) -> usize {
    let mut attached = 0;
    store.for_each_mut(|card| {
        if card.grade_select.is_some() {
            apply_grade_selection(card, ctx);
            attached += 1;
        }
    });
    attached
}

/// Re-derive price text and order action from the current selection.
/// Always starts from the card's product and selection, never from the
/// previous output, so repeated calls with the same selection agree.
pub fn apply_grade_selection(card: &mut Card, ctx: &PricingContext) {
    let Some(select) = card.grade_select.as_ref() else { return };
    let grade = select.value().to_string();
    let title = card.order_title();
    let depends = messages::price_depends_on_grade(ctx.lang);

    let pricing = card.product.as_ref().map(|p| &p.pricing);
    let unit = card.product.as_ref().and_then(|p| p.unit.as_deref());
    let grade_price = pricing.and_then(|m| m.grade_price(&grade));
    let base_price = pricing.and_then(|m| m.base_price());

    if let Some(price) = card.price.as_mut() {
        match pricing {
            Some(mode) if mode.is_grade_dependent() => match grade_price {
                Some(p) => {
                    price.text = ctx.formatter.format_with_unit(p, unit);
                    price.unavailable = false;
                }
                None => price.text = depends.to_string(),
            },
            _ => match base_price {
                Some(p) if p != 0.0 => price.text = ctx.formatter.format_with_unit(p, unit),
                _ => price.text = depends.to_string(),
            },
        }
    }

    let Some(anchor) = card.order.as_mut() else { return };
    let message = messages::grade_order_message(
        ctx.lang,
        &title,
        Some(grade.as_str()).filter(|g| !g.is_empty()),
    );

    if anchor.requires_grade == Some(true) {
        let orderable = grade_price.is_some() || base_price.is_some() || anchor.allow_without_grade;
        if orderable {
            anchor.enable();
            anchor.href = Some(ctx.links.href(&message));
            anchor.message = Some(message);
            anchor.open_in_new_tab();
        } else {
            anchor.disable();
            anchor.message = None;
        }
    } else {
        anchor.href = Some(ctx.links.href(&message));
        anchor.message = Some(message);
        anchor.open_in_new_tab();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::markup::CardMarkup;
    use crate::pricing::order_links::build_order_link;
    use crate::pricing::CurrencyFormatter;
    use crate::types::{FeedProduct, GradeOption, GradeSelector, Lang, OrderAction, ResolvedProduct};
    use std::collections::BTreeMap;

    fn ctx(lang: Lang) -> PricingContext {
        let cfg = Config::for_page(reqwest::Url::parse("http://shop.test/products.html").unwrap());
        PricingContext::new(&cfg, lang, CurrencyFormatter::new("INR").unwrap())
    }

    fn selector() -> GradeSelector {
        GradeSelector {
            options: vec![
                GradeOption { value: String::new(), label: "Select size".into() },
                GradeOption { value: "L".into(), label: "Large (800g+)".into() },
                GradeOption { value: "XL".into(), label: "Jumbo".into() },
            ],
            selected: None,
        }
    }

    fn graded_card(id: &str, base: Option<f64>) -> Card {
        let mut card = Card::from_markup(&CardMarkup {
            id: Some(id.to_string()),
            title: Some("Mud Crab".into()),
            has_price: true,
            order: Some(OrderAction::with_href(None)),
            grade_select: Some(selector()),
            ..CardMarkup::default()
        })
        .unwrap();
        card.product = Some(ResolvedProduct::from(&FeedProduct {
            id: id.to_string(),
            price: base,
            unit: Some("/kg".into()),
            grades: Some(BTreeMap::from([("L".to_string(), Some(900.0)), ("XL".to_string(), None)])),
        }));
        card
    }

    fn select(card: &mut Card, value: &str) {
        assert!(card.grade_select.as_mut().unwrap().select(value));
    }

    #[test]
    fn order_disabled_until_priced_grade_selected() {
        let ctx = ctx(Lang::En);
        let mut card = graded_card("crab2", None);
        build_order_link(&mut card, &ctx);
        apply_grade_selection(&mut card, &ctx);
        assert!(!card.order.as_ref().unwrap().is_enabled());
        assert_eq!(card.price.as_ref().unwrap().text, "Price depends on grade");

        select(&mut card, "L");
        apply_grade_selection(&mut card, &ctx);
        assert_eq!(card.price.as_ref().unwrap().text, "₹900 /kg");
        let anchor = card.order.as_ref().unwrap();
        assert!(anchor.is_enabled());
        assert!(anchor.message.as_ref().unwrap().contains("— Size: L"));

        // Listed but unpriced grade reverts.
        select(&mut card, "XL");
        apply_grade_selection(&mut card, &ctx);
        assert_eq!(card.price.as_ref().unwrap().text, "Price depends on grade");
        assert!(!card.order.as_ref().unwrap().is_enabled());
    }

    #[test]
    fn base_price_keeps_order_enabled() {
        let ctx = ctx(Lang::En);
        let mut card = graded_card("crab3", Some(700.0));
        build_order_link(&mut card, &ctx);
        apply_grade_selection(&mut card, &ctx);
        assert!(card.order.as_ref().unwrap().is_enabled());
        assert_eq!(card.price.as_ref().unwrap().text, "Price depends on grade");
    }

    #[test]
    fn exempt_card_stays_enabled_without_grade() {
        let ctx = ctx(Lang::En);
        let mut card = graded_card("mud_crab_male", None);
        build_order_link(&mut card, &ctx);
        apply_grade_selection(&mut card, &ctx);
        let anchor = card.order.as_ref().unwrap();
        assert!(anchor.is_enabled());
        assert_eq!(
            anchor.message.as_deref(),
            Some("Hello, I would like to order Mud Crab. Please share today's price and availability.")
        );
    }

    #[test]
    fn reapplying_same_selection_is_idempotent() {
        let ctx = ctx(Lang::Bn);
        let mut card = graded_card("crab2", None);
        build_order_link(&mut card, &ctx);
        select(&mut card, "L");
        apply_grade_selection(&mut card, &ctx);
        let first = card.clone();
        apply_grade_selection(&mut card, &ctx);
        apply_grade_selection(&mut card, &ctx);
        assert_eq!(card.price, first.price);
        assert_eq!(card.order, first.order);
        assert!(card.order.unwrap().message.unwrap().contains("সাইজ: L"));
    }

    #[test]
    fn fixed_product_with_selector_shows_base_price() {
        let ctx = ctx(Lang::En);
        let mut card = graded_card("prawn", None);
        card.product = Some(ResolvedProduct::from(&FeedProduct {
            id: "prawn".into(),
            price: Some(650.0),
            unit: None,
            grades: None,
        }));
        build_order_link(&mut card, &ctx);
        select(&mut card, "L");
        apply_grade_selection(&mut card, &ctx);
        assert_eq!(card.price.as_ref().unwrap().text, "₹650");
        let anchor = card.order.as_ref().unwrap();
        assert!(anchor.is_enabled());
        assert!(anchor.message.as_ref().unwrap().contains("— Size: L"));
    }
}
