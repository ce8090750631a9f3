use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_CURRENCY;

// ---------------------------------------------------------------------------
// Price feed (prices.json)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceFeed {
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub products: Option<Vec<FeedProduct>>,
}

impl PriceFeed {
    /// Declared currency, `INR` when missing, null or empty.
    pub fn currency(&self) -> &str {
        match self.currency.as_deref() {
            Some(c) if !c.is_empty() => c,
            _ => DEFAULT_CURRENCY,
        }
    }

    pub fn products(&self) -> &[FeedProduct] {
        self.products.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedProduct {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    /// grade label → price. A null price means the grade is listed but not priced.
    #[serde(default)]
    pub grades: Option<BTreeMap<String, Option<f64>>>,
}

// ---------------------------------------------------------------------------
// Pricing mode
// ---------------------------------------------------------------------------

/// How a product is priced, resolved once from its feed entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PricingMode {
    Fixed { amount: f64 },
    /// `grades` only holds priced grades; `base` is the product-level price, if any.
    GradeDependent {
        grades: BTreeMap<String, f64>,
        base: Option<f64>,
    },
    Unavailable,
}

impl PricingMode {
    pub fn of(product: &FeedProduct) -> Self {
        match (&product.grades, product.price) {
            (Some(grades), base) => PricingMode::GradeDependent {
                grades: grades
                    .iter()
                    .filter_map(|(label, price)| price.map(|p| (label.clone(), p)))
                    .collect(),
                base,
            },
            (None, Some(amount)) => PricingMode::Fixed { amount },
            (None, None) => PricingMode::Unavailable,
        }
    }

    pub fn is_grade_dependent(&self) -> bool {
        matches!(self, PricingMode::GradeDependent { .. })
    }

    /// Price for `grade`, if this product is grade-priced and the grade is priced.
    pub fn grade_price(&self, grade: &str) -> Option<f64> {
        match self {
            PricingMode::GradeDependent { grades, .. } if !grade.is_empty() => {
                grades.get(grade).copied()
            }
            _ => None,
        }
    }

    /// Product-level price regardless of grades.
    pub fn base_price(&self) -> Option<f64> {
        match self {
            PricingMode::Fixed { amount } => Some(*amount),
            PricingMode::GradeDependent { base, .. } => *base,
            PricingMode::Unavailable => None,
        }
    }
}

/// Feed entry attached to a card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedProduct {
    pub id: String,
    pub unit: Option<String>,
    pub pricing: PricingMode,
}

impl From<&FeedProduct> for ResolvedProduct {
    fn from(p: &FeedProduct) -> Self {
        Self {
            id: p.id.clone(),
            unit: p.unit.clone().filter(|u| !u.is_empty()),
            pricing: PricingMode::of(p),
        }
    }
}

// ---------------------------------------------------------------------------
// Page language
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    En,
    Bn,
}

impl Lang {
    /// From an `<html lang>` tag. Anything not starting with `bn` is English.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some(t) if t.starts_with("bn") => Lang::Bn,
            _ => Lang::En,
        }
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lang::En => write!(f, "en"),
            Lang::Bn => write!(f, "bn"),
        }
    }
}

// ---------------------------------------------------------------------------
// Card regions
// ---------------------------------------------------------------------------

/// The `.price` element of a card.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceRegion {
    pub text: String,
    pub skeleton: bool,
    pub unavailable: bool,
}

/// The order anchor of a card and the data attributes the pricing logic keeps on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrderAction {
    pub href: Option<String>,
    pub title: Option<String>,
    pub target: Option<String>,
    pub rel: Option<String>,
    /// `disabled` class
    pub disabled: bool,
    pub aria_disabled: bool,
    pub tabindex: Option<i32>,
    pub requires_grade: Option<bool>,
    pub base_message: Option<String>,
    pub allow_without_grade: bool,
    pub go_to_product_page: bool,
    /// Prefilled text of the current href.
    pub message: Option<String>,
}

impl OrderAction {
    pub fn with_href(href: Option<String>) -> Self {
        Self { href, ..Self::default() }
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled && !self.aria_disabled && self.href.is_some()
    }

    pub fn enable(&mut self) {
        self.disabled = false;
        self.aria_disabled = false;
        self.tabindex = None;
    }

    /// Disabled anchors lose their target and leave the tab order.
    pub fn disable(&mut self) {
        self.disabled = true;
        self.aria_disabled = true;
        self.href = None;
        self.tabindex = Some(-1);
    }

    pub fn open_in_new_tab(&mut self) {
        self.target = Some("_blank".to_string());
        self.rel = Some("noopener noreferrer".to_string());
    }

    pub fn href_is_whatsapp(&self) -> bool {
        self.href
            .as_deref()
            .is_some_and(|h| h.to_ascii_lowercase().contains("whatsapp.com"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeOption {
    pub value: String,
    pub label: String,
}

/// A card's `.grade-select`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GradeSelector {
    pub options: Vec<GradeOption>,
    pub selected: Option<usize>,
}

impl GradeSelector {
    /// Current value: the selected option, else the first option, else empty.
    pub fn value(&self) -> &str {
        self.selected
            .and_then(|i| self.options.get(i))
            .or_else(|| self.options.first())
            .map(|o| o.value.as_str())
            .unwrap_or("")
    }

    /// Select the option carrying `value`. Returns false if no option matches.
    pub fn select(&mut self, value: &str) -> bool {
        match self.options.iter().position(|o| o.value == value) {
            Some(i) => {
                self.selected = Some(i);
                true
            }
            None => false,
        }
    }
}

/// The `.main-img` of a card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MainImage {
    pub src: String,
    pub opacity: f32,
}

/// One carousel image with its optional weight caption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub src: String,
    #[serde(default)]
    pub weight: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(json: &str) -> PriceFeed {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn feed_defaults_currency_and_products() {
        let f = feed(r#"{"currency":null,"products":null}"#);
        assert_eq!(f.currency(), "INR");
        assert!(f.products().is_empty());

        let f = feed(r#"{"currency":"","products":[{"id":"a","price":1}]}"#);
        assert_eq!(f.currency(), "INR");
        assert_eq!(f.products().len(), 1);
    }

    #[test]
    fn pricing_mode_resolution() {
        let f = feed(
            r#"{"products":[
                {"id":"fixed","price":500,"unit":"/kg"},
                {"id":"graded","price":null,"grades":{"S":300,"M":null}},
                {"id":"none","price":null}
            ]}"#,
        );
        let modes: Vec<_> = f.products().iter().map(PricingMode::of).collect();
        assert_eq!(modes[0], PricingMode::Fixed { amount: 500.0 });
        assert!(modes[1].is_grade_dependent());
        assert_eq!(modes[1].grade_price("S"), Some(300.0));
        assert_eq!(modes[1].grade_price("M"), None);
        assert_eq!(modes[1].grade_price(""), None);
        assert_eq!(modes[1].base_price(), None);
        assert_eq!(modes[2], PricingMode::Unavailable);
    }

    #[test]
    fn lang_from_tag() {
        assert_eq!(Lang::from_tag(Some("bn-BD")), Lang::Bn);
        assert_eq!(Lang::from_tag(Some("en")), Lang::En);
        assert_eq!(Lang::from_tag(None), Lang::En);
    }

    #[test]
    fn grade_selector_value_falls_back_to_first_option() {
        let mut sel = GradeSelector {
            options: vec![
                GradeOption { value: String::new(), label: "Select size".into() },
                GradeOption { value: "L".into(), label: "Large".into() },
            ],
            selected: None,
        };
        assert_eq!(sel.value(), "");
        assert!(sel.select("L"));
        assert_eq!(sel.value(), "L");
        assert!(!sel.select("XL"));
        assert_eq!(sel.value(), "L");
    }

    #[test]
    fn disabled_action_drops_href() {
        let mut a = OrderAction::with_href(Some("https://api.whatsapp.com/send".into()));
        assert!(a.is_enabled());
        a.disable();
        assert!(!a.is_enabled());
        assert_eq!(a.tabindex, Some(-1));
    }
}
