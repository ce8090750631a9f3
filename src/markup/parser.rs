use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::types::{GradeOption, GradeSelector, Lang, MainImage, OrderAction, Slide};

// ---------------------------------------------------------------------------
// Parsed page
// ---------------------------------------------------------------------------

/// The parts of a storefront page the runtime depends on.
#[derive(Debug, Clone, Default)]
pub struct PageMarkup {
    pub lang: Lang,
    /// Present only when both the toggle and the link list exist.
    pub nav: Option<NavMarkup>,
    pub banner: Option<BannerMarkup>,
    /// `.products` section, host of the "no results" notice.
    pub has_products_section: bool,
    pub cards: Vec<CardMarkup>,
}

#[derive(Debug, Clone, Default)]
pub struct NavMarkup {
    pub link_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct BannerMarkup {
    pub has_close_button: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CardMarkup {
    pub id: Option<String>,
    /// Trimmed `h3` text, used in order messages.
    pub title: Option<String>,
    /// `h3` or `h4` text, used by search.
    pub search_title: String,
    /// First paragraph text, used by search.
    pub description: String,
    pub has_price: bool,
    pub order: Option<OrderAction>,
    pub grade_select: Option<GradeSelector>,
    pub main_image: Option<MainImage>,
    /// `.thumbs.image-switcher` strip, if the card has one.
    pub thumbnails: Option<Vec<Slide>>,
    /// Slides declared through the card's `data-images` attribute.
    pub declared_images: Vec<Slide>,
    /// Text of the `.weight` label, if present.
    pub weight_label: Option<String>,
    pub has_media: bool,
}

struct Selectors {
    nav_toggle: Selector,
    nav_links: Selector,
    nav_link_anchor: Selector,
    banner: Selector,
    banner_close: Selector,
    products: Selector,
    card: Selector,
    h3: Selector,
    heading: Selector,
    paragraph: Selector,
    price: Selector,
    order_anchor: Selector,
    any_button: Selector,
    grade_select: Selector,
    option: Selector,
    main_img: Selector,
    thumb_strip: Selector,
    thumb: Selector,
    weight: Selector,
    media: Selector,
}

fn selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::Markup(format!("bad selector {s:?}: {e:?}")))
}

impl Selectors {
    fn new() -> Result<Self> {
        Ok(Self {
            nav_toggle: selector(".nav-toggle")?,
            nav_links: selector(".nav-links")?,
            nav_link_anchor: selector(".nav-links a")?,
            banner: selector(".trust-bar")?,
            banner_close: selector(".trust-close")?,
            products: selector(".products")?,
            card: selector(".product-card")?,
            h3: selector("h3")?,
            heading: selector("h3, h4")?,
            paragraph: selector("p")?,
            price: selector(".price")?,
            order_anchor: selector(".order-btn a.btn")?,
            any_button: selector(".btn")?,
            grade_select: selector(".grade-select")?,
            option: selector("option")?,
            main_img: selector(".main-img")?,
            thumb_strip: selector(".thumbs.image-switcher")?,
            thumb: selector(".thumb[data-src]")?,
            weight: selector(".weight")?,
            media: selector(".product-media")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

pub fn parse_page(html: &str) -> Result<PageMarkup> {
    let sel = Selectors::new()?;
    let doc = Html::parse_document(html);

    let lang = Lang::from_tag(doc.root_element().value().attr("lang"));

    let nav = match (
        doc.select(&sel.nav_toggle).next(),
        doc.select(&sel.nav_links).next(),
    ) {
        (Some(_), Some(_)) => Some(NavMarkup {
            link_count: doc.select(&sel.nav_link_anchor).count(),
        }),
        _ => None,
    };

    let banner = doc.select(&sel.banner).next().map(|bar| BannerMarkup {
        has_close_button: bar.select(&sel.banner_close).next().is_some(),
    });

    let cards: Vec<CardMarkup> = doc.select(&sel.card).map(|c| parse_card(c, &sel)).collect();

    debug!(
        "[MARKUP] lang={lang} nav={} banner={} cards={}",
        nav.is_some(),
        banner.is_some(),
        cards.len()
    );

    Ok(PageMarkup {
        lang,
        nav,
        banner,
        has_products_section: doc.select(&sel.products).next().is_some(),
        cards,
    })
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

fn parse_card(card: ElementRef<'_>, sel: &Selectors) -> CardMarkup {
    let id = card.value().attr("data-id").map(str::to_string);

    let order = card
        .select(&sel.order_anchor)
        .next()
        .or_else(|| card.select(&sel.any_button).next())
        .map(|a| OrderAction::with_href(a.value().attr("href").map(str::to_string)));

    let grade_select = card.select(&sel.grade_select).next().map(|s| {
        let mut selected = None;
        let options = s
            .select(&sel.option)
            .enumerate()
            .map(|(i, opt)| {
                let label = text_of(opt).trim().to_string();
                if opt.value().attr("selected").is_some() {
                    selected = Some(i);
                }
                GradeOption {
                    value: opt
                        .value()
                        .attr("value")
                        .map(str::to_string)
                        .unwrap_or_else(|| label.clone()),
                    label,
                }
            })
            .collect();
        GradeSelector { options, selected }
    });

    let main_image = card.select(&sel.main_img).next().map(|img| MainImage {
        src: img.value().attr("src").unwrap_or_default().to_string(),
        opacity: 1.0,
    });

    let thumbnails = card.select(&sel.thumb_strip).next().map(|strip| {
        strip
            .select(&sel.thumb)
            .map(|t| Slide {
                src: t.value().attr("data-src").unwrap_or_default().to_string(),
                weight: t.value().attr("data-weight").unwrap_or_default().to_string(),
            })
            .collect()
    });

    let declared_images = card
        .value()
        .attr("data-images")
        .map(|raw| parse_declared_images(raw, id.as_deref()))
        .unwrap_or_default();

    CardMarkup {
        title: card
            .select(&sel.h3)
            .next()
            .map(|h| text_of(h).trim().to_string()),
        search_title: card.select(&sel.heading).next().map(text_of).unwrap_or_default(),
        description: card.select(&sel.paragraph).next().map(text_of).unwrap_or_default(),
        has_price: card.select(&sel.price).next().is_some(),
        order,
        grade_select,
        main_image,
        thumbnails,
        declared_images,
        weight_label: card.select(&sel.weight).next().map(|w| text_of(w).trim().to_string()),
        has_media: card.select(&sel.media).next().is_some(),
        id,
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DeclaredImage {
    Src(String),
    Slide(Slide),
}

fn parse_declared_images(raw: &str, card_id: Option<&str>) -> Vec<Slide> {
    match serde_json::from_str::<Vec<DeclaredImage>>(raw) {
        Ok(images) => images
            .into_iter()
            .map(|img| match img {
                DeclaredImage::Src(src) => Slide { src, weight: String::new() },
                DeclaredImage::Slide(slide) => slide,
            })
            .collect(),
        Err(e) => {
            warn!("[MARKUP] ignoring malformed data-images on card {card_id:?}: {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"<!doctype html>
<html lang="bn">
<body>
  <nav class="navbar">
    <button class="nav-toggle" aria-expanded="false"></button>
    <ul class="nav-links"><li><a href="index.html">Home</a></li><li><a href="products.html">Products</a></li></ul>
  </nav>
  <div class="trust-bar"><span>Fresh daily</span><button class="trust-close">x</button></div>
  <section class="products">
    <div class="product-card" data-id="crab1" data-images='["a.jpg", {"src":"b.jpg","weight":"500g"}]'>
      <div class="product-media"><img class="main-img" src="a.jpg"></div>
      <h3>  Mud Crab  </h3>
      <p>Live mud crab from the Sundarbans</p>
      <span class="weight">Weight: 500g</span>
      <div class="price"></div>
      <select class="grade-select">
        <option value="">Select size</option>
        <option value="L" selected>Large</option>
      </select>
      <div class="order-btn"><a class="btn" href="products.html#crab1">Order</a></div>
    </div>
    <div class="product-card" data-id="prawn">
      <img class="main-img" src="p1.jpg">
      <h4>Tiger Prawn</h4>
      <div class="thumbs image-switcher">
        <button class="thumb" data-src="p1.jpg" data-weight="1kg"></button>
        <button class="thumb" data-src="p2.jpg"></button>
        <button class="thumb"></button>
      </div>
      <a class="btn">Order</a>
    </div>
  </section>
</body>
</html>"##;

    #[test]
    fn parses_page_chrome() {
        let page = parse_page(PAGE).unwrap();
        assert_eq!(page.lang, Lang::Bn);
        assert_eq!(page.nav.as_ref().map(|n| n.link_count), Some(2));
        assert!(page.banner.as_ref().unwrap().has_close_button);
        assert!(page.has_products_section);
        assert_eq!(page.cards.len(), 2);
    }

    #[test]
    fn parses_card_regions() {
        let page = parse_page(PAGE).unwrap();
        let crab = &page.cards[0];
        assert_eq!(crab.id.as_deref(), Some("crab1"));
        assert_eq!(crab.title.as_deref(), Some("Mud Crab"));
        assert!(crab.has_price);
        assert!(crab.has_media);
        assert_eq!(crab.order.as_ref().unwrap().href.as_deref(), Some("products.html#crab1"));
        let grades = crab.grade_select.as_ref().unwrap();
        assert_eq!(grades.options.len(), 2);
        assert_eq!(grades.value(), "L");
        assert_eq!(crab.declared_images.len(), 2);
        assert_eq!(crab.declared_images[1].weight, "500g");
        assert!(crab.thumbnails.is_none());
    }

    #[test]
    fn card_without_h3_uses_h4_for_search_only() {
        let page = parse_page(PAGE).unwrap();
        let prawn = &page.cards[1];
        assert!(prawn.title.is_none());
        assert_eq!(prawn.search_title, "Tiger Prawn");
        assert!(!prawn.has_price);
        assert_eq!(prawn.order.as_ref().unwrap().href, None);
        let thumbs = prawn.thumbnails.as_ref().unwrap();
        assert_eq!(thumbs.len(), 2, "thumb without data-src is not a slide");
        assert_eq!(thumbs[0].weight, "1kg");
    }

    #[test]
    fn missing_nav_links_disables_nav() {
        let page = parse_page(r#"<html><body><button class="nav-toggle"></button></body></html>"#).unwrap();
        assert!(page.nav.is_none());
        assert!(page.banner.is_none());
        assert_eq!(page.lang, Lang::En);
    }
}
