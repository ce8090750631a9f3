use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tracing::warn;

use crate::controllers::carousel::Carousel;
use crate::markup::CardMarkup;
use crate::pricing::messages;
use crate::types::{GradeSelector, Lang, MainImage, OrderAction, PriceRegion, ResolvedProduct};

// ---------------------------------------------------------------------------
// Card
// ---------------------------------------------------------------------------

/// Live state of one `.product-card`.
#[derive(Debug, Clone, Serialize)]
pub struct Card {
    pub id: String,
    pub title: Option<String>,
    pub search_title: String,
    pub description: String,
    pub price: Option<PriceRegion>,
    pub order: Option<OrderAction>,
    pub grade_select: Option<GradeSelector>,
    /// Feed entry matched to this card once prices load.
    pub product: Option<ResolvedProduct>,
    pub image: Option<MainImage>,
    pub weight_label: Option<String>,
    pub carousel: Option<Carousel>,
    pub visible: bool,
    /// Inline `min-height`; the equalizer only ever clears it.
    pub min_height: Option<String>,
}

impl Card {
    /// Cards without a `data-id` cannot be matched to the feed and are skipped.
    pub fn from_markup(markup: &CardMarkup) -> Option<Self> {
        let id = markup.id.clone().filter(|id| !id.is_empty())?;
        Some(Self {
            title: markup.title.clone(),
            search_title: markup.search_title.clone(),
            description: markup.description.clone(),
            price: markup.has_price.then(PriceRegion::default),
            order: markup.order.clone(),
            grade_select: markup.grade_select.clone(),
            product: None,
            image: markup.main_image.clone(),
            weight_label: markup.weight_label.clone(),
            carousel: Carousel::from_markup(markup),
            visible: true,
            min_height: None,
            id,
        })
    }

    /// Heading text used in order messages, falling back to the identifier.
    pub fn order_title(&self) -> String {
        match self.title.as_deref() {
            Some(t) if !t.is_empty() => t.to_string(),
            _ if !self.id.is_empty() => self.id.clone(),
            _ => "product".to_string(),
        }
    }

    /// Completes a carousel transition: swap the image source, fade back in,
    /// refresh the weight caption and the active dot.
    pub fn finish_slide_transition(&mut self, lang: Lang) {
        let Some(carousel) = self.carousel.as_mut() else { return };
        carousel.settle();
        let slide = carousel.current_slide().clone();
        if let Some(img) = self.image.as_mut() {
            img.src = slide.src.clone();
            img.opacity = 1.0;
        }
        if self.weight_label.is_some() && !slide.weight.is_empty() && slide.weight != ".." {
            self.weight_label = Some(messages::weight_label(lang, &slide.weight));
        }
    }
}

// ---------------------------------------------------------------------------
// CatalogStore
// ---------------------------------------------------------------------------

/// All cards of the page, keyed by product id. The card set is fixed at
/// construction; only card contents change afterwards.
pub struct CatalogStore {
    cards: DashMap<String, Card>,
    /// Card ids in markup order.
    order: Vec<String>,
}

impl CatalogStore {
    pub fn from_markup(cards: &[CardMarkup]) -> Arc<Self> {
        let map = DashMap::new();
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        for markup in cards {
            let Some(card) = Card::from_markup(markup) else {
                warn!("[CATALOG] skipping product card without data-id");
                continue;
            };
            if !seen.insert(card.id.clone()) {
                warn!("[CATALOG] duplicate card id {}, keeping the first", card.id);
                continue;
            }
            order.push(card.id.clone());
            map.insert(card.id.clone(), card);
        }
        Arc::new(Self { cards: map, order })
    }

    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<Card> {
        self.cards.get(id).map(|c| c.clone())
    }

    /// Run `f` against one card under its shard lock.
    pub fn with_card<R>(&self, id: &str, f: impl FnOnce(&mut Card) -> R) -> Option<R> {
        let mut card = self.cards.get_mut(id)?;
        Some(f(&mut card))
    }

    /// Run `f` against every card in markup order.
    pub fn for_each_mut(&self, mut f: impl FnMut(&mut Card)) {
        for id in &self.order {
            if let Some(mut card) = self.cards.get_mut(id) {
                f(&mut card);
            }
        }
    }

    /// Cards in markup order.
    pub fn snapshot(&self) -> Vec<Card> {
        self.order.iter().filter_map(|id| self.get(id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Slide;

    fn markup(id: Option<&str>) -> CardMarkup {
        CardMarkup {
            id: id.map(str::to_string),
            has_price: true,
            ..CardMarkup::default()
        }
    }

    #[test]
    fn skips_cards_without_id_and_duplicates() {
        let store = CatalogStore::from_markup(&[
            markup(Some("a")),
            markup(None),
            markup(Some("b")),
            markup(Some("a")),
        ]);
        assert_eq!(store.ids(), ["a".to_string(), "b".to_string()]);
        assert!(store.get("a").unwrap().price.is_some());
    }

    #[test]
    fn order_title_falls_back_to_id() {
        let store = CatalogStore::from_markup(&[markup(Some("crab1"))]);
        assert_eq!(store.get("crab1").unwrap().order_title(), "crab1");
    }

    #[test]
    fn slide_transition_updates_image_and_weight() {
        let m = CardMarkup {
            id: Some("c".into()),
            main_image: Some(MainImage { src: "a.jpg".into(), opacity: 1.0 }),
            weight_label: Some("Weight: 1kg".into()),
            thumbnails: Some(vec![
                Slide { src: "a.jpg".into(), weight: "1kg".into() },
                Slide { src: "b.jpg".into(), weight: "..".into() },
                Slide { src: "c.jpg".into(), weight: "2kg".into() },
            ]),
            ..CardMarkup::default()
        };
        let store = CatalogStore::from_markup(&[m]);
        store.with_card("c", |card| {
            card.carousel.as_mut().unwrap().next();
            card.finish_slide_transition(Lang::En);
            assert_eq!(card.image.as_ref().unwrap().src, "b.jpg");
            assert_eq!(card.weight_label.as_deref(), Some("Weight: 1kg"), "'..' keeps the caption");

            card.carousel.as_mut().unwrap().next();
            card.finish_slide_transition(Lang::Bn);
            assert_eq!(card.image.as_ref().unwrap().src, "c.jpg");
            assert_eq!(card.weight_label.as_deref(), Some("ওজন: 2kg"));
        });
    }
}
