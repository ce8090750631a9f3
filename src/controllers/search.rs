use crate::state::{Card, CatalogStore};

/// Case-insensitive substring match on title, description and id.
/// `needle` must already be lower-cased and trimmed.
pub fn card_matches(card: &Card, needle: &str) -> bool {
    card.search_title.to_lowercase().contains(needle)
        || card.description.to_lowercase().contains(needle)
        || card.id.to_lowercase().contains(needle)
}

/// Show matching cards, hide the rest. Returns the number of visible cards.
/// A blank query matches everything.
pub fn filter_cards(store: &CatalogStore, query: &str) -> usize {
    let needle = query.trim().to_lowercase();
    let mut found = 0;
    store.for_each_mut(|card| {
        card.visible = card_matches(card, &needle);
        if card.visible {
            found += 1;
        }
    });
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::CardMarkup;

    fn card(id: &str, title: &str, desc: &str) -> CardMarkup {
        CardMarkup {
            id: Some(id.to_string()),
            search_title: title.to_string(),
            description: desc.to_string(),
            ..CardMarkup::default()
        }
    }

    #[test]
    fn matches_title_description_and_id() {
        let store = CatalogStore::from_markup(&[
            card("mud_crab_male", "Mud Crab (Male)", "Live"),
            card("prawn", "Tiger Prawn", "Fresh from the SUNDARBANS"),
            card("hilsa", "Ilish", "River fish"),
        ]);
        assert_eq!(filter_cards(&store, "  CRAB "), 1);
        assert_eq!(filter_cards(&store, "sundarbans"), 1);
        assert!(store.get("prawn").unwrap().visible);
        assert!(!store.get("hilsa").unwrap().visible);
        assert_eq!(filter_cards(&store, "hilsa"), 1);
        assert_eq!(filter_cards(&store, "   "), 3);
    }
}
