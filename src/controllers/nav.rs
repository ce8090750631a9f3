use serde::Serialize;

use crate::markup::parser::NavMarkup;

/// Mobile menu. Only exists when the page has both the toggle and the link list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NavController {
    /// `active` class on `.nav-links`
    pub open: bool,
    pub aria_expanded: bool,
    pub link_count: usize,
}

impl NavController {
    pub fn from_markup(nav: &NavMarkup) -> Self {
        Self { link_count: nav.link_count, ..Self::default() }
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
        self.aria_expanded = self.open;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.aria_expanded = false;
    }

    pub fn link_clicked(&mut self) {
        self.close();
    }

    /// Document click. Clicks inside `.navbar` leave the menu alone.
    pub fn document_clicked(&mut self, inside_navbar: bool) {
        if !inside_navbar {
            self.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_and_close() {
        let mut nav = NavController::from_markup(&NavMarkup { link_count: 3 });
        nav.toggle();
        assert!(nav.open && nav.aria_expanded);

        nav.document_clicked(true);
        assert!(nav.open);
        nav.document_clicked(false);
        assert!(!nav.open && !nav.aria_expanded);

        nav.toggle();
        nav.link_clicked();
        assert!(!nav.open);
    }
}
