use serde::Serialize;
use tracing::debug;

use crate::config::{BANNER_EXPIRY_MS, BANNER_STORAGE_KEY};
use crate::markup::parser::BannerMarkup;
use crate::state::FlagStorage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerState {
    Visible,
    Hidden,
}

/// The small `.trust-show` button that brings a dismissed banner back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestoreButton {
    pub label: &'static str,
    pub glyph: &'static str,
}

impl Default for RestoreButton {
    fn default() -> Self {
        Self { label: "Show announcement", glyph: "⟲" }
    }
}

/// Promotional `.trust-bar` with a 24h dismissal flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BannerController {
    pub state: BannerState,
    pub restore_button: Option<RestoreButton>,
    pub has_close_button: bool,
}

/// True if a stored dismissal timestamp is still within the expiry window.
/// Unparseable values count as expired.
pub fn dismissal_is_fresh(stored: &str, now_ms: u64) -> bool {
    match stored.trim().parse::<f64>() {
        Ok(ts) if ts.is_finite() => (now_ms as f64 - ts) <= BANNER_EXPIRY_MS as f64,
        _ => false,
    }
}

impl BannerController {
    /// Initial state from the persisted flag. Storage failures read as "no flag".
    pub fn on_load(markup: &BannerMarkup, storage: &dyn FlagStorage, now_ms: u64) -> Self {
        let mut banner = Self {
            state: BannerState::Visible,
            restore_button: None,
            has_close_button: markup.has_close_button,
        };

        let stored = storage.get(BANNER_STORAGE_KEY).unwrap_or_else(|e| {
            debug!("[BANNER] storage unavailable, showing banner: {e}");
            None
        });
        match stored.as_deref() {
            Some(s) if !s.is_empty() && dismissal_is_fresh(s, now_ms) => {
                banner.state = BannerState::Hidden;
                banner.show_restore_button();
            }
            Some(s) if !s.is_empty() => {
                debug!("[BANNER] dismissal flag expired ({s}), clearing");
                if let Err(e) = storage.remove(BANNER_STORAGE_KEY) {
                    debug!("[BANNER] could not clear expired flag: {e}");
                }
            }
            _ => {}
        }
        banner
    }

    pub fn is_visible(&self) -> bool {
        self.state == BannerState::Visible
    }

    /// Close button click. Returns false when there is nothing to close.
    pub fn dismiss(&mut self, storage: &dyn FlagStorage, now_ms: u64) -> bool {
        if !self.has_close_button || !self.is_visible() {
            return false;
        }
        self.state = BannerState::Hidden;
        if let Err(e) = storage.set(BANNER_STORAGE_KEY, &now_ms.to_string()) {
            debug!("[BANNER] could not persist dismissal: {e}");
        }
        self.show_restore_button();
        true
    }

    /// Restore button click. Returns false when no restore button is shown.
    pub fn restore(&mut self, storage: &dyn FlagStorage) -> bool {
        if self.restore_button.take().is_none() {
            return false;
        }
        self.state = BannerState::Visible;
        if let Err(e) = storage.remove(BANNER_STORAGE_KEY) {
            debug!("[BANNER] could not clear dismissal flag: {e}");
        }
        true
    }

    fn show_restore_button(&mut self) {
        if self.restore_button.is_none() {
            self.restore_button = Some(RestoreButton::default());
        }
    }
}
