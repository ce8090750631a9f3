use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::{EQUALIZE_RESIZE_DEBOUNCE_MS, EQUALIZE_SWITCH_DEBOUNCE_MS};
use crate::state::CatalogStore;

/// Trailing-edge debounce: each call cancels the pending run and schedules a new one.
#[derive(Default)]
pub struct Debouncer {
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn call<F>(&self, wait: Duration, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let task = tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            f();
        });
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(prev) = pending.replace(task) {
                prev.abort();
            }
        }
    }
}

/// Card height equalizer. Heights come from the stylesheet, so a run only
/// clears inline minimum heights left on cards. Kept as the hook that layout
/// changes (price load, resize, slide switch) go through.
pub struct Equalizer {
    store: Arc<CatalogStore>,
    on_resize: Debouncer,
    on_switch: Debouncer,
    runs: AtomicU64,
}

impl Equalizer {
    pub fn new(store: Arc<CatalogStore>) -> Arc<Self> {
        Arc::new(Self {
            store,
            on_resize: Debouncer::default(),
            on_switch: Debouncer::default(),
            runs: AtomicU64::new(0),
        })
    }

    pub fn equalize(&self) {
        if self.store.is_empty() {
            return;
        }
        self.store.for_each_mut(|card| card.min_height = None);
        let runs = self.runs.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("[LAYOUT] equalized {} cards (run {runs})", self.store.len());
    }

    pub fn schedule_after_resize(self: &Arc<Self>) {
        let this = Arc::clone(self);
        self.on_resize
            .call(Duration::from_millis(EQUALIZE_RESIZE_DEBOUNCE_MS), move || this.equalize());
    }

    pub fn schedule_after_switch(self: &Arc<Self>) {
        let this = Arc::clone(self);
        self.on_switch
            .call(Duration::from_millis(EQUALIZE_SWITCH_DEBOUNCE_MS), move || this.equalize());
    }

    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::CardMarkup;

    fn store() -> Arc<CatalogStore> {
        CatalogStore::from_markup(&[CardMarkup { id: Some("a".into()), ..CardMarkup::default() }])
    }

    #[test]
    fn equalize_clears_min_height() {
        let store = store();
        store.with_card("a", |c| c.min_height = Some("420px".into()));
        let eq = Equalizer::new(Arc::clone(&store));
        eq.equalize();
        assert_eq!(store.get("a").unwrap().min_height, None);
        assert_eq!(eq.runs(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn bursts_collapse_into_one_run() {
        let eq = Equalizer::new(store());
        for _ in 0..5 {
            eq.schedule_after_resize();
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert_eq!(eq.runs(), 0);
        tokio::time::sleep(Duration::from_millis(EQUALIZE_RESIZE_DEBOUNCE_MS)).await;
        assert_eq!(eq.runs(), 1);
    }
}
