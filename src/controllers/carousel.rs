use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::{CAROUSEL_AUTO_MS, CAROUSEL_FADE_MS, CHANNEL_CAPACITY, SWIPE_THRESHOLD_PX};
use crate::controllers::equalizer::Equalizer;
use crate::error::{AppError, Result};
use crate::markup::CardMarkup;
use crate::state::CatalogStore;
use crate::types::{Lang, Slide};

// ---------------------------------------------------------------------------
// Carousel state
// ---------------------------------------------------------------------------

/// Slide list and cursor of one card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Carousel {
    slides: Vec<Slide>,
    current: usize,
    /// Dot shown as active. Trails `current` until the fade completes.
    active_dot: usize,
    /// Whether arrows and dots were built. False for single-slide carousels.
    controls: bool,
}

impl Carousel {
    /// Slides come from the thumbnail strip, else the declared image set,
    /// else the main image alone. Cards without a main image get no carousel.
    pub fn from_markup(card: &CardMarkup) -> Option<Self> {
        let main = card.main_image.as_ref()?;

        let mut slides: Vec<Slide> = match &card.thumbnails {
            Some(thumbs) if !thumbs.is_empty() => thumbs.clone(),
            _ => card.declared_images.clone(),
        };
        let mut seen = std::collections::HashSet::new();
        slides.retain(|s| seen.insert(s.src.clone()));

        if slides.is_empty() {
            slides.push(Slide { src: main.src.clone(), weight: String::new() });
        }
        Some(Self::new(slides))
    }

    fn new(slides: Vec<Slide>) -> Self {
        let controls = slides.len() > 1;
        Self { slides, current: 0, active_dot: 0, controls }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// A single slide never moves.
    pub fn is_inert(&self) -> bool {
        !self.controls
    }

    pub fn dot_count(&self) -> usize {
        if self.controls { self.slides.len() } else { 0 }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn active_dot(&self) -> usize {
        self.active_dot
    }

    pub fn current_slide(&self) -> &Slide {
        &self.slides[self.current]
    }

    /// Move the cursor to `idx`, wrapping in both directions.
    pub fn go_to(&mut self, idx: isize) -> usize {
        let n = self.slides.len() as isize;
        if n == 0 {
            return 0;
        }
        self.current = idx.rem_euclid(n) as usize;
        self.current
    }

    pub fn next(&mut self) -> usize {
        self.go_to(self.current as isize + 1)
    }

    pub fn prev(&mut self) -> usize {
        self.go_to(self.current as isize - 1)
    }

    pub fn step(&mut self, step: Step) -> usize {
        match step {
            Step::Next => self.next(),
            Step::Prev => self.prev(),
            Step::To(i) => self.go_to(i as isize),
        }
    }

    /// Sync the active dot with the cursor.
    pub fn settle(&mut self) {
        self.active_dot = self.current;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Next,
    Prev,
    To(usize),
}

/// Swipe direction for a horizontal touch displacement, if it clears the threshold.
pub fn swipe_step(dx: f64) -> Option<Step> {
    if dx.abs() > SWIPE_THRESHOLD_PX {
        Some(if dx < 0.0 { Step::Next } else { Step::Prev })
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// User input
// ---------------------------------------------------------------------------

/// Pointer and touch events on a card's media region.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CarouselInput {
    Next,
    Prev,
    Dot { index: usize },
    Swipe { dx: f64 },
    Hover,
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselCmd {
    /// Manual navigation. Resets the auto-advance timer.
    Navigate(Step),
    Pause,
    Resume,
}

impl CarouselInput {
    /// None for swipes under the threshold.
    pub fn command(self) -> Option<CarouselCmd> {
        match self {
            CarouselInput::Next => Some(CarouselCmd::Navigate(Step::Next)),
            CarouselInput::Prev => Some(CarouselCmd::Navigate(Step::Prev)),
            CarouselInput::Dot { index } => Some(CarouselCmd::Navigate(Step::To(index))),
            CarouselInput::Swipe { dx } => swipe_step(dx).map(CarouselCmd::Navigate),
            CarouselInput::Hover => Some(CarouselCmd::Pause),
            CarouselInput::Leave => Some(CarouselCmd::Resume),
        }
    }
}

// ---------------------------------------------------------------------------
// Runner: one task per animated card
// ---------------------------------------------------------------------------

/// Drives one card's carousel: auto-advance timer, fade transitions, and
/// manual navigation received over a channel.
pub struct CarouselRunner {
    card_id: String,
    lang: Lang,
    store: Arc<CatalogStore>,
    equalizer: Arc<Equalizer>,
    cmd_rx: mpsc::Receiver<CarouselCmd>,
    auto: Duration,
    fade: Duration,
}

impl CarouselRunner {
    pub async fn run(mut self) {
        let mut paused = false;
        loop {
            // A fresh sleep every iteration: any command reschedules the tick
            // instead of queueing behind it.
            let cmd = if paused {
                match self.cmd_rx.recv().await {
                    Some(c) => c,
                    None => return,
                }
            } else {
                tokio::select! {
                    _ = sleep(self.auto) => {
                        self.transition(Step::Next).await;
                        continue;
                    }
                    c = self.cmd_rx.recv() => match c {
                        Some(c) => c,
                        None => return,
                    },
                }
            };

            match cmd {
                CarouselCmd::Navigate(step) => self.transition(step).await,
                CarouselCmd::Pause => paused = true,
                CarouselCmd::Resume => paused = false,
            }
        }
    }

    /// Fade out and move the cursor, then swap the source and fade back in.
    async fn transition(&self, step: Step) {
        let moved = self
            .store
            .with_card(&self.card_id, |card| {
                let carousel = card.carousel.as_mut()?;
                let idx = carousel.step(step);
                let total = carousel.len();
                if let Some(img) = card.image.as_mut() {
                    img.opacity = 0.0;
                }
                Some((idx, total))
            })
            .flatten();
        let Some((idx, total)) = moved else { return };

        sleep(self.fade).await;

        self.store
            .with_card(&self.card_id, |card| card.finish_slide_transition(self.lang));
        debug!("[CAROUSEL] {} → slide {}/{total}", self.card_id, idx + 1);
        self.equalizer.schedule_after_switch();
    }
}

/// Owned handle to a running carousel task.
pub struct CarouselHandle {
    cmd_tx: mpsc::Sender<CarouselCmd>,
    task: JoinHandle<()>,
}

impl CarouselHandle {
    pub fn start(
        card_id: String,
        lang: Lang,
        store: Arc<CatalogStore>,
        equalizer: Arc<Equalizer>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let runner = CarouselRunner {
            card_id,
            lang,
            store,
            equalizer,
            cmd_rx,
            auto: Duration::from_millis(CAROUSEL_AUTO_MS),
            fade: Duration::from_millis(CAROUSEL_FADE_MS),
        };
        let task = tokio::spawn(async move { runner.run().await });
        Self { cmd_tx, task }
    }

    pub async fn send(&self, cmd: CarouselCmd) -> Result<()> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|e| AppError::BadRequest(format!("carousel stopped: {e}")))
    }

    pub fn stop(self) {
        self.task.abort();
    }
}

/// Every running carousel on the page.
#[derive(Default)]
pub struct Carousels {
    handles: HashMap<String, CarouselHandle>,
}

impl Carousels {
    /// Start a runner for each card with more than one slide. Inert
    /// carousels get no task.
    pub fn start_all(lang: Lang, store: &Arc<CatalogStore>, equalizer: &Arc<Equalizer>) -> Self {
        let mut handles = HashMap::new();
        for id in store.ids() {
            let animated = store
                .with_card(id, |c| c.carousel.as_ref().is_some_and(|k| !k.is_inert()))
                .unwrap_or(false);
            if animated {
                handles.insert(
                    id.clone(),
                    CarouselHandle::start(id.clone(), lang, Arc::clone(store), Arc::clone(equalizer)),
                );
            }
        }
        info!("[CAROUSEL] started {} carousels", handles.len());
        Self { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn get(&self, card_id: &str) -> Option<&CarouselHandle> {
        self.handles.get(card_id)
    }

    pub fn stop_all(&mut self) {
        for (id, handle) in self.handles.drain() {
            debug!("[CAROUSEL] stopping {id}");
            handle.stop();
        }
    }
}

impl Drop for Carousels {
    fn drop(&mut self) {
        if !self.handles.is_empty() {
            warn!("[CAROUSEL] dropping {} running carousels", self.handles.len());
            self.stop_all();
        }
    }
}
