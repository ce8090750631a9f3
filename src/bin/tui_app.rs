use serde::Deserialize;

// ---------------------------------------------------------------------------
// API response types (subset of the /page snapshot)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PageView {
    pub lang: String,
    pub prices: PricesView,
    pub nav: Option<NavView>,
    pub banner: Option<BannerView>,
    pub query: Option<String>,
    pub notice: Option<String>,
    pub cards: Vec<CardView>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PricesView {
    pub state: String,
    pub products: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NavView {
    pub open: bool,
    pub link_count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BannerView {
    pub state: String,
    pub restore_button: Option<serde_json::Value>,
    pub has_close_button: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CardView {
    pub id: String,
    pub title: Option<String>,
    pub price: Option<PriceView>,
    pub order: Option<OrderView>,
    pub grade_select: Option<GradeSelectView>,
    pub carousel: Option<CarouselView>,
    pub weight_label: Option<String>,
    pub visible: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceView {
    pub text: String,
    pub skeleton: bool,
    pub unavailable: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderView {
    pub href: Option<String>,
    pub disabled: bool,
    pub requires_grade: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GradeOptionView {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GradeSelectView {
    pub options: Vec<GradeOptionView>,
    pub selected: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CarouselView {
    pub slides: Vec<serde_json::Value>,
    pub current: usize,
    pub controls: bool,
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connected,
    Error(String),
    Connecting,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    /// Typing a search query.
    Search(String),
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub status: ConnectionStatus,
    pub page: PageView,
    pub mode: InputMode,
    /// Last non-2xx answer to an event, shown in the footer.
    pub last_error: Option<String>,
    pub last_refresh: std::time::Instant,
    pub base_url: String,
}

impl AppState {
    pub fn new(base_url: String) -> Self {
        Self {
            status: ConnectionStatus::Connecting,
            page: PageView::default(),
            mode: InputMode::Normal,
            last_error: None,
            last_refresh: std::time::Instant::now(),
            base_url,
        }
    }

    pub async fn refresh(&mut self, client: &reqwest::Client) {
        let url = format!("{}/page", self.base_url);
        match client.get(&url).send().await {
            Ok(resp) => match resp.json::<PageView>().await {
                Ok(page) => {
                    self.page = page;
                    self.status = ConnectionStatus::Connected;
                    self.last_refresh = std::time::Instant::now();
                }
                Err(e) => self.status = ConnectionStatus::Error(format!("parse error: {e}")),
            },
            Err(e) => self.status = ConnectionStatus::Error(format!("{e}")),
        }
    }

    /// POST an event, then refresh so the table reflects it.
    pub async fn post(&mut self, client: &reqwest::Client, path: &str, body: Option<serde_json::Value>) {
        let url = format!("{}{path}", self.base_url);
        let req = match body {
            Some(b) => client.post(&url).json(&b),
            None => client.post(&url),
        };
        self.last_error = match req.send().await {
            Ok(resp) if resp.status().is_success() => None,
            Ok(resp) => {
                let status = resp.status();
                let text = resp.text().await.unwrap_or_default();
                Some(format!("{status}: {text}"))
            }
            Err(e) => Some(e.to_string()),
        };
        self.refresh(client).await;
    }

    pub async fn search(&mut self, client: &reqwest::Client, query: &str) {
        let url = format!("{}/search?q={}", self.base_url, urlencoding::encode(query));
        self.last_error = client.get(&url).send().await.err().map(|e| e.to_string());
        self.refresh(client).await;
    }

    pub fn card(&self, idx: Option<usize>) -> Option<&CardView> {
        idx.and_then(|i| self.page.cards.get(i))
    }
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

pub fn price_label(card: &CardView) -> String {
    match &card.price {
        Some(p) if p.skeleton => "…".to_string(),
        Some(p) => p.text.clone(),
        None => "—".to_string(),
    }
}

pub fn order_label(card: &CardView) -> &'static str {
    match &card.order {
        Some(o) if !o.disabled && o.href.is_some() => "order",
        Some(o) if o.requires_grade == Some(true) => "pick grade",
        Some(_) => "disabled",
        None => "—",
    }
}

pub fn grade_label(card: &CardView) -> String {
    let Some(select) = &card.grade_select else { return "—".to_string() };
    select
        .selected
        .or(if select.options.is_empty() { None } else { Some(0) })
        .and_then(|i| select.options.get(i))
        .map(|o| if o.value.is_empty() { "-".to_string() } else { o.label.clone() })
        .unwrap_or_else(|| "—".to_string())
}

pub fn slide_label(card: &CardView) -> String {
    match &card.carousel {
        Some(c) if c.controls => format!("{}/{}", c.current + 1, c.slides.len()),
        Some(_) => "1/1".to_string(),
        None => "—".to_string(),
    }
}

/// Value of the next selectable grade after the current one, wrapping.
/// Placeholder options (empty value) are skipped.
pub fn next_grade(select: &GradeSelectView) -> Option<String> {
    let n = select.options.len();
    let start = select.selected.unwrap_or(0);
    (1..=n)
        .map(|off| &select.options[(start + off) % n])
        .find(|o| !o.value.is_empty())
        .map(|o| o.value.clone())
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}
