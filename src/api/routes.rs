use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::api::health::get_health;
use crate::controllers::{BannerController, CarouselInput, NavController};
use crate::error::{AppError, Result};
use crate::state::Card;
use crate::storefront::{PageSnapshot, SearchOutcome, Storefront};

pub fn router(storefront: Arc<Storefront>) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/page", get(get_page))
        .route("/nav/toggle", post(nav_toggle))
        .route("/nav/link", post(nav_link))
        .route("/nav/outside", post(nav_outside))
        .route("/banner/dismiss", post(banner_dismiss))
        .route("/banner/restore", post(banner_restore))
        .route("/cards/:id", get(get_card))
        .route("/cards/:id/grade", post(select_grade))
        .route("/cards/:id/carousel", post(carousel_input))
        .route("/search", get(search))
        .route("/layout/resize", post(resize))
        .with_state(storefront)
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct GradeRequest {
    pub grade: String,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_page(State(sf): State<Arc<Storefront>>) -> Json<PageSnapshot> {
    Json(sf.snapshot().await)
}

async fn get_card(State(sf): State<Arc<Storefront>>, Path(id): Path<String>) -> Result<Json<Card>> {
    sf.store().get(&id).map(Json).ok_or(AppError::UnknownCard(id))
}

async fn nav_toggle(State(sf): State<Arc<Storefront>>) -> Result<Json<NavController>> {
    Ok(Json(sf.nav_toggle().await?))
}

async fn nav_link(State(sf): State<Arc<Storefront>>) -> Result<Json<NavController>> {
    Ok(Json(sf.nav_link_clicked().await?))
}

async fn nav_outside(State(sf): State<Arc<Storefront>>) -> Result<Json<NavController>> {
    Ok(Json(sf.nav_outside_click().await?))
}

async fn banner_dismiss(State(sf): State<Arc<Storefront>>) -> Result<Json<BannerController>> {
    Ok(Json(sf.dismiss_banner().await?))
}

async fn banner_restore(State(sf): State<Arc<Storefront>>) -> Result<Json<BannerController>> {
    Ok(Json(sf.restore_banner().await?))
}

async fn select_grade(
    State(sf): State<Arc<Storefront>>,
    Path(id): Path<String>,
    Json(body): Json<GradeRequest>,
) -> Result<Json<Card>> {
    Ok(Json(sf.select_grade(&id, &body.grade).await?))
}

async fn carousel_input(
    State(sf): State<Arc<Storefront>>,
    Path(id): Path<String>,
    Json(input): Json<CarouselInput>,
) -> Result<Json<Card>> {
    sf.carousel(&id, input).await?;
    sf.store().get(&id).map(Json).ok_or(AppError::UnknownCard(id))
}

async fn search(
    State(sf): State<Arc<Storefront>>,
    Query(params): Query<SearchQuery>,
) -> Json<SearchOutcome> {
    Json(sf.search(params.q.as_deref().unwrap_or_default()).await)
}

async fn resize(State(sf): State<Arc<Storefront>>) -> Json<serde_json::Value> {
    sf.resize();
    Json(serde_json::json!({ "scheduled": true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::markup::parse_page;
    use crate::state::MemoryStorage;

    const PAGE: &str = r#"<html lang="bn"><body>
<section class="products">
  <div class="product-card" data-id="crab2">
    <h3>Jumbo Crab</h3><div class="price"></div>
    <select class="grade-select"><option value="">Size</option><option value="L">L</option></select>
    <div class="order-btn"><a class="btn" href="https://example.com">Order</a></div>
  </div>
</section></body></html>"#;

    async fn serve() -> String {
        let cfg = Config::for_page(reqwest::Url::parse("http://shop.test/bn/products.html").unwrap());
        let sf = Storefront::new(cfg, parse_page(PAGE).unwrap(), Arc::new(MemoryStorage::new()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(sf)).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn status_codes() {
        let base = serve().await;
        let client = reqwest::Client::new();

        let health = client.get(format!("{base}/health")).send().await.unwrap();
        assert_eq!(health.status(), 200);

        let missing = client
            .post(format!("{base}/cards/ghost/grade"))
            .json(&serde_json::json!({ "grade": "L" }))
            .send()
            .await
            .unwrap();
        assert_eq!(missing.status(), 404);

        let bad_grade = client
            .post(format!("{base}/cards/crab2/grade"))
            .json(&serde_json::json!({ "grade": "XXL" }))
            .send()
            .await
            .unwrap();
        assert_eq!(bad_grade.status(), 400);

        // Page has no nav menu.
        let nav = client.post(format!("{base}/nav/toggle")).send().await.unwrap();
        assert_eq!(nav.status(), 400);
    }

    #[tokio::test]
    async fn search_sets_bengali_notice() {
        let base = serve().await;
        let body: serde_json::Value = reqwest::get(format!("{base}/search?q=lobster"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["visible"], 0);
        assert_eq!(body["notice"], "\"lobster\" এর জন্য কোনো ফলাফল পাওয়া যায়নি।");

        let page: serde_json::Value = reqwest::get(format!("{base}/page")).await.unwrap().json().await.unwrap();
        assert_eq!(page["lang"], "bn");
        assert_eq!(page["prices"]["state"], "loading");
        assert_eq!(page["cards"][0]["visible"], false);
    }
}
