//! `/health` endpoint: price load state and live component counts.

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::storefront::{HealthReport, Storefront};

pub async fn get_health(State(storefront): State<Arc<Storefront>>) -> Json<HealthReport> {
    Json(storefront.health().await)
}
