use axum::{
    extract::{Path, State},
    Extension, Json,
};
use cragdeals_core::Discount;
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub(super) struct RefreshResult {
    status: &'static str,
    generation: u64,
    categories: usize,
}

/// Cached discounts for one category, as a bare JSON array.
pub(super) async fn get_discounts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(category): Path<String>,
) -> Result<Json<Vec<Discount>>, ApiError> {
    state.service.cached(&category).map(Json).ok_or_else(|| {
        ApiError::new(
            req_id.0,
            "not_found",
            format!("category '{category}' is not configured"),
        )
    })
}

pub(super) async fn list_categories(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.service.categories().to_vec())
}

pub(super) async fn refresh(State(state): State<AppState>) -> Json<RefreshResult> {
    let snapshot = state.service.refresh().await;
    Json(RefreshResult {
        status: "success",
        generation: snapshot.generation,
        categories: snapshot.discounts.len(),
    })
}
