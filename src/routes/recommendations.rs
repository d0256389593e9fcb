use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::CityProfile,
    routes::{extract::CurrentUser, AppState},
    services::recommendations,
};

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

pub fn default_limit() -> usize {
    10
}

/// Handler for personal recommendations
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    CurrentUser(email): CurrentUser,
    Query(params): Query<RecommendationQuery>,
) -> AppResult<Json<Vec<CityProfile>>> {
    tracing::info!(
        request_id = %request_id,
        user = %email,
        limit = params.limit,
        "Processing recommendation request"
    );

    let cities = recommendations::recommend(
        state.store.as_ref(),
        &email,
        params.limit,
        state.limits.max_recommendations,
    )
    .await?;

    tracing::info!(
        request_id = %request_id,
        returned = cities.len(),
        "Recommendations computed"
    );

    Ok(Json(cities))
}
