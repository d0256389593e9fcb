use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{CityKey, CityProfile, VoteValue},
    routes::{extract::CurrentUser, AppState},
    services::{cities, preferences},
};

#[derive(Debug, Deserialize)]
pub struct EvaluationQuery {
    #[serde(default = "default_evaluation_limit")]
    limit: usize,
}

fn default_evaluation_limit() -> usize {
    5
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub city: String,
    /// Wide enough that any integer reaches the 0/1 check
    pub value: i64,
}

/// Handler listing every city name
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<CityKey>>> {
    let names = cities::list_cities(state.store.as_ref()).await?;
    Ok(Json(names))
}

/// Handler returning one city's profile
pub async fn profile(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<CityProfile>> {
    let city = cities::city_profile(state.store.as_ref(), &name).await?;
    Ok(Json(city))
}

/// Handler sampling cities the caller has not voted on yet
pub async fn evaluation(
    State(state): State<AppState>,
    CurrentUser(email): CurrentUser,
    Query(params): Query<EvaluationQuery>,
) -> AppResult<Json<Vec<CityProfile>>> {
    let sample = cities::evaluation_sample(
        state.store.as_ref(),
        &email,
        params.limit,
        state.limits.max_evaluation_cities,
    )
    .await?;
    Ok(Json(sample))
}

/// Handler recording a like (1) or dislike (0)
pub async fn vote(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    CurrentUser(email): CurrentUser,
    Json(request): Json<VoteRequest>,
) -> AppResult<Json<Value>> {
    let value = u8::try_from(request.value)
        .map_err(|_| format!("vote value must be 0 or 1, got {}", request.value))
        .and_then(VoteValue::try_from)
        .map_err(AppError::InvalidInput)?;

    tracing::info!(
        request_id = %request_id,
        user = %email,
        city = %request.city,
        "Processing vote"
    );

    preferences::record_vote(state.store.as_ref(), &email, &request.city, value).await?;
    Ok(Json(json!({ "status": "success" })))
}
