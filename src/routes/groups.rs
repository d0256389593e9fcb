use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{CityProfile, Group, GroupCode},
    routes::{extract::CurrentUser, recommendations::RecommendationQuery, AppState},
    services::groups,
};

#[derive(Debug, Default, Deserialize)]
pub struct CreateGroupRequest {
    pub code: Option<GroupCode>,
}

#[derive(Debug, Deserialize)]
pub struct JoinGroupRequest {
    pub group_code: GroupCode,
}

/// Handler creating a group with the caller as first member
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(email): CurrentUser,
    Json(request): Json<CreateGroupRequest>,
) -> AppResult<(StatusCode, Json<Group>)> {
    let group = groups::create_group(state.store.as_ref(), &email, request.code).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

/// Handler adding the caller to a group
pub async fn join(
    State(state): State<AppState>,
    CurrentUser(email): CurrentUser,
    Json(request): Json<JoinGroupRequest>,
) -> AppResult<Json<Group>> {
    let group = groups::join_group(
        state.store.as_ref(),
        &email,
        request.group_code,
        state.limits.max_group_members,
    )
    .await?;
    Ok(Json(group))
}

/// Handler listing the caller's groups
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(email): CurrentUser,
) -> AppResult<Json<Vec<Group>>> {
    let groups = groups::user_groups(state.store.as_ref(), &email).await?;
    Ok(Json(groups))
}

/// Handler for group recommendations
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    CurrentUser(email): CurrentUser,
    Path(code): Path<GroupCode>,
    Query(params): Query<RecommendationQuery>,
) -> AppResult<Json<Vec<CityProfile>>> {
    tracing::info!(
        request_id = %request_id,
        user = %email,
        group = code,
        limit = params.limit,
        "Processing group recommendation request"
    );

    let cities = groups::group_recommendations(
        state.store.as_ref(),
        &email,
        code,
        params.limit,
        state.limits.max_recommendations,
    )
    .await?;
    Ok(Json(cities))
}
