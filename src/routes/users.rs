use axum::{extract::State, http::StatusCode, Extension, Json};

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{CategoryImportance, NewUser, User},
    routes::{extract::CurrentUser, AppState},
    services::{preferences, users},
};

/// Handler for user registration
pub async fn register(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<NewUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    tracing::info!(request_id = %request_id, "Processing registration");

    let user = users::register(state.store.as_ref(), request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Handler returning the calling user
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(email): CurrentUser,
) -> AppResult<Json<User>> {
    let user = users::require_user(state.store.as_ref(), &email).await?;
    Ok(Json(user))
}

/// Handler returning the caller's learned importance per category
pub async fn preferences(
    State(state): State<AppState>,
    CurrentUser(email): CurrentUser,
) -> AppResult<Json<Vec<CategoryImportance>>> {
    let vector = preferences::preference_vector(state.store.as_ref(), &email).await?;
    Ok(Json(vector))
}
