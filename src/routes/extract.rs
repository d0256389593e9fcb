use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

/// HTTP header carrying the caller's email
pub const USER_HEADER: &str = "x-user-email";

/// The user a request acts on behalf of
///
/// Identity comes from the `x-user-email` header; whether the user exists is
/// checked by the service the handler calls.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let email = parts
            .headers
            .get(USER_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Unauthorized(format!("Missing {} header", USER_HEADER)))?;

        Ok(CurrentUser(email))
    }
}
