use crate::{
    error::{AppError, AppResult},
    models::{NewUser, User},
    store::TravelStore,
};

/// Registers a user with a neutral importance for every category
pub async fn register(store: &dyn TravelStore, request: NewUser) -> AppResult<User> {
    let request = request.normalized();

    if !is_plausible_email(&request.email) {
        return Err(AppError::InvalidInput(format!(
            "Invalid email address: {}",
            request.email
        )));
    }
    if request.username.is_empty() {
        return Err(AppError::InvalidInput("Username cannot be empty".to_string()));
    }

    let user = store.create_user(&request).await?;
    tracing::info!(user = %user.email, "User registered");
    Ok(user)
}

/// Looks up a user, turning absence into `NotFound`
pub async fn require_user(store: &dyn TravelStore, email: &str) -> AppResult<User> {
    store
        .find_user(email)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", email)))
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}
