use rand::seq::SliceRandom;

use crate::{
    error::{AppError, AppResult},
    models::{CityKey, CityProfile},
    services::{recommendations::check_limit, users::require_user},
    store::TravelStore,
};

pub async fn list_cities(store: &dyn TravelStore) -> AppResult<Vec<CityKey>> {
    store.cities().await
}

pub async fn city_profile(store: &dyn TravelStore, name: &str) -> AppResult<CityProfile> {
    store
        .city_profile(name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("City {} not found", name)))
}

/// Picks random cities the user has not voted on yet, for onboarding
///
/// Returns fewer than `limit` cities when fewer remain, and none once the
/// user has voted on everything.
pub async fn evaluation_sample(
    store: &dyn TravelStore,
    email: &str,
    limit: usize,
    max_limit: usize,
) -> AppResult<Vec<CityProfile>> {
    let limit = check_limit(limit, max_limit)?;
    require_user(store, email).await?;

    let voted = store.voted_cities(email).await?;
    let remaining: Vec<CityKey> = store
        .cities()
        .await?
        .into_iter()
        .filter(|city| !voted.contains(city))
        .collect();

    let picked: Vec<CityKey> = remaining
        .choose_multiple(&mut rand::thread_rng(), limit)
        .cloned()
        .collect();

    let mut sample = Vec::with_capacity(picked.len());
    for city in picked {
        if let Some(profile) = store.city_profile(&city).await? {
            sample.push(profile);
        }
    }

    tracing::debug!(
        user = %email,
        remaining = remaining.len(),
        sampled = sample.len(),
        "Evaluation sample drawn"
    );

    Ok(sample)
}
