use std::collections::HashMap;

use crate::{
    error::{AppError, AppResult},
    models::{CityProfile, GroupCode, Importances},
    services::{
        catalog::{city_vector, importance_vector, neutral_importance},
        similarity::cosine_similarity,
    },
    store::TravelStore,
};

/// Rejects a result limit outside `1..=max`
pub fn check_limit(limit: usize, max: usize) -> AppResult<usize> {
    if limit == 0 || limit > max {
        return Err(AppError::InvalidInput(format!(
            "limit must be between 1 and {}, got {}",
            max, limit
        )));
    }
    Ok(limit)
}

/// Recommends cities the user has not voted on yet
///
/// Cities are ranked by cosine similarity between the user's importance vector
/// and each city's profile vector. Each returned city lists its categories
/// ordered by how important they are to the user.
pub async fn recommend(
    store: &dyn TravelStore,
    email: &str,
    limit: usize,
    max_limit: usize,
) -> AppResult<Vec<CityProfile>> {
    let limit = check_limit(limit, max_limit)?;

    if store.find_user(email).await?.is_none() {
        return Err(AppError::NotFound(format!("User {} not found", email)));
    }

    let categories = store.categories().await?;
    let importances = store.user_importance(email).await?;
    let user_vector = importance_vector(&categories, &importances);

    let voted = store.voted_cities(email).await?;
    let mut candidates = Vec::new();
    for city in store.cities().await? {
        if voted.contains(&city) {
            continue;
        }
        if let Some(profile) = store.city_profile(&city).await? {
            candidates.push(profile);
        }
    }

    tracing::debug!(
        user = %email,
        voted = voted.len(),
        candidates = candidates.len(),
        "Scoring cities for user"
    );

    Ok(rank_cities(&categories, &user_vector, candidates, limit))
}

/// Recommends cities for a group from the members' averaged importances
///
/// Unlike [`recommend`], cities voted by members stay candidates: the group is
/// the target, not any single member. A group without members yields nothing.
pub async fn recommend_for_group(
    store: &dyn TravelStore,
    code: GroupCode,
    limit: usize,
    max_limit: usize,
) -> AppResult<Vec<CityProfile>> {
    let limit = check_limit(limit, max_limit)?;

    let members = store.group_members(code).await?;
    if members.is_empty() {
        return Ok(Vec::new());
    }

    let categories = store.categories().await?;
    let mut member_importances = Vec::with_capacity(members.len());
    for member in &members {
        member_importances.push(store.user_importance(member).await?);
    }
    let group_vector = group_vector(&categories, &member_importances);

    let mut candidates = Vec::new();
    for city in store.cities().await? {
        if let Some(profile) = store.city_profile(&city).await? {
            candidates.push(profile);
        }
    }

    tracing::debug!(
        group = code,
        members = members.len(),
        candidates = candidates.len(),
        "Scoring cities for group"
    );

    Ok(rank_cities(&categories, &group_vector, candidates, limit))
}

/// Per-category mean of the members' importance vectors
///
/// Each member's vector is assembled with the neutral fallback before
/// averaging, so a category a member never rated counts as 5 for them.
pub fn group_vector(categories: &[String], members: &[Importances]) -> Vec<f64> {
    if members.is_empty() {
        return vec![neutral_importance(); categories.len()];
    }

    let count = members.len() as f64;
    let mut mean = vec![0.0; categories.len()];
    for importances in members {
        for (slot, importance) in mean
            .iter_mut()
            .zip(importance_vector(categories, importances))
        {
            *slot += importance / count;
        }
    }
    mean
}

/// Scores, sorts and truncates candidates, then orders each winner's categories
///
/// Sorting is stable, so equally similar cities keep their incoming order
/// (name order from the store) and equally weighted categories keep theirs.
pub fn rank_cities(
    categories: &[String],
    weights: &[f64],
    candidates: Vec<CityProfile>,
    limit: usize,
) -> Vec<CityProfile> {
    let mut scored: Vec<(f64, CityProfile)> = candidates
        .into_iter()
        .map(|city| {
            let score = cosine_similarity(weights, &city_vector(categories, &city));
            (score, city)
        })
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.truncate(limit);

    let weight_of: HashMap<&str, f64> = categories
        .iter()
        .map(String::as_str)
        .zip(weights.iter().copied())
        .collect();

    scored
        .into_iter()
        .map(|(_, mut city)| {
            city.categories.sort_by(|a, b| {
                let wa = weight_of
                    .get(a.category.as_str())
                    .copied()
                    .unwrap_or_else(neutral_importance);
                let wb = weight_of
                    .get(b.category.as_str())
                    .copied()
                    .unwrap_or_else(neutral_importance);
                wb.total_cmp(&wa)
            });
            city
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewUser, VoteValue};
    use crate::services::preferences::record_vote;
    use crate::store::MemoryStore;

    const MAX: usize = 30;

    fn city(name: &str, food: u8, beach: u8, nightlife: u8) -> CityProfile {
        CityProfile::new(name)
            .with_category("Food", food, "food")
            .with_category("Beach", beach, "beach")
            .with_category("Nightlife", nightlife, "nightlife")
    }

    async fn store_with_users(emails: &[&str]) -> MemoryStore {
        let store = MemoryStore::with_catalog(
            &["Beach", "Food", "Nightlife"],
            vec![
                city("Barcelona", 8, 9, 9),
                city("Bologna", 10, 1, 4),
                city("Ibiza", 5, 10, 10),
                city("Lyon", 10, 1, 3),
            ],
        );
        for email in emails {
            store
                .create_user(&NewUser {
                    email: email.to_string(),
                    username: email.split('@').next().unwrap_or(email).to_string(),
                })
                .await
                .unwrap();
        }
        store
    }

    fn names(cities: &[CityProfile]) -> Vec<&str> {
        cities.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_check_limit_bounds() {
        assert!(check_limit(0, MAX).is_err());
        assert!(check_limit(31, MAX).is_err());
        assert_eq!(check_limit(1, MAX).unwrap(), 1);
        assert_eq!(check_limit(30, MAX).unwrap(), 30);
    }

    #[test]
    fn test_group_vector_is_mean() {
        let categories = vec!["Beach".to_string(), "Food".to_string()];
        let members: Vec<Importances> = [10.0, 5.0, 0.0]
            .iter()
            .map(|v| [("Food".to_string(), *v)].into_iter().collect())
            .collect();

        let vector = group_vector(&categories, &members);
        assert!((vector[1] - 5.0).abs() < 1e-12);
        // nobody rated Beach, so everybody counts as neutral
        assert!((vector[0] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_rank_cities_orders_categories_by_weight() {
        let categories = vec!["Beach".to_string(), "Food".to_string(), "Nightlife".to_string()];
        let weights = vec![2.0, 10.0, 6.0];
        let ranked = rank_cities(&categories, &weights, vec![city("Lyon", 10, 1, 3)], 5);

        let order: Vec<&str> = ranked[0]
            .categories
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        assert_eq!(order, vec!["Food", "Nightlife", "Beach"]);
    }

    #[test]
    fn test_rank_cities_ties_keep_input_order() {
        let categories = vec!["Food".to_string()];
        let weights = vec![7.0];
        let candidates = vec![
            CityProfile::new("Athens").with_category("Food", 3, ""),
            CityProfile::new("Berlin").with_category("Food", 9, ""),
            CityProfile::new("Cork").with_category("Food", 6, ""),
        ];

        // one dimension: every positive vector is equally similar
        let ranked = rank_cities(&categories, &weights, candidates, 3);
        assert_eq!(names(&ranked), vec!["Athens", "Berlin", "Cork"]);
    }

    #[tokio::test]
    async fn test_recommend_prefers_similar_cities() {
        let store = store_with_users(&["ana@example.com"]).await;
        store.upsert_importance("ana@example.com", "Food", 10.0).await.unwrap();
        store.upsert_importance("ana@example.com", "Beach", 1.0).await.unwrap();
        store.upsert_importance("ana@example.com", "Nightlife", 3.0).await.unwrap();

        let result = recommend(&store, "ana@example.com", 2, MAX).await.unwrap();
        assert_eq!(names(&result), vec!["Lyon", "Bologna"]);
        assert_eq!(result[0].categories[0].category, "Food");
    }

    #[tokio::test]
    async fn test_recommend_excludes_voted_cities() {
        let store = store_with_users(&["ana@example.com"]).await;
        record_vote(&store, "ana@example.com", "Ibiza", VoteValue::Like)
            .await
            .unwrap();
        record_vote(&store, "ana@example.com", "Lyon", VoteValue::Dislike)
            .await
            .unwrap();

        let result = recommend(&store, "ana@example.com", MAX, MAX).await.unwrap();
        let result = names(&result);
        assert_eq!(result.len(), 2);
        assert!(!result.contains(&"Ibiza"));
        assert!(!result.contains(&"Lyon"));
    }

    #[tokio::test]
    async fn test_recommend_empty_when_everything_voted() {
        let store = store_with_users(&["ana@example.com"]).await;
        for city in ["Barcelona", "Bologna", "Ibiza", "Lyon"] {
            record_vote(&store, "ana@example.com", city, VoteValue::Like)
                .await
                .unwrap();
        }

        let result = recommend(&store, "ana@example.com", 10, MAX).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_recommend_unknown_user() {
        let store = store_with_users(&[]).await;
        let result = recommend(&store, "ghost@example.com", 10, MAX).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_recommend_rejects_limit_before_lookup() {
        let store = store_with_users(&[]).await;
        // unknown user, but the limit is checked first
        let result = recommend(&store, "ghost@example.com", 0, MAX).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_group_with_one_member_matches_individual_ranking() {
        let store = store_with_users(&["ana@example.com"]).await;
        store.upsert_importance("ana@example.com", "Beach", 9.0).await.unwrap();
        store.upsert_importance("ana@example.com", "Nightlife", 8.0).await.unwrap();
        store.create_group(4242, "ana@example.com").await.unwrap();

        let group = recommend_for_group(&store, 4242, MAX, MAX).await.unwrap();
        let individual = recommend(&store, "ana@example.com", MAX, MAX).await.unwrap();
        assert_eq!(group, individual);
    }

    #[tokio::test]
    async fn test_group_keeps_voted_cities() {
        let store = store_with_users(&["ana@example.com", "ben@example.com"]).await;
        store.create_group(1111, "ana@example.com").await.unwrap();
        store.add_group_member(1111, "ben@example.com").await.unwrap();
        record_vote(&store, "ana@example.com", "Ibiza", VoteValue::Like)
            .await
            .unwrap();

        let result = recommend_for_group(&store, 1111, MAX, MAX).await.unwrap();
        assert_eq!(result.len(), 4);
        assert!(names(&result).contains(&"Ibiza"));
    }

    #[tokio::test]
    async fn test_group_averages_members() {
        let store = store_with_users(&["ana@example.com", "ben@example.com"]).await;
        // Ana loves beaches and parties, Ben only eats
        store.upsert_importance("ana@example.com", "Beach", 10.0).await.unwrap();
        store.upsert_importance("ana@example.com", "Nightlife", 10.0).await.unwrap();
        store.upsert_importance("ana@example.com", "Food", 1.0).await.unwrap();
        store.upsert_importance("ben@example.com", "Beach", 1.0).await.unwrap();
        store.upsert_importance("ben@example.com", "Nightlife", 1.0).await.unwrap();
        store.upsert_importance("ben@example.com", "Food", 10.0).await.unwrap();
        store.create_group(2222, "ana@example.com").await.unwrap();
        store.add_group_member(2222, "ben@example.com").await.unwrap();

        // the compromise is the all-rounder
        let result = recommend_for_group(&store, 2222, 1, MAX).await.unwrap();
        assert_eq!(names(&result), vec!["Barcelona"]);
    }

    #[tokio::test]
    async fn test_group_without_members_is_empty() {
        let store = store_with_users(&[]).await;
        let result = recommend_for_group(&store, 9999, 10, MAX).await.unwrap();
        assert!(result.is_empty());
    }
}
