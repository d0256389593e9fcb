use crate::{
    error::{AppError, AppResult},
    models::{CategoryImportance, CityProfile, Importances, Vote, VoteValue, MAX_SCORE, MIN_SCORE},
    services::catalog::{importance_vector, neutral_importance},
    store::TravelStore,
};

/// Fraction of the gap between importance and city value applied per vote
pub const LEARNING_RATE: f64 = 0.1;

/// Rejects importances outside 1..=10 (NaN included) before a store writes them
pub fn validate_importance(category: &str, importance: f64) -> AppResult<f64> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&importance) {
        return Err(AppError::InvalidInput(format!(
            "Importance for {} must be between {} and {}, got {}",
            category, MIN_SCORE, MAX_SCORE, importance
        )));
    }
    Ok(importance)
}

/// Computes the importances a vote produces for every category the city rates
///
/// A like pulls each importance toward the city's value, a dislike pushes it
/// away by the same amount; results are clamped to 1..=10. Importances of
/// categories the city does not rate are left out of the result.
///
/// The update starts from `current`, whatever earlier votes made of it, so
/// voting again on the same city compounds instead of replaying.
pub fn apply_vote(current: &Importances, city: &CityProfile, value: VoteValue) -> Importances {
    city.categories
        .iter()
        .map(|entry| {
            let importance = current
                .get(&entry.category)
                .copied()
                .unwrap_or_else(neutral_importance);
            let diff = f64::from(entry.value) - importance;

            let updated = match value {
                VoteValue::Like => importance + LEARNING_RATE * diff,
                VoteValue::Dislike => importance - LEARNING_RATE * diff,
            };

            (entry.category.clone(), updated.clamp(MIN_SCORE, MAX_SCORE))
        })
        .collect()
}

/// Records a vote and learns from it
///
/// Unknown users and cities are rejected before anything is written.
pub async fn record_vote(
    store: &dyn TravelStore,
    email: &str,
    city: &str,
    value: VoteValue,
) -> AppResult<Importances> {
    if store.find_user(email).await?.is_none() {
        return Err(AppError::NotFound(format!("User {} not found", email)));
    }
    if store.city_profile(city).await?.is_none() {
        return Err(AppError::NotFound(format!("City {} not found", city)));
    }

    let vote = Vote {
        user: email.to_string(),
        city: city.to_string(),
        value,
    };
    let updated = store.record_vote(&vote).await?;

    tracing::info!(
        user = %email,
        city = %city,
        value = u8::from(value),
        updated_categories = updated.len(),
        "Vote recorded"
    );

    Ok(updated)
}

/// The user's full preference vector in catalog order
pub async fn preference_vector(
    store: &dyn TravelStore,
    email: &str,
) -> AppResult<Vec<CategoryImportance>> {
    if store.find_user(email).await?.is_none() {
        return Err(AppError::NotFound(format!("User {} not found", email)));
    }

    let categories = store.categories().await?;
    let importances = store.user_importance(email).await?;
    let vector = importance_vector(&categories, &importances);

    Ok(categories
        .into_iter()
        .zip(vector)
        .map(|(category, importance)| CategoryImportance {
            category,
            importance,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::store::{MemoryStore, MockTravelStore};

    const EPS: f64 = 1e-9;

    fn importances(pairs: &[(&str, f64)]) -> Importances {
        pairs.iter().map(|(c, v)| (c.to_string(), *v)).collect()
    }

    fn food_beach_city() -> CityProfile {
        CityProfile::new("Nice")
            .with_category("Food", 9, "Socca")
            .with_category("Beach", 9, "Promenade")
    }

    #[test]
    fn test_like_pulls_toward_city_values() {
        let current = importances(&[("Food", 10.0), ("Beach", 1.0)]);
        let updated = apply_vote(&current, &food_beach_city(), VoteValue::Like);

        assert!((updated["Food"] - 9.9).abs() < EPS);
        assert!((updated["Beach"] - 1.8).abs() < EPS);
    }

    #[test]
    fn test_dislike_pushes_away_from_city_values() {
        let current = importances(&[("Food", 6.0), ("Beach", 4.0)]);
        let updated = apply_vote(&current, &food_beach_city(), VoteValue::Dislike);

        // gap to 9 grows for both
        assert!((updated["Food"] - 5.7).abs() < EPS);
        assert!((updated["Beach"] - 3.5).abs() < EPS);
    }

    #[test]
    fn test_updates_clamp_to_range() {
        let city = CityProfile::new("Reykjavik")
            .with_category("Beach", 10, "Black sand")
            .with_category("Nightlife", 1, "Quiet");
        let current = importances(&[("Beach", 1.0), ("Nightlife", 10.0)]);
        let updated = apply_vote(&current, &city, VoteValue::Dislike);

        assert_eq!(updated["Beach"], 1.0);
        assert_eq!(updated["Nightlife"], 10.0);
    }

    #[test]
    fn test_missing_importance_starts_neutral() {
        let city = CityProfile::new("Oslo").with_category("Nature", 10, "Fjords");
        let updated = apply_vote(&Importances::new(), &city, VoteValue::Like);
        assert!((updated["Nature"] - 5.5).abs() < EPS);
    }

    #[test]
    fn test_equal_value_does_not_move() {
        let city = CityProfile::new("Vienna").with_category("Art", 7, "Klimt");
        let current = importances(&[("Art", 7.0)]);

        assert_eq!(apply_vote(&current, &city, VoteValue::Like)["Art"], 7.0);
        assert_eq!(apply_vote(&current, &city, VoteValue::Dislike)["Art"], 7.0);
    }

    #[test]
    fn test_like_moves_toward_and_dislike_away_for_any_start() {
        let city = CityProfile::new("Athens").with_category("History", 8, "Acropolis");
        for start in [1.0, 2.5, 5.0, 7.9, 8.1, 9.0, 10.0] {
            let current = importances(&[("History", start)]);
            let liked = apply_vote(&current, &city, VoteValue::Like)["History"];
            let disliked = apply_vote(&current, &city, VoteValue::Dislike)["History"];

            assert!((liked - 8.0).abs() <= (start - 8.0).abs());
            assert!((disliked - 8.0).abs() >= (start - 8.0).abs());
            assert!((1.0..=10.0).contains(&liked));
            assert!((1.0..=10.0).contains(&disliked));
        }
    }

    #[test]
    fn test_validate_importance_bounds() {
        assert_eq!(validate_importance("Food", 1.0).unwrap(), 1.0);
        assert_eq!(validate_importance("Food", 10.0).unwrap(), 10.0);
        for bad in [0.0, 0.99, 10.01, 42.0, f64::NAN] {
            assert!(matches!(
                validate_importance("Food", bad),
                Err(AppError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_categories_not_on_city_are_untouched() {
        let city = CityProfile::new("Prague").with_category("History", 9, "Old Town");
        let current = importances(&[("History", 5.0), ("Beach", 2.0)]);
        let updated = apply_vote(&current, &city, VoteValue::Like);

        assert_eq!(updated.len(), 1);
        assert!(!updated.contains_key("Beach"));
    }

    #[tokio::test]
    async fn test_like_then_dislike_compounds() {
        let store = MemoryStore::with_catalog(&["Beach", "Food"], vec![food_beach_city()]);
        store
            .create_user(&NewUser {
                email: "ana@example.com".into(),
                username: "ana".into(),
            })
            .await
            .unwrap();
        store.upsert_importance("ana@example.com", "Food", 10.0).await.unwrap();
        store.upsert_importance("ana@example.com", "Beach", 1.0).await.unwrap();

        record_vote(&store, "ana@example.com", "Nice", VoteValue::Like)
            .await
            .unwrap();
        let after = record_vote(&store, "ana@example.com", "Nice", VoteValue::Dislike)
            .await
            .unwrap();

        // Beach: 1 -> 1.8 -> 1.8 - 0.1 * (9 - 1.8) = 1.08
        assert!((after["Beach"] - 1.08).abs() < EPS);
        assert!((after["Beach"] - 1.0).abs() > EPS);
        // Food: 10 -> 9.9 -> 9.9 - 0.1 * (9 - 9.9) = 9.99
        assert!((after["Food"] - 9.99).abs() < EPS);

        assert_eq!(store.voted_cities("ana@example.com").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_record_vote_unknown_city() {
        let store = MemoryStore::with_catalog(&["Food"], vec![]);
        store
            .create_user(&NewUser {
                email: "ana@example.com".into(),
                username: "ana".into(),
            })
            .await
            .unwrap();

        let result = record_vote(&store, "ana@example.com", "Atlantis", VoteValue::Like).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_record_vote_surfaces_storage_failure() {
        let mut store = MockTravelStore::new();
        store.expect_find_user().returning(|email| {
            Ok(Some(crate::models::User {
                email: email.to_string(),
                username: "ana".to_string(),
                created_at: chrono::Utc::now(),
            }))
        });
        store
            .expect_city_profile()
            .returning(|_| Ok(Some(food_beach_city())));
        store
            .expect_record_vote()
            .times(1)
            .returning(|_| Err(AppError::Internal("connection reset".to_string())));

        let result = record_vote(&store, "ana@example.com", "Nice", VoteValue::Like).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_preference_vector_in_catalog_order() {
        let store = MemoryStore::with_catalog(&["Food", "Beach", "Art"], vec![]);
        store
            .create_user(&NewUser {
                email: "ana@example.com".into(),
                username: "ana".into(),
            })
            .await
            .unwrap();
        store.upsert_importance("ana@example.com", "Beach", 8.0).await.unwrap();

        let vector = preference_vector(&store, "ana@example.com").await.unwrap();
        let names: Vec<&str> = vector.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["Art", "Beach", "Food"]);
        assert_eq!(vector[1].importance, 8.0);
        assert_eq!(vector[0].importance, 5.0);
    }
}
