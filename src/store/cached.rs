use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::AppResult,
    models::{
        Catalog, CityKey, CityProfile, Group, GroupCode, Importances, NewUser, User, UserKey, Vote,
    },
};

use super::TravelStore;

/// Serves catalog reads (categories, city names, city profiles) from Redis
///
/// The catalog is reference data that user actions never change, so it is
/// safe to cache. Everything user-owned goes straight to the wrapped store.
pub struct CachedStore {
    inner: Arc<dyn TravelStore>,
    cache: Cache,
    ttl: u64,
}

impl CachedStore {
    pub fn new(inner: Arc<dyn TravelStore>, cache: Cache, ttl: u64) -> Self {
        Self { inner, cache, ttl }
    }
}

#[async_trait::async_trait]
impl TravelStore for CachedStore {
    async fn categories(&self) -> AppResult<Vec<String>> {
        cached!(self.cache, CacheKey::Categories, self.ttl, async {
            self.inner.categories().await
        })
    }

    async fn cities(&self) -> AppResult<Vec<CityKey>> {
        cached!(self.cache, CacheKey::Cities, self.ttl, async {
            self.inner.cities().await
        })
    }

    async fn city_profile(&self, city: &str) -> AppResult<Option<CityProfile>> {
        let key = CacheKey::CityProfile(city.to_string());
        if let Some(profile) = self.cache.get_from_cache::<CityProfile>(&key).await? {
            // keys are case-insensitive, names are not
            if profile.name == city {
                return Ok(Some(profile));
            }
        }

        // unknown cities are not cached, the catalog may still grow
        let profile = self.inner.city_profile(city).await?;
        if let Some(profile) = &profile {
            self.cache.set_in_background(&key, profile, self.ttl);
        }
        Ok(profile)
    }

    async fn load_catalog(&self, catalog: &Catalog) -> AppResult<()> {
        self.inner.load_catalog(catalog).await?;

        let mut stale = vec![CacheKey::Categories, CacheKey::Cities];
        stale.extend(
            catalog
                .cities
                .iter()
                .map(|city| CacheKey::CityProfile(city.name.clone())),
        );
        self.cache.invalidate(&stale).await
    }

    async fn find_user(&self, email: &str) -> AppResult<Option<User>> {
        self.inner.find_user(email).await
    }

    async fn create_user(&self, user: &NewUser) -> AppResult<User> {
        self.inner.create_user(user).await
    }

    async fn user_importance(&self, email: &str) -> AppResult<Importances> {
        self.inner.user_importance(email).await
    }

    async fn upsert_importance(
        &self,
        email: &str,
        category: &str,
        importance: f64,
    ) -> AppResult<()> {
        self.inner.upsert_importance(email, category, importance).await
    }

    async fn voted_cities(&self, email: &str) -> AppResult<HashSet<CityKey>> {
        self.inner.voted_cities(email).await
    }

    async fn record_vote(&self, vote: &Vote) -> AppResult<Importances> {
        self.inner.record_vote(vote).await
    }

    async fn find_group(&self, code: GroupCode) -> AppResult<Option<Group>> {
        self.inner.find_group(code).await
    }

    async fn group_members(&self, code: GroupCode) -> AppResult<Vec<UserKey>> {
        self.inner.group_members(code).await
    }

    async fn create_group(&self, code: GroupCode, creator: &str) -> AppResult<Group> {
        self.inner.create_group(code, creator).await
    }

    async fn add_group_member(&self, code: GroupCode, email: &str) -> AppResult<()> {
        self.inner.add_group_member(code, email).await
    }

    async fn user_groups(&self, email: &str) -> AppResult<Vec<GroupCode>> {
        self.inner.user_groups(email).await
    }
}
