use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::{
        Catalog, CityKey, CityProfile, Group, GroupCode, Importances, NewUser, User, UserKey, Vote,
        VoteValue,
    },
    services::{
        catalog::neutral_importance,
        preferences::{apply_vote, validate_importance},
    },
};

use super::TravelStore;

/// Process-local store used when no database is configured, and by tests
///
/// Every operation takes the lock once, so a vote's read-modify-write of the
/// user's importances cannot interleave with another vote.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    categories: BTreeSet<String>,
    cities: BTreeMap<CityKey, CityProfile>,
    users: HashMap<UserKey, User>,
    importances: HashMap<UserKey, Importances>,
    votes: HashMap<UserKey, HashMap<CityKey, VoteValue>>,
    groups: BTreeMap<GroupCode, Vec<UserKey>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store already holding the given categories and cities
    pub fn with_catalog(categories: &[&str], cities: Vec<CityProfile>) -> Self {
        let mut inner = MemoryInner::default();
        inner.insert_catalog(&Catalog {
            categories: categories.iter().map(|c| c.to_string()).collect(),
            cities,
        });
        Self {
            inner: RwLock::new(inner),
        }
    }
}

impl MemoryInner {
    fn insert_catalog(&mut self, catalog: &Catalog) {
        self.categories.extend(catalog.categories.iter().cloned());
        for city in &catalog.cities {
            self.cities
                .entry(city.name.clone())
                .or_insert_with(|| city.clone());
        }
    }

    fn require_user(&self, email: &str) -> AppResult<()> {
        if self.users.contains_key(email) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("User {} not found", email)))
        }
    }
}

#[async_trait::async_trait]
impl TravelStore for MemoryStore {
    async fn categories(&self) -> AppResult<Vec<String>> {
        Ok(self.inner.read().await.categories.iter().cloned().collect())
    }

    async fn cities(&self) -> AppResult<Vec<CityKey>> {
        Ok(self.inner.read().await.cities.keys().cloned().collect())
    }

    async fn city_profile(&self, city: &str) -> AppResult<Option<CityProfile>> {
        let inner = self.inner.read().await;
        Ok(inner.cities.get(city).map(|profile| {
            let mut profile = profile.clone();
            profile
                .categories
                .sort_by(|a, b| a.category.cmp(&b.category));
            profile
        }))
    }

    async fn load_catalog(&self, catalog: &Catalog) -> AppResult<()> {
        self.inner.write().await.insert_catalog(catalog);
        Ok(())
    }

    async fn find_user(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.inner.read().await.users.get(email).cloned())
    }

    async fn create_user(&self, user: &NewUser) -> AppResult<User> {
        let mut inner = self.inner.write().await;

        if inner.users.contains_key(&user.email) {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        if inner.users.values().any(|u| u.username == user.username) {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        let created = User {
            email: user.email.clone(),
            username: user.username.clone(),
            created_at: Utc::now(),
        };
        let neutral: Importances = inner
            .categories
            .iter()
            .map(|category| (category.clone(), neutral_importance()))
            .collect();

        inner.users.insert(user.email.clone(), created.clone());
        inner.importances.insert(user.email.clone(), neutral);

        Ok(created)
    }

    async fn user_importance(&self, email: &str) -> AppResult<Importances> {
        let inner = self.inner.read().await;
        Ok(inner.importances.get(email).cloned().unwrap_or_default())
    }

    async fn upsert_importance(
        &self,
        email: &str,
        category: &str,
        importance: f64,
    ) -> AppResult<()> {
        let importance = validate_importance(category, importance)?;
        let mut inner = self.inner.write().await;
        inner.require_user(email)?;
        if !inner.categories.contains(category) {
            return Err(AppError::NotFound(format!(
                "Category {} not found",
                category
            )));
        }
        inner
            .importances
            .entry(email.to_string())
            .or_default()
            .insert(category.to_string(), importance);
        Ok(())
    }

    async fn voted_cities(&self, email: &str) -> AppResult<HashSet<CityKey>> {
        let inner = self.inner.read().await;
        Ok(inner
            .votes
            .get(email)
            .map(|votes| votes.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn record_vote(&self, vote: &Vote) -> AppResult<Importances> {
        let mut inner = self.inner.write().await;
        inner.require_user(&vote.user)?;
        let city = inner
            .cities
            .get(&vote.city)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("City {} not found", vote.city)))?;

        inner
            .votes
            .entry(vote.user.clone())
            .or_default()
            .insert(vote.city.clone(), vote.value);

        let current = inner.importances.entry(vote.user.clone()).or_default();
        let updated = apply_vote(current, &city, vote.value);
        current.extend(updated.iter().map(|(c, v)| (c.clone(), *v)));

        Ok(updated)
    }

    async fn find_group(&self, code: GroupCode) -> AppResult<Option<Group>> {
        let inner = self.inner.read().await;
        Ok(inner.groups.get(&code).map(|members| Group {
            code,
            members: members.clone(),
        }))
    }

    async fn group_members(&self, code: GroupCode) -> AppResult<Vec<UserKey>> {
        let inner = self.inner.read().await;
        Ok(inner.groups.get(&code).cloned().unwrap_or_default())
    }

    async fn create_group(&self, code: GroupCode, creator: &str) -> AppResult<Group> {
        let mut inner = self.inner.write().await;
        inner.require_user(creator)?;
        if inner.groups.contains_key(&code) {
            return Err(AppError::Conflict("Group code already in use".to_string()));
        }

        let members = vec![creator.to_string()];
        inner.groups.insert(code, members.clone());
        Ok(Group { code, members })
    }

    async fn add_group_member(&self, code: GroupCode, email: &str) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.require_user(email)?;
        let members = inner
            .groups
            .get_mut(&code)
            .ok_or_else(|| AppError::NotFound(format!("Group {} not found", code)))?;

        if members.iter().any(|member| member == email) {
            return Err(AppError::Conflict("User already in group".to_string()));
        }
        members.push(email.to_string());
        Ok(())
    }

    async fn user_groups(&self, email: &str) -> AppResult<Vec<GroupCode>> {
        let inner = self.inner.read().await;
        Ok(inner
            .groups
            .iter()
            .filter(|(_, members)| members.iter().any(|member| member == email))
            .map(|(code, _)| *code)
            .collect())
    }
}
