/// Storage abstraction for the recommendation engine
///
/// The engine never talks to a database directly: it receives a `TravelStore`
/// handle and reads categories, city profiles, importances, votes and group
/// membership through it. Implementations exist for Postgres, for process
/// memory, and a Redis-caching decorator for the immutable catalog reads.
use std::collections::HashSet;

use crate::{
    error::AppResult,
    models::{
        Catalog, CityKey, CityProfile, Group, GroupCode, Importances, NewUser, User, UserKey, Vote,
    },
};

pub mod cached;
pub mod memory;
pub mod postgres;

pub use cached::CachedStore;
pub use memory::MemoryStore;
pub use postgres::PostgresStore;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TravelStore: Send + Sync {
    /// All category names in a stable order (sorted by name)
    async fn categories(&self) -> AppResult<Vec<String>>;

    /// All city names, sorted by name
    async fn cities(&self) -> AppResult<Vec<CityKey>>;

    /// A city's category ratings, or `None` for an unknown city
    async fn city_profile(&self, city: &str) -> AppResult<Option<CityProfile>>;

    /// Inserts categories and city profiles that are not present yet
    async fn load_catalog(&self, catalog: &Catalog) -> AppResult<()>;

    async fn find_user(&self, email: &str) -> AppResult<Option<User>>;

    /// Registers a user and writes the neutral importance for every known category
    ///
    /// Fails with `Conflict` when the email or the username is taken.
    async fn create_user(&self, user: &NewUser) -> AppResult<User>;

    /// Explicit importances of a user. Categories without a row are absent.
    async fn user_importance(&self, email: &str) -> AppResult<Importances>;

    /// Fails with `InvalidInput` outside 1..=10 and `NotFound` for an unknown
    /// user or category
    async fn upsert_importance(&self, email: &str, category: &str, importance: f64)
        -> AppResult<()>;

    /// Cities the user has voted on, like or dislike
    async fn voted_cities(&self, email: &str) -> AppResult<HashSet<CityKey>>;

    /// Stores the vote (overwriting a previous one) and applies the preference
    /// update, as a single transaction
    ///
    /// Returns the importances written for the city's categories.
    async fn record_vote(&self, vote: &Vote) -> AppResult<Importances>;

    async fn find_group(&self, code: GroupCode) -> AppResult<Option<Group>>;

    /// Members of a group. Unknown groups have no members.
    async fn group_members(&self, code: GroupCode) -> AppResult<Vec<UserKey>>;

    /// Creates a group with `creator` as its first member
    ///
    /// Fails with `Conflict` when the code is already in use.
    async fn create_group(&self, code: GroupCode, creator: &str) -> AppResult<Group>;

    /// Fails with `Conflict` when the user is already a member
    async fn add_group_member(&self, code: GroupCode, email: &str) -> AppResult<()>;

    /// Codes of the groups a user belongs to, ascending
    async fn user_groups(&self, email: &str) -> AppResult<Vec<GroupCode>>;
}
