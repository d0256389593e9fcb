use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::{
        Catalog, CategoryValue, CityKey, CityProfile, Group, GroupCode, Importances, NewUser, User,
        UserKey, Vote,
    },
    services::{
        catalog::neutral_importance,
        preferences::{apply_vote, validate_importance},
    },
};

use super::TravelStore;

/// PostgreSQL implementation of the store
///
/// Each call checks a connection out of the pool and returns it when done.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    email: String,
    username: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            email: row.email,
            username: row.username,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CityCategoryRow {
    category: String,
    value: i16,
    descr: String,
}

impl TryFrom<CityCategoryRow> for CategoryValue {
    type Error = AppError;

    fn try_from(row: CityCategoryRow) -> Result<Self, Self::Error> {
        let value = u8::try_from(row.value).map_err(|_| {
            AppError::Internal(format!(
                "Stored value {} for {} is out of range",
                row.value, row.category
            ))
        })?;
        Ok(Self {
            category: row.category,
            value,
            descr: row.descr,
        })
    }
}

/// Turns a violation of one of the named constraints into `wrap(message)`
fn constraint_or(
    error: sqlx::Error,
    messages: &[(&str, &str)],
    wrap: fn(String) -> AppError,
) -> AppError {
    if let sqlx::Error::Database(db_err) = &error {
        if let Some(constraint) = db_err.constraint() {
            if let Some((_, message)) = messages.iter().find(|(name, _)| *name == constraint) {
                return wrap(message.to_string());
            }
        }
    }
    AppError::Database(error)
}

/// Maps unique violations to `Conflict` with a readable message
fn conflict_or(error: sqlx::Error, messages: &[(&str, &str)]) -> AppError {
    constraint_or(error, messages, AppError::Conflict)
}

/// Maps foreign key violations to `NotFound` with a readable message
fn not_found_or(error: sqlx::Error, messages: &[(&str, &str)]) -> AppError {
    constraint_or(error, messages, AppError::NotFound)
}

async fn fetch_profile(conn: &mut PgConnection, city: &str) -> AppResult<Option<CityProfile>> {
    let exists: Option<(String,)> = sqlx::query_as("SELECT name FROM cities WHERE name = $1")
        .bind(city)
        .fetch_optional(&mut *conn)
        .await?;
    if exists.is_none() {
        return Ok(None);
    }

    let rows: Vec<CityCategoryRow> = sqlx::query_as(
        "SELECT category, value, descr FROM city_categories WHERE city = $1 ORDER BY category",
    )
    .bind(city)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Some(CityProfile {
        name: city.to_string(),
        categories: rows
            .into_iter()
            .map(CategoryValue::try_from)
            .collect::<AppResult<Vec<_>>>()?,
    }))
}

async fn upsert_importance_tx(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
    category: &str,
    importance: f64,
) -> AppResult<()> {
    let importance = validate_importance(category, importance)?;
    sqlx::query(
        r#"
        INSERT INTO user_importance (email, category, importance)
        VALUES ($1, $2, $3)
        ON CONFLICT (email, category) DO UPDATE SET importance = EXCLUDED.importance
        "#,
    )
    .bind(email)
    .bind(category)
    .bind(importance)
    .execute(&mut **tx)
    .await
    .map_err(|e| {
        let unknown_user = format!("User {} not found", email);
        let unknown_category = format!("Category {} not found", category);
        not_found_or(
            e,
            &[
                ("user_importance_email_fkey", unknown_user.as_str()),
                ("user_importance_category_fkey", unknown_category.as_str()),
            ],
        )
    })?;
    Ok(())
}

#[async_trait::async_trait]
impl TravelStore for PostgresStore {
    async fn categories(&self) -> AppResult<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT name FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    async fn cities(&self) -> AppResult<Vec<CityKey>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT name FROM cities ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    async fn city_profile(&self, city: &str) -> AppResult<Option<CityProfile>> {
        let mut conn = self.pool.acquire().await?;
        fetch_profile(&mut conn, city).await
    }

    async fn load_catalog(&self, catalog: &Catalog) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        for category in &catalog.categories {
            sqlx::query("INSERT INTO categories (name) VALUES ($1) ON CONFLICT DO NOTHING")
                .bind(category)
                .execute(&mut *tx)
                .await?;
        }

        for city in &catalog.cities {
            sqlx::query("INSERT INTO cities (name) VALUES ($1) ON CONFLICT DO NOTHING")
                .bind(&city.name)
                .execute(&mut *tx)
                .await?;

            for entry in &city.categories {
                sqlx::query(
                    r#"
                    INSERT INTO city_categories (city, category, value, descr)
                    VALUES ($1, $2, $3, $4)
                    ON CONFLICT (city, category) DO NOTHING
                    "#,
                )
                .bind(&city.name)
                .bind(&entry.category)
                .bind(i16::from(entry.value))
                .bind(&entry.descr)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_user(&self, email: &str) -> AppResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT email, username, created_at FROM users WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(User::from))
    }

    async fn create_user(&self, user: &NewUser) -> AppResult<User> {
        let mut tx = self.pool.begin().await?;

        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (email, username)
            VALUES ($1, $2)
            RETURNING email, username, created_at
            "#,
        )
        .bind(&user.email)
        .bind(&user.username)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            conflict_or(
                e,
                &[
                    ("users_pkey", "Email already registered"),
                    ("users_username_key", "Username already taken"),
                ],
            )
        })?;

        sqlx::query(
            r#"
            INSERT INTO user_importance (email, category, importance)
            SELECT $1, name, $2 FROM categories
            "#,
        )
        .bind(&user.email)
        .bind(neutral_importance())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    async fn user_importance(&self, email: &str) -> AppResult<Importances> {
        let rows: Vec<(String, f64)> =
            sqlx::query_as("SELECT category, importance FROM user_importance WHERE email = $1")
                .bind(email)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().collect())
    }

    async fn upsert_importance(
        &self,
        email: &str,
        category: &str,
        importance: f64,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        upsert_importance_tx(&mut tx, email, category, importance).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn voted_cities(&self, email: &str) -> AppResult<HashSet<CityKey>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT city FROM votes WHERE email = $1")
            .bind(email)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(city,)| city).collect())
    }

    async fn record_vote(&self, vote: &Vote) -> AppResult<Importances> {
        let mut tx = self.pool.begin().await?;

        // Serializes concurrent votes of the same user
        let locked: Option<(String,)> =
            sqlx::query_as("SELECT email FROM users WHERE email = $1 FOR UPDATE")
                .bind(&vote.user)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(AppError::NotFound(format!("User {} not found", vote.user)));
        }

        let city = fetch_profile(&mut *tx, &vote.city)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("City {} not found", vote.city)))?;

        sqlx::query(
            r#"
            INSERT INTO votes (email, city, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (email, city) DO UPDATE SET value = EXCLUDED.value, voted_at = now()
            "#,
        )
        .bind(&vote.user)
        .bind(&vote.city)
        .bind(i16::from(u8::from(vote.value)))
        .execute(&mut *tx)
        .await?;

        let current: Vec<(String, f64)> =
            sqlx::query_as("SELECT category, importance FROM user_importance WHERE email = $1")
                .bind(&vote.user)
                .fetch_all(&mut *tx)
                .await?;
        let current: Importances = current.into_iter().collect();

        let updated = apply_vote(&current, &city, vote.value);
        for (category, importance) in &updated {
            upsert_importance_tx(&mut tx, &vote.user, category, *importance).await?;
        }

        tx.commit().await?;
        Ok(updated)
    }

    async fn find_group(&self, code: GroupCode) -> AppResult<Option<Group>> {
        let exists: Option<(i32,)> = sqlx::query_as("SELECT code FROM groups WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        match exists {
            Some(_) => Ok(Some(Group {
                code,
                members: self.group_members(code).await?,
            })),
            None => Ok(None),
        }
    }

    async fn group_members(&self, code: GroupCode) -> AppResult<Vec<UserKey>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT email FROM group_members WHERE code = $1 ORDER BY joined_at, email",
        )
        .bind(code)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(email,)| email).collect())
    }

    async fn create_group(&self, code: GroupCode, creator: &str) -> AppResult<Group> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO groups (code) VALUES ($1)")
            .bind(code)
            .execute(&mut *tx)
            .await
            .map_err(|e| conflict_or(e, &[("groups_pkey", "Group code already in use")]))?;

        sqlx::query("INSERT INTO group_members (code, email) VALUES ($1, $2)")
            .bind(code)
            .bind(creator)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Group {
            code,
            members: vec![creator.to_string()],
        })
    }

    async fn add_group_member(&self, code: GroupCode, email: &str) -> AppResult<()> {
        sqlx::query("INSERT INTO group_members (code, email) VALUES ($1, $2)")
            .bind(code)
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_or(e, &[("group_members_pkey", "User already in group")]))?;
        Ok(())
    }

    async fn user_groups(&self, email: &str) -> AppResult<Vec<GroupCode>> {
        let rows: Vec<(i32,)> =
            sqlx::query_as("SELECT code FROM group_members WHERE email = $1 ORDER BY code")
                .bind(email)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(code,)| code).collect())
    }
}
