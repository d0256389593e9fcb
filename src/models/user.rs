use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub email: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Registration payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub username: String,
}

impl NewUser {
    /// Trims surrounding whitespace and lowercases the email
    pub fn normalized(self) -> Self {
        Self {
            email: self.email.trim().to_lowercase(),
            username: self.username.trim().to_string(),
        }
    }
}

/// One entry of a user's preference vector
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryImportance {
    pub category: String,
    pub importance: f64,
}
