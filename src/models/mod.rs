use std::collections::HashMap;

mod city;
mod group;
mod user;
mod vote;

pub use city::{Catalog, CategoryValue, CityProfile};
pub use group::{Group, GroupCode};
pub use user::{CategoryImportance, NewUser, User};
pub use vote::{Vote, VoteValue};

/// Users are keyed by email
pub type UserKey = String;

/// Cities are keyed by name
pub type CityKey = String;

/// A user's learned weight per category name
pub type Importances = HashMap<String, f64>;

/// Lowest importance or profile value a category can carry
pub const MIN_SCORE: f64 = 1.0;

/// Highest importance or profile value a category can carry
pub const MAX_SCORE: f64 = 10.0;
