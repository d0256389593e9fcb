use serde::{Deserialize, Serialize};

pub type GroupCode = i32;

/// Users sharing a numeric code. Membership only grows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Group {
    pub code: GroupCode,
    pub members: Vec<String>,
}
