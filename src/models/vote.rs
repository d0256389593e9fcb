use serde::{Deserialize, Serialize};

/// Binary feedback on a city; `1` on the wire is a like, `0` a dislike
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub enum VoteValue {
    Dislike,
    Like,
}

impl TryFrom<u8> for VoteValue {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(VoteValue::Dislike),
            1 => Ok(VoteValue::Like),
            other => Err(format!("vote value must be 0 or 1, got {}", other)),
        }
    }
}

impl From<VoteValue> for u8 {
    fn from(value: VoteValue) -> Self {
        match value {
            VoteValue::Dislike => 0,
            VoteValue::Like => 1,
        }
    }
}

/// A user's current vote on a city. At most one exists per (user, city).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    pub user: String,
    pub city: String,
    pub value: VoteValue,
}
