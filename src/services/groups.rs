use rand::Rng;

use crate::{
    error::{AppError, AppResult},
    models::{CityProfile, Group, GroupCode},
    services::{recommendations, users::require_user},
    store::TravelStore,
};

/// Range random group codes are drawn from
pub const GENERATED_CODES: std::ops::RangeInclusive<GroupCode> = 1000..=9999;

const MAX_CODE_ATTEMPTS: usize = 64;

/// Creates a group with the caller as first member
///
/// Without an explicit code a random unused four-digit code is picked.
pub async fn create_group(
    store: &dyn TravelStore,
    creator: &str,
    code: Option<GroupCode>,
) -> AppResult<Group> {
    require_user(store, creator).await?;

    let code = match code {
        Some(code) if code <= 0 => {
            return Err(AppError::InvalidInput(
                "Group code must be positive".to_string(),
            ))
        }
        Some(code) => code,
        None => unused_code(store).await?,
    };

    let group = store.create_group(code, creator).await?;
    tracing::info!(group = code, user = %creator, "Group created");
    Ok(group)
}

async fn unused_code(store: &dyn TravelStore) -> AppResult<GroupCode> {
    for _ in 0..MAX_CODE_ATTEMPTS {
        let candidate = rand::thread_rng().gen_range(GENERATED_CODES);
        if store.find_group(candidate).await?.is_none() {
            return Ok(candidate);
        }
    }
    Err(AppError::Conflict(
        "Could not find a free group code".to_string(),
    ))
}

/// Adds the caller to an existing group, up to `max_members`
pub async fn join_group(
    store: &dyn TravelStore,
    email: &str,
    code: GroupCode,
    max_members: usize,
) -> AppResult<Group> {
    require_user(store, email).await?;

    let group = store
        .find_group(code)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Group {} not found", code)))?;

    if group.members.iter().any(|member| member == email) {
        return Err(AppError::Conflict("User already in group".to_string()));
    }
    if group.members.len() >= max_members {
        return Err(AppError::Conflict("Group is full".to_string()));
    }

    store.add_group_member(code, email).await?;
    tracing::info!(group = code, user = %email, "User joined group");

    Ok(Group {
        code,
        members: store.group_members(code).await?,
    })
}

/// Groups the user belongs to, with their members
pub async fn user_groups(store: &dyn TravelStore, email: &str) -> AppResult<Vec<Group>> {
    require_user(store, email).await?;

    let mut groups = Vec::new();
    for code in store.user_groups(email).await? {
        groups.push(Group {
            code,
            members: store.group_members(code).await?,
        });
    }
    Ok(groups)
}

/// Group recommendations, restricted to members of the group
pub async fn group_recommendations(
    store: &dyn TravelStore,
    email: &str,
    code: GroupCode,
    limit: usize,
    max_limit: usize,
) -> AppResult<Vec<CityProfile>> {
    recommendations::check_limit(limit, max_limit)?;

    let group = store
        .find_group(code)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Group {} not found", code)))?;

    if !group.members.iter().any(|member| member == email) {
        return Err(AppError::Forbidden("User not in group".to_string()));
    }

    recommendations::recommend_for_group(store, code, limit, max_limit).await
}
