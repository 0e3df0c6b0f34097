//! Session Commands
//!
//! Device identity, display name and the list of bowls this device shows.

use serde::{Deserialize, Serialize};

use crate::domain::{new_id, DomainError, DomainResult, User, ValidationError};
use crate::repository::keys;
use crate::AppState;

/// First screen to show on launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaunchRoute {
    /// No name stored yet
    Username,
    Bowls,
}

/// Stable device id, generated on first use
pub async fn device_id(state: &AppState) -> DomainResult<String> {
    if let Some(id) = state.device_store.get(keys::DEVICE_ID).await? {
        if !id.is_empty() {
            return Ok(id);
        }
    }

    let id = new_id();
    state.device_store.set(keys::DEVICE_ID, &id).await?;
    log::info!("generated device id {}", id);
    Ok(id)
}

/// Stored display name, if any
pub async fn user_name(state: &AppState) -> DomainResult<Option<String>> {
    Ok(state
        .device_store
        .get(keys::USER_NAME)
        .await?
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty()))
}

/// Store a new display name (trimmed)
pub async fn set_user_name(state: &AppState, name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::MissingName.into());
    }
    state.device_store.set(keys::USER_NAME, name).await?;
    Ok(name.to_string())
}

/// The acting user, or `None` before a name is chosen
pub async fn current_user(state: &AppState) -> DomainResult<Option<User>> {
    let Some(name) = user_name(state).await? else {
        return Ok(None);
    };
    Ok(Some(User::new(device_id(state).await?, name)))
}

/// The acting user; `MissingName` before a name is chosen
pub async fn require_user(state: &AppState) -> DomainResult<User> {
    current_user(state)
        .await?
        .ok_or_else(|| ValidationError::MissingName.into())
}

pub async fn launch_route(state: &AppState) -> DomainResult<LaunchRoute> {
    Ok(match user_name(state).await? {
        Some(_) => LaunchRoute::Bowls,
        None => LaunchRoute::Username,
    })
}

/// Ids of bowls this device created or joined, oldest first
pub async fn my_bowl_ids(state: &AppState) -> DomainResult<Vec<String>> {
    match state.device_store.get(keys::MY_BOWLS).await? {
        Some(raw) if !raw.is_empty() => serde_json::from_str(&raw)
            .map_err(|e| DomainError::InvalidInput(format!("{}: {}", keys::MY_BOWLS, e))),
        _ => Ok(Vec::new()),
    }
}

async fn save_bowl_ids(state: &AppState, ids: &[String]) -> DomainResult<()> {
    let raw = serde_json::to_string(ids).map_err(DomainError::store)?;
    state.device_store.set(keys::MY_BOWLS, &raw).await
}

/// Append `bowl_id` to the local list; false if it was already there
pub async fn remember_bowl(state: &AppState, bowl_id: &str) -> DomainResult<bool> {
    let mut ids = my_bowl_ids(state).await?;
    if ids.iter().any(|id| id == bowl_id) {
        return Ok(false);
    }
    ids.push(bowl_id.to_string());
    save_bowl_ids(state, &ids).await?;
    Ok(true)
}

pub async fn forget_bowl(state: &AppState, bowl_id: &str) -> DomainResult<()> {
    let mut ids = my_bowl_ids(state).await?;
    let before = ids.len();
    ids.retain(|id| id != bowl_id);
    if ids.len() != before {
        save_bowl_ids(state, &ids).await?;
    }
    Ok(())
}
