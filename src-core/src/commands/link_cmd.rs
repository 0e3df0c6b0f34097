//! Link Commands
//!
//! Shared bowl links (`{base}/bowl/{id}`): building them, and joining a
//! bowl when one is opened.

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

use crate::commands::bowl_cmd::get_bowl;
use crate::commands::session_cmd::{remember_bowl, user_name};
use crate::domain::{Bowl, DomainError, DomainResult};
use crate::repository::keys;
use crate::AppState;

const BOWL_SEGMENT: &str = "/bowl/";

/// What opening a link did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkOutcome {
    /// No bowl id in the link
    Invalid,
    /// Parked until a name is set; see `resume_pending_join`
    NeedsName { bowl_id: String },
    Joined(Bowl),
    AlreadyJoined(Bowl),
}

/// Payload for the platform share sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareMessage {
    pub title: String,
    pub url: String,
    pub message: String,
}

/// Extract the bowl id from a link such as `https://host/bowl/{id}?x=y`.
pub fn parse_bowl_link(url: &str) -> Option<String> {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let path = &url[..end];

    let start = path.find(BOWL_SEGMENT)? + BOWL_SEGMENT.len();
    let segment = path[start..].split('/').next()?;
    let id = percent_decode_str(segment).decode_utf8().ok()?;
    let id = id.trim();

    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// Handle an opened link. Without a stored name the id is kept in
/// `pendingBowlId` and joined later.
pub async fn open_bowl_link(state: &AppState, url: &str) -> DomainResult<LinkOutcome> {
    let Some(bowl_id) = parse_bowl_link(url) else {
        log::warn!("ignoring link without bowl id: {}", url);
        return Ok(LinkOutcome::Invalid);
    };

    if user_name(state).await?.is_none() {
        state.device_store.set(keys::PENDING_BOWL_ID, &bowl_id).await?;
        return Ok(LinkOutcome::NeedsName { bowl_id });
    }

    join_bowl(state, &bowl_id).await
}

/// Fetch the bowl and add it to this device's list if new.
pub async fn join_bowl(state: &AppState, bowl_id: &str) -> DomainResult<LinkOutcome> {
    let bowl = get_bowl(state, bowl_id).await?;
    if remember_bowl(state, bowl_id).await? {
        log::info!("joined bowl {}", bowl_id);
        Ok(LinkOutcome::Joined(bowl))
    } else {
        Ok(LinkOutcome::AlreadyJoined(bowl))
    }
}

/// Finish a join that was waiting for a name. `None` if nothing was pending.
///
/// The pending id is kept when the store fails, so a later call can retry.
/// It is dropped once the join succeeds or the bowl no longer exists.
pub async fn resume_pending_join(state: &AppState) -> DomainResult<Option<LinkOutcome>> {
    if user_name(state).await?.is_none() {
        return Ok(None);
    }
    let Some(bowl_id) = state.device_store.get(keys::PENDING_BOWL_ID).await? else {
        return Ok(None);
    };

    let outcome = join_bowl(state, &bowl_id).await;
    if matches!(outcome, Ok(_) | Err(DomainError::NotFound(_))) {
        state.device_store.remove(keys::PENDING_BOWL_ID).await?;
    }
    outcome.map(Some)
}

/// Link and message for sharing a bowl
pub async fn share_bowl(state: &AppState, bowl_id: &str) -> DomainResult<ShareMessage> {
    let bowl = get_bowl(state, bowl_id).await?;
    let url = state.config.share_url(&bowl.id);
    Ok(ShareMessage {
        title: "Share Bowl".to_string(),
        message: format!("Check out this bowl! {}", url),
        url,
    })
}
