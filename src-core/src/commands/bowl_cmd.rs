//! Bowl Commands
//!
//! Every change is a read-modify-write against the latest stored bowl:
//! read, apply the engine rule, replace if the revision is unchanged,
//! otherwise re-read and re-validate. Bounded by `max_commit_attempts`.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use tokio::sync::broadcast;

use crate::commands::session_cmd::{forget_bowl, my_bowl_ids, remember_bowl, require_user};
use crate::domain::{Bowl, BowlType, DomainError, DomainResult};
use crate::engine;
use crate::repository::BowlSnapshot;
use crate::AppState;

/// Create a bowl owned by the current user and add it to this device's list.
///
/// Limits arrive as raw form text; anything non-numeric counts as 0.
pub async fn create_bowl(
    state: &AppState,
    name: &str,
    description: &str,
    member_limit: &str,
    input_count: &str,
    bowl_type: BowlType,
) -> DomainResult<Bowl> {
    let owner = require_user(state).await?;
    let bowl = engine::create_bowl(
        &owner,
        name,
        description,
        engine::coerce_limit(member_limit),
        engine::coerce_limit(input_count),
        bowl_type,
    )?;

    let stored = state.bowl_repo.insert(&bowl).await?;
    remember_bowl(state, &stored.id).await?;
    log::info!("bowl {} created by {}", stored.id, owner.id);
    Ok(stored)
}

/// Get bowl by ID
pub async fn get_bowl(state: &AppState, bowl_id: &str) -> DomainResult<Bowl> {
    state
        .bowl_repo
        .find_by_id(bowl_id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("bowl {}", bowl_id)))
}

/// Bowls this device shows, in the order they were added.
/// Ids whose bowl is gone are skipped.
pub async fn list_my_bowls(state: &AppState) -> DomainResult<Vec<Bowl>> {
    let ids = my_bowl_ids(state).await?;
    let mut bowls = Vec::with_capacity(ids.len());
    for id in &ids {
        match state.bowl_repo.find_by_id(id).await? {
            Some(bowl) => bowls.push(bowl),
            None => log::debug!("bowl {} no longer exists", id),
        }
    }
    Ok(bowls)
}

/// Add an entry as the current user
pub async fn add_entry(state: &AppState, bowl_id: &str, text: &str) -> DomainResult<Bowl> {
    let user = require_user(state).await?;
    commit(state, bowl_id, |bowl| engine::submit_entry(bowl, &user, text)).await
}

/// Resolve the bowl according to its type
pub async fn juggle(state: &AppState, bowl_id: &str) -> DomainResult<Bowl> {
    let user = require_user(state).await?;
    let mut rng = StdRng::from_entropy();
    commit(state, bowl_id, |bowl| engine::resolve(bowl, &user, &mut rng)).await
}

/// Remove one entry (owner only)
pub async fn delete_entry(state: &AppState, bowl_id: &str, entry_id: &str) -> DomainResult<Bowl> {
    let user = require_user(state).await?;
    commit(state, bowl_id, |bowl| engine::delete_entry(bowl, &user, entry_id)).await
}

/// Remove all entries and reset the output (owner only)
pub async fn clear_entries(state: &AppState, bowl_id: &str) -> DomainResult<Bowl> {
    let user = require_user(state).await?;
    commit(state, bowl_id, |bowl| engine::clear_entries(bowl, &user)).await
}

/// Delete the bowl from the store and from this device's list (owner only)
pub async fn delete_bowl(state: &AppState, bowl_id: &str) -> DomainResult<()> {
    let user = require_user(state).await?;
    let bowl = get_bowl(state, bowl_id).await?;
    engine::authorize_delete_bowl(&bowl, &user)?;

    state.bowl_repo.delete(bowl_id).await?;
    forget_bowl(state, bowl_id).await?;
    log::info!("bowl {} deleted", bowl_id);
    Ok(())
}

/// Live collection snapshots
pub fn watch_bowls(state: &AppState) -> broadcast::Receiver<BowlSnapshot> {
    state.bowl_repo.subscribe()
}

/// The bowls of `ids` present in `snapshot`, in `ids` order
pub fn visible_bowls(snapshot: &BTreeMap<String, Bowl>, ids: &[String]) -> Vec<Bowl> {
    ids.iter().filter_map(|id| snapshot.get(id).cloned()).collect()
}

/// Apply `transition` to the latest stored bowl and write it back.
async fn commit<F>(state: &AppState, bowl_id: &str, mut transition: F) -> DomainResult<Bowl>
where
    F: FnMut(&Bowl) -> DomainResult<Bowl> + Send,
{
    let attempts = state.config.max_commit_attempts.max(1);
    for attempt in 1..=attempts {
        let current = get_bowl(state, bowl_id).await?;
        let next = transition(&current)?;

        match state.bowl_repo.replace(&next, current.revision).await {
            Ok(saved) => return Ok(saved),
            Err(DomainError::Conflict(reason)) => {
                log::warn!(
                    "bowl {} changed underneath us (attempt {}/{}): {}",
                    bowl_id,
                    attempt,
                    attempts,
                    reason
                );
            }
            Err(e) => return Err(e),
        }
    }

    Err(DomainError::Conflict(format!(
        "bowl {} kept changing; gave up after {} attempts",
        bowl_id, attempts
    )))
}
