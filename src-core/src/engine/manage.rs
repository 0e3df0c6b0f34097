//! Bowl creation and owner housekeeping.

use crate::domain::{new_id, Bowl, BowlType, DomainResult, User, ValidationError};
use super::access::ensure_owner;

/// Build a new, empty bowl owned by `owner`.
pub fn create_bowl(
    owner: &User,
    name: &str,
    description: &str,
    member_limit: u32,
    input_count: u32,
    bowl_type: BowlType,
) -> DomainResult<Bowl> {
    if !owner.has_name() {
        return Err(ValidationError::MissingName.into());
    }

    Ok(Bowl {
        id: new_id(),
        name: name.trim().to_string(),
        description: description.trim().to_string(),
        owner_id: owner.id.clone(),
        owner_name: owner.name.trim().to_string(),
        list_members: Vec::new(),
        list_entries: Vec::new(),
        member_limit,
        input_count,
        bowl_type,
        output: None,
        revision: 0,
    })
}

/// Parse a limit field the way a form would: leading integer digits,
/// anything else (or a negative number) is 0.
pub fn coerce_limit(raw: &str) -> u32 {
    let raw = raw.trim();
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let digits: String = digits.chars().take_while(|c| c.is_ascii_digit()).collect();
    if negative || digits.is_empty() {
        return 0;
    }
    digits.parse::<u32>().unwrap_or(u32::MAX)
}

/// Remove one entry. Unknown ids are a no-op.
pub fn delete_entry(bowl: &Bowl, requester: &User, entry_id: &str) -> DomainResult<Bowl> {
    ensure_owner(bowl, requester)?;

    let mut next = bowl.clone();
    next.list_entries.retain(|e| e.id != entry_id);
    Ok(next)
}

/// Empty the bowl and reset its output.
pub fn clear_entries(bowl: &Bowl, requester: &User) -> DomainResult<Bowl> {
    ensure_owner(bowl, requester)?;

    let mut next = bowl.clone();
    next.list_entries.clear();
    next.output = Some(String::new());
    Ok(next)
}

/// Removing the document is up to the store; this only checks who asks.
pub fn authorize_delete_bowl(bowl: &Bowl, requester: &User) -> DomainResult<()> {
    ensure_owner(bowl, requester)?;
    Ok(())
}
