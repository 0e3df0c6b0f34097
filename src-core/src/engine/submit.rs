//! Entry submission
//!
//! Two transitions, composed by `submit_entry`: make sure the requester is
//! a member, then append their entry. Either both land or neither does.

use crate::domain::{new_id, Bowl, DomainResult, Entry, Member, User, ValidationError};

/// Add `user` to the member list unless already present.
pub fn add_member_if_absent(bowl: &Bowl, user: &User) -> Bowl {
    let mut next = bowl.clone();
    if !next.is_member(&user.id) {
        next.list_members.push(Member::from(user));
    }
    next
}

/// Append an entry after checking the per-user cap and uniqueness.
///
/// The owner is never capped.
pub fn append_entry(bowl: &Bowl, user: &User, text: &str) -> DomainResult<Bowl> {
    if !bowl.is_owner(&user.id) && bowl.input_count > 0 {
        let used = bowl.entry_count_for(&user.id);
        if used >= bowl.input_count as usize {
            return Err(ValidationError::LimitReached {
                limit: bowl.input_count,
            }
            .into());
        }
    }

    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::EmptyEntry.into());
    }
    if bowl.has_entry_text(text) {
        return Err(ValidationError::DuplicateEntry(text.to_string()).into());
    }

    let mut next = bowl.clone();
    next.list_entries.push(Entry {
        id: new_id(),
        text: text.to_string(),
        user_id: user.id.clone(),
        user_name: user.name.clone(),
    });
    Ok(next)
}

/// Add `text` to the bowl on behalf of `requester`.
pub fn submit_entry(bowl: &Bowl, requester: &User, text: &str) -> DomainResult<Bowl> {
    if !requester.has_name() {
        return Err(ValidationError::MissingName.into());
    }

    let staged = add_member_if_absent(bowl, requester);
    append_entry(&staged, requester, text)
}
