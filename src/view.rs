//! Text rendering of bowls and command results.

use chitti_core::commands::{LinkOutcome, ShareMessage};
use chitti_core::domain::Bowl;

/// One bowl as a list card
pub fn bowl_card(bowl: &Bowl, my_id: &str) -> String {
    let summary = bowl.summary();
    let owner = if bowl.is_owner(my_id) {
        format!("{} (you)", summary.owner_name)
    } else {
        summary.owner_name
    };

    format!(
        "{name}  [{kind}]\n  id: {id}\n  Owner: {owner}\n  Members: {members}  Entries: {entries}",
        name = summary.name,
        kind = summary.bowl_type.label(),
        id = summary.id,
        owner = owner,
        members = summary.member_count,
        entries = summary.entry_count,
    )
}

/// A bowl with members, entries and last result
pub fn bowl_detail(bowl: &Bowl, my_id: &str) -> String {
    let mut out = bowl_card(bowl, my_id);
    if !bowl.description.is_empty() {
        out.push_str(&format!("\n  {}", bowl.description));
    }
    if bowl.input_count > 0 {
        out.push_str(&format!("\n  Entries per member: {}", bowl.input_count));
    }

    out.push_str("\n\nMembers:");
    if bowl.list_members.is_empty() {
        out.push_str("\n  (none yet)");
    }
    for member in &bowl.list_members {
        out.push_str(&format!("\n  {}", member.name));
    }

    out.push_str("\n\nEntries:");
    if bowl.list_entries.is_empty() {
        out.push_str("\n  (empty)");
    }
    for entry in &bowl.list_entries {
        out.push_str(&format!("\n  {}  {} (by {})", entry.id, entry.text, entry.user_name));
    }

    if let Some(output) = bowl.output.as_deref().filter(|o| !o.is_empty()) {
        out.push_str("\n\nLast result:\n");
        out.push_str(output);
    }
    out
}

pub fn bowl_list(bowls: &[Bowl], my_id: &str) -> String {
    if bowls.is_empty() {
        return "No bowls yet. Create one or open a shared link.".to_string();
    }
    bowls
        .iter()
        .map(|bowl| bowl_card(bowl, my_id))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn share(message: &ShareMessage) -> String {
    format!("{}\n{}", message.title, message.message)
}

pub fn link_outcome(outcome: &LinkOutcome) -> String {
    match outcome {
        LinkOutcome::Invalid => "Invalid bowl link".to_string(),
        LinkOutcome::NeedsName { bowl_id } => format!(
            "Please set your name first (chitti-udi name <NAME>); bowl {} will be added then.",
            bowl_id
        ),
        LinkOutcome::Joined(bowl) => format!("Joined \"{}\"", bowl.name),
        LinkOutcome::AlreadyJoined(bowl) => format!("\"{}\" is already in your list", bowl.name),
    }
}
