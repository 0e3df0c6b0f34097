//! Bowl Entity
//!
//! The shared, owned collection of entries and members. A bowl's type
//! decides what "juggling" it does with them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::entity::{DomainError, Entity};
use super::entry::Entry;
use super::user::Member;

/// Resolution variant of a bowl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BowlType {
    /// Draw one entry and take it out of the bowl
    #[default]
    PickOneDiscard,
    /// Draw one entry and leave it in
    PickOneKeep,
    /// Random running order of members
    ShuffleMembers,
    /// Random pairs of members
    MakePairs,
    /// Giver/receiver assignment
    SecretSanta,
    /// Random order of entries
    ShuffleEntries,
}

impl BowlType {
    pub const ALL: [BowlType; 6] = [
        BowlType::PickOneDiscard,
        BowlType::PickOneKeep,
        BowlType::ShuffleMembers,
        BowlType::MakePairs,
        BowlType::SecretSanta,
        BowlType::ShuffleEntries,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BowlType::PickOneDiscard => "PICK_ONE_DISCARD",
            BowlType::PickOneKeep => "PICK_ONE_KEEP",
            BowlType::ShuffleMembers => "SHUFFLE_MEMBERS",
            BowlType::MakePairs => "MAKE_PAIRS",
            BowlType::SecretSanta => "SECRET_SANTA",
            BowlType::ShuffleEntries => "SHUFFLE_ENTRIES",
        }
    }

    /// Human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            BowlType::PickOneDiscard => "Pick one (discard)",
            BowlType::PickOneKeep => "Pick one (keep)",
            BowlType::ShuffleMembers => "Shuffle members",
            BowlType::MakePairs => "Make pairs",
            BowlType::SecretSanta => "Secret Santa",
            BowlType::ShuffleEntries => "Shuffle entries",
        }
    }

    /// Types only the owner may resolve
    pub fn owner_only(&self) -> bool {
        !matches!(self, BowlType::PickOneDiscard | BowlType::PickOneKeep)
    }

    /// Types that draw from members rather than entries
    pub fn uses_members(&self) -> bool {
        matches!(
            self,
            BowlType::ShuffleMembers | BowlType::MakePairs | BowlType::SecretSanta
        )
    }
}

impl fmt::Display for BowlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BowlType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        BowlType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| DomainError::InvalidInput(format!("unknown bowl type '{}'", s)))
    }
}

/// The bowl aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bowl {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub owner_id: String,
    pub owner_name: String,
    #[serde(default)]
    pub list_members: Vec<Member>,
    #[serde(default)]
    pub list_entries: Vec<Entry>,
    /// 0 = unbounded. Carried but not enforced.
    #[serde(default)]
    pub member_limit: u32,
    /// 0 = unbounded; per non-owner member
    #[serde(default)]
    pub input_count: u32,
    #[serde(rename = "type", default)]
    pub bowl_type: BowlType,
    /// Last resolution result; absent until the first one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Store version, bumped on every successful replace
    #[serde(default)]
    pub revision: u64,
}

/// What the bowl list shows for one bowl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BowlSummary {
    pub id: String,
    pub name: String,
    pub owner_name: String,
    pub bowl_type: BowlType,
    pub member_count: usize,
    pub entry_count: usize,
}

impl Bowl {
    pub fn is_owner(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }

    pub fn is_member(&self, user_id: &str) -> bool {
        self.list_members.iter().any(|m| m.id == user_id)
    }

    /// Number of entries contributed by `user_id`
    pub fn entry_count_for(&self, user_id: &str) -> usize {
        self.list_entries.iter().filter(|e| e.user_id == user_id).count()
    }

    /// Exact, case-sensitive text match
    pub fn has_entry_text(&self, text: &str) -> bool {
        self.list_entries.iter().any(|e| e.text == text)
    }

    pub fn summary(&self) -> BowlSummary {
        BowlSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            owner_name: self.owner_name.clone(),
            bowl_type: self.bowl_type,
            member_count: self.list_members.len(),
            entry_count: self.list_entries.len(),
        }
    }
}

impl Entity for Bowl {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}
