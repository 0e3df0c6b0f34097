//! Entry Entity
//!
//! One text contribution to a bowl.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

/// A single contribution made by a member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Unique identifier
    pub id: String,
    /// Trimmed, non-empty text; unique within its bowl
    pub text: String,
    /// Device id of the contributor
    pub user_id: String,
    /// Contributor name at submission time
    pub user_name: String,
}

impl Entity for Entry {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_json_field_names() {
        let entry = Entry {
            id: "e1".to_string(),
            text: "Pizza".to_string(),
            user_id: "dev-1".to_string(),
            user_name: "Asha".to_string(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["userId"], "dev-1");
        assert_eq!(json["userName"], "Asha");
        assert_eq!(entry.id(), "e1");
    }
}
