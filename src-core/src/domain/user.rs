//! User and Member
//!
//! A user is the device identity plus its chosen display name.
//! A member is the copy of a user stored inside a bowl.

use serde::{Deserialize, Serialize};

/// The acting device identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Device id, generated once and persisted
    pub id: String,
    /// Display name
    pub name: String,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// True when the display name is blank
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// A user who has added something to a bowl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
}

impl From<&User> for Member {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
        }
    }
}
