//! Who may do what to a bowl.

use crate::domain::{AuthorizationError, Bowl, User};

/// Owner-only operations: delete entry, clear, delete bowl, privileged juggles.
pub fn ensure_owner(bowl: &Bowl, requester: &User) -> Result<(), AuthorizationError> {
    if bowl.is_owner(&requester.id) {
        Ok(())
    } else {
        Err(AuthorizationError::NotOwner)
    }
}

/// Pick types are open to the owner and every current member;
/// the rest are owner-only.
pub fn ensure_can_resolve(bowl: &Bowl, requester: &User) -> Result<(), AuthorizationError> {
    if bowl.bowl_type.owner_only() {
        return ensure_owner(bowl, requester);
    }
    if bowl.is_owner(&requester.id) || bowl.is_member(&requester.id) {
        Ok(())
    } else {
        Err(AuthorizationError::NotMember)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BowlType, Member};
    use crate::engine::create_bowl;

    fn bowl_of(bowl_type: BowlType) -> Bowl {
        let owner = User::new("owner", "Olu");
        let mut bowl = create_bowl(&owner, "Bowl", "", 0, 0, bowl_type).unwrap();
        bowl.list_members.push(Member {
            id: "member".to_string(),
            name: "Mei".to_string(),
        });
        bowl
    }

    #[test]
    fn test_pick_types_open_to_members() {
        for bowl_type in [BowlType::PickOneDiscard, BowlType::PickOneKeep] {
            let bowl = bowl_of(bowl_type);
            assert!(ensure_can_resolve(&bowl, &User::new("owner", "Olu")).is_ok());
            assert!(ensure_can_resolve(&bowl, &User::new("member", "Mei")).is_ok());
            assert_eq!(
                ensure_can_resolve(&bowl, &User::new("stranger", "Sam")),
                Err(AuthorizationError::NotMember)
            );
        }
    }

    #[test]
    fn test_privileged_types_owner_only() {
        for bowl_type in BowlType::ALL.into_iter().filter(BowlType::owner_only) {
            let bowl = bowl_of(bowl_type);
            assert!(ensure_can_resolve(&bowl, &User::new("owner", "Olu")).is_ok());
            assert_eq!(
                ensure_can_resolve(&bowl, &User::new("member", "Mei")),
                Err(AuthorizationError::NotOwner)
            );
        }
    }
}
