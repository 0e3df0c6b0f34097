//! Resolution ("juggle")
//!
//! Turns a bowl's entries or members into an output string according to
//! its type. Randomness is injected so callers decide the source; every
//! shuffle is a uniform Fisher-Yates shuffle.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::{Bowl, BowlType, DomainResult, Member, User, ValidationError};
use super::access::ensure_can_resolve;

/// First line of a Secret Santa output.
pub const SECRET_SANTA_HEADER: &str = "Secret Santa Assignments:";

const MIN_PAIRING_MEMBERS: usize = 2;

/// Resolve `bowl` for `requester`.
///
/// Checks authorization, then that there is something to draw from.
/// Only `PICK_ONE_DISCARD` changes the source collection.
pub fn resolve<R: Rng + ?Sized>(bowl: &Bowl, requester: &User, rng: &mut R) -> DomainResult<Bowl> {
    ensure_can_resolve(bowl, requester)?;
    check_source(bowl)?;

    let mut next = bowl.clone();
    let output = match bowl.bowl_type {
        BowlType::PickOneDiscard => {
            let index = rng.gen_range(0..next.list_entries.len());
            next.list_entries.remove(index).text
        }
        BowlType::PickOneKeep => {
            let index = rng.gen_range(0..bowl.list_entries.len());
            bowl.list_entries[index].text.clone()
        }
        BowlType::ShuffleMembers => {
            let names: Vec<&str> = bowl.list_members.iter().map(|m| m.name.as_str()).collect();
            numbered(shuffled(&names, rng))
        }
        BowlType::MakePairs => make_pairs(&bowl.list_members, rng),
        BowlType::SecretSanta => secret_santa(&bowl.list_members, rng),
        BowlType::ShuffleEntries => {
            let texts: Vec<&str> = bowl.list_entries.iter().map(|e| e.text.as_str()).collect();
            numbered(shuffled(&texts, rng))
        }
    };

    log::debug!("bowl {} resolved as {}", bowl.id, bowl.bowl_type);
    next.output = Some(output);
    Ok(next)
}

fn check_source(bowl: &Bowl) -> Result<(), ValidationError> {
    match bowl.bowl_type {
        BowlType::MakePairs | BowlType::SecretSanta => {
            let found = bowl.list_members.len();
            if found < MIN_PAIRING_MEMBERS {
                return Err(ValidationError::InsufficientMembers {
                    required: MIN_PAIRING_MEMBERS,
                    found,
                });
            }
            Ok(())
        }
        BowlType::ShuffleMembers if bowl.list_members.is_empty() => Err(ValidationError::EmptySource),
        BowlType::PickOneDiscard | BowlType::PickOneKeep | BowlType::ShuffleEntries
            if bowl.list_entries.is_empty() =>
        {
            Err(ValidationError::EmptySource)
        }
        _ => Ok(()),
    }
}

fn shuffled<'a, R: Rng + ?Sized>(items: &[&'a str], rng: &mut R) -> Vec<&'a str> {
    let mut copy = items.to_vec();
    copy.shuffle(rng);
    copy
}

fn numbered(items: Vec<&str>) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn make_pairs<R: Rng + ?Sized>(members: &[Member], rng: &mut R) -> String {
    let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
    shuffled(&names, rng)
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| match pair {
            [a, b] => format!("Pair {}: {} & {}", i + 1, a, b),
            solo => format!("Pair {}: {} (Solo)", i + 1, solo.concat()),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Giver `i` (member order) gets position `i + 1` of a shuffled copy.
/// Self-assignment is possible; no derangement is enforced.
fn secret_santa<R: Rng + ?Sized>(members: &[Member], rng: &mut R) -> String {
    let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
    let receivers = shuffled(&names, rng);
    let count = names.len();

    let mut lines = Vec::with_capacity(count + 1);
    lines.push(SECRET_SANTA_HEADER.to_string());
    for (i, giver) in names.iter().enumerate() {
        lines.push(format!("{} → {}", giver, receivers[(i + 1) % count]));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AuthorizationError, DomainError};
    use crate::engine::{create_bowl, submit_entry};
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn owner() -> User {
        User::new("U0", "Owner")
    }

    fn people(n: usize) -> Vec<User> {
        (1..=n).map(|i| User::new(format!("U{}", i), format!("P{}", i))).collect()
    }

    fn bowl_with(bowl_type: BowlType, members: usize, entries: &[&str]) -> Bowl {
        let mut bowl = create_bowl(&owner(), "Bowl", "", 0, 0, bowl_type).unwrap();
        let users = people(members);
        for (i, user) in users.iter().enumerate() {
            bowl = submit_entry(&bowl, user, &format!("seed-{}", i)).unwrap();
        }
        bowl.list_entries.clear();
        for text in entries {
            bowl = submit_entry(&bowl, &owner(), text).unwrap();
        }
        // Keep member counts exact: the owner joined by adding entries.
        bowl.list_members.retain(|m| m.id != "U0");
        bowl
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_pick_discard_example() {
        let bowl = bowl_with(BowlType::PickOneDiscard, 0, &["Pizza", "Tacos", "Sushi"]);
        let next = resolve(&bowl, &owner(), &mut rng()).unwrap();

        let output = next.output.clone().unwrap();
        assert_eq!(next.list_entries.len(), 2);
        assert!(!next.has_entry_text(&output));
        assert!(bowl.has_entry_text(&output));
    }

    #[test]
    fn test_pick_keep_leaves_entries() {
        let bowl = bowl_with(BowlType::PickOneKeep, 0, &["Pizza", "Tacos", "Sushi"]);
        let next = resolve(&bowl, &owner(), &mut rng()).unwrap();

        assert_eq!(next.list_entries, bowl.list_entries);
        assert!(bowl.has_entry_text(next.output.as_deref().unwrap()));
    }

    #[test]
    fn test_member_can_pick() {
        let bowl = bowl_with(BowlType::PickOneKeep, 2, &["Pizza"]);
        let member = people(1).remove(0);
        assert!(resolve(&bowl, &member, &mut rng()).is_ok());
    }

    #[test]
    fn test_empty_source() {
        for bowl_type in [BowlType::PickOneDiscard, BowlType::PickOneKeep, BowlType::ShuffleEntries] {
            let bowl = bowl_with(bowl_type, 2, &[]);
            let err = resolve(&bowl, &owner(), &mut rng()).unwrap_err();
            assert_eq!(err, DomainError::Validation(ValidationError::EmptySource));
        }
        let bowl = bowl_with(BowlType::ShuffleMembers, 0, &[]);
        let err = resolve(&bowl, &owner(), &mut rng()).unwrap_err();
        assert_eq!(err, DomainError::Validation(ValidationError::EmptySource));
    }

    #[test]
    fn test_pairing_needs_two_members() {
        for bowl_type in [BowlType::MakePairs, BowlType::SecretSanta] {
            let bowl = bowl_with(bowl_type, 1, &[]);
            let err = resolve(&bowl, &owner(), &mut rng()).unwrap_err();
            assert_eq!(
                err,
                DomainError::Validation(ValidationError::InsufficientMembers { required: 2, found: 1 })
            );
        }
    }

    #[test]
    fn test_authorization_checked_before_source() {
        let bowl = bowl_with(BowlType::SecretSanta, 0, &[]);
        let err = resolve(&bowl, &User::new("U9", "Nine"), &mut rng()).unwrap_err();
        assert_eq!(err, DomainError::Authorization(AuthorizationError::NotOwner));
    }

    #[test]
    fn test_shuffle_members_numbered() {
        let bowl = bowl_with(BowlType::ShuffleMembers, 3, &[]);
        let next = resolve(&bowl, &owner(), &mut rng()).unwrap();
        let output = next.output.unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 3);
        for (i, line) in lines.iter().enumerate() {
            assert!(line.starts_with(&format!("{}. P", i + 1)));
        }
        let mut names: Vec<&str> = lines.iter().map(|l| &l[3..]).collect();
        names.sort_unstable();
        assert_eq!(names, ["P1", "P2", "P3"]);
    }

    #[test]
    fn test_shuffle_entries_numbered() {
        let bowl = bowl_with(BowlType::ShuffleEntries, 0, &["a", "b"]);
        let next = resolve(&bowl, &owner(), &mut rng()).unwrap();
        let output = next.output.unwrap();

        assert!(output == "1. a\n2. b" || output == "1. b\n2. a");
        assert_eq!(next.list_entries, bowl.list_entries);
    }

    #[test]
    fn test_secret_santa_shape() {
        let bowl = bowl_with(BowlType::SecretSanta, 4, &[]);
        let next = resolve(&bowl, &owner(), &mut rng()).unwrap();
        let output = next.output.unwrap();
        let mut lines = output.lines();

        assert_eq!(lines.next(), Some(SECRET_SANTA_HEADER));
        let mut receivers = Vec::new();
        for (i, line) in lines.enumerate() {
            let (giver, receiver) = line.split_once(" → ").unwrap();
            assert_eq!(giver, format!("P{}", i + 1));
            receivers.push(receiver.to_string());
        }
        receivers.sort();
        assert_eq!(receivers, ["P1", "P2", "P3", "P4"]);
        assert_eq!(next.list_members, bowl.list_members);
    }

    #[test]
    fn test_output_overwritten() {
        let bowl = bowl_with(BowlType::PickOneKeep, 0, &["only"]);
        let mut first = resolve(&bowl, &owner(), &mut rng()).unwrap();
        first.output = Some("stale".to_string());
        let second = resolve(&first, &owner(), &mut rng()).unwrap();
        assert_eq!(second.output.as_deref(), Some("only"));
    }

    proptest! {
        #[test]
        fn prop_pairs_parity(n in 2usize..15, seed in any::<u64>()) {
            let bowl = bowl_with(BowlType::MakePairs, n, &[]);
            let next = resolve(&bowl, &owner(), &mut StdRng::seed_from_u64(seed)).unwrap();
            let output = next.output.unwrap();
            let lines: Vec<&str> = output.lines().collect();

            prop_assert_eq!(lines.len(), n.div_ceil(2));
            let solos = lines.iter().filter(|l| l.ends_with(" (Solo)")).count();
            prop_assert_eq!(solos, n % 2);
        }

        #[test]
        fn prop_privileged_types_reject_non_owner(
            bowl_type in prop::sample::select(vec![
                BowlType::ShuffleMembers,
                BowlType::MakePairs,
                BowlType::SecretSanta,
                BowlType::ShuffleEntries,
            ]),
            seed in any::<u64>(),
        ) {
            let bowl = bowl_with(bowl_type, 3, &["x", "y"]);
            let member = people(1).remove(0);
            let result = resolve(&bowl, &member, &mut StdRng::seed_from_u64(seed));
            prop_assert_eq!(result, Err(DomainError::Authorization(AuthorizationError::NotOwner)));
        }

        #[test]
        fn prop_discard_removes_output(count in 1usize..10, seed in any::<u64>()) {
            let texts: Vec<String> = (0..count).map(|i| format!("entry {}", i)).collect();
            let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
            let bowl = bowl_with(BowlType::PickOneDiscard, 0, &refs);

            let next = resolve(&bowl, &owner(), &mut StdRng::seed_from_u64(seed)).unwrap();
            let output = next.output.clone().unwrap();

            prop_assert_eq!(next.list_entries.len(), count - 1);
            prop_assert!(!next.has_entry_text(&output));
            prop_assert!(bowl.has_entry_text(&output));
        }
    }
}
