//! User mention extraction from topic body text.
//!
//! # Responsibility
//! - Find `@nick` references so callers can resolve them into the user-ref
//!   event list passed to topic creation.
//!
//! # Invariants
//! - Extraction is order-preserving and deduplicated.
//! - Unknown nicks resolve to nothing; extraction never fails.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::user::UserId;
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoResult;

static MENTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@([A-Za-z0-9][A-Za-z0-9_-]{0,30})").expect("valid mention regex"));

/// Extracts mentioned nicks from body text, deduplicated in order of first
/// appearance.
pub fn mentioned_nicks(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for capture in MENTION_RE.captures_iter(text) {
        let nick = capture[1].to_string();
        if !seen.contains(&nick) {
            seen.push(nick);
        }
    }
    seen
}

/// Resolves mentioned nicks against the user store, skipping unknown ones.
pub fn resolve_user_refs<R: UserRepository>(users: &R, text: &str) -> RepoResult<Vec<UserId>> {
    let mut refs = Vec::new();
    for nick in mentioned_nicks(text) {
        if let Some(user) = users.by_nick(&nick)? {
            refs.push(user.id);
        }
    }
    Ok(refs)
}

#[cfg(test)]
mod tests {
    use super::mentioned_nicks;

    #[test]
    fn extracts_nicks_in_order_without_duplicates() {
        let text = "thanks @alice, see also @bob and again @alice";
        assert_eq!(mentioned_nicks(text), vec!["alice", "bob"]);
    }

    #[test]
    fn ignores_bare_at_signs_and_empty_text() {
        assert!(mentioned_nicks("mail me @ home").is_empty());
        assert!(mentioned_nicks("").is_empty());
    }

    #[test]
    fn accepts_hyphen_and_underscore_in_nicks() {
        assert_eq!(mentioned_nicks("@linux-fan_99 hi"), vec!["linux-fan_99"]);
    }
}
