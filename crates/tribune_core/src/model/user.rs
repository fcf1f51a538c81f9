//! User account projection consumed by the forum core.
//!
//! The core does not own user accounts; it only reads identity, the
//! moderator flag and the additive score counter managed through
//! [`crate::repo::user_repo::UserRepository::change_score`].

use serde::{Deserialize, Serialize};

/// Stable identifier for a user.
pub type UserId = i64;

/// Minimal account record used for authorization checks and scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub nick: String,
    pub score: i64,
    pub anonymous: bool,
    pub moderator: bool,
}

impl User {
    /// Returns whether this viewer identity carries an ignore list.
    ///
    /// Anonymous viewers never filter navigation candidates.
    pub fn is_identified(&self) -> bool {
        !self.anonymous
    }
}
