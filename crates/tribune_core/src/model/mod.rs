//! Domain model for the tribune forum core.
//!
//! # Responsibility
//! - Define the canonical records used by revision, moderation and
//!   navigation logic.
//! - Keep invariants that need no storage access close to the data.
//!
//! # Invariants
//! - Every topic is identified by a stable integer id allocated exactly
//!   once from the shared sequence.
//! - Deletion is represented by the `deleted` flag plus a delete record,
//!   never by removing rows.

pub mod audit;
pub mod group;
pub mod poll;
pub mod topic;
pub mod user;
