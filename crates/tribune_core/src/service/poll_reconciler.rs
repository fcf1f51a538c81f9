//! Poll reconciliation: aligning persisted variants with a submitted set.
//!
//! # Responsibility
//! - Compute and apply the delta between a poll's stored variant list and
//!   the variant list submitted with an edit.
//!
//! # Invariants
//! - A persisted variant absent from the submission, or submitted with a
//!   blank label, is removed.
//! - A submitted variant with the new-variant sentinel id and a non-blank
//!   label is appended after all existing variants.
//! - Reconciling a poll against its own persisted state is a no-op.

use std::collections::HashMap;

use crate::model::poll::{Poll, PollVariant, VariantId, NEW_VARIANT_ID};
use crate::repo::poll_repo::PollRepository;
use crate::repo::RepoResult;

/// Applies the submitted variant set and multi-select flag to the poll.
///
/// Returns whether anything was removed, relabeled, added or toggled.
pub fn reconcile<R: PollRepository>(
    polls: &R,
    poll: &Poll,
    proposed: &[PollVariant],
    multi_select: bool,
) -> RepoResult<bool> {
    let mut modified = false;

    let persisted = polls.variants_of(poll.id)?;
    let proposed_labels: HashMap<VariantId, &str> = proposed
        .iter()
        .filter(|variant| variant.id != NEW_VARIANT_ID)
        .map(|variant| (variant.id, variant.label.as_str()))
        .collect();

    for variant in &persisted {
        let label = proposed_labels
            .get(&variant.id)
            .copied()
            .filter(|label| !label.trim().is_empty());

        match label {
            None => {
                polls.remove_variant(variant.id)?;
                modified = true;
            }
            Some(label) => {
                if label != variant.label {
                    polls.update_variant_label(variant.id, label)?;
                    modified = true;
                }
            }
        }
    }

    for variant in proposed {
        if variant.id == NEW_VARIANT_ID && !variant.is_blank() {
            polls.add_variant(poll.id, &variant.label)?;
            modified = true;
        }
    }

    if poll.multi_select != multi_select {
        polls.set_multi_select(poll.id, multi_select)?;
        modified = true;
    }

    Ok(modified)
}
