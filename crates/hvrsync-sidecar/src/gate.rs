//! Digest gating
//!
//! The sidecar remembers the digest of the index bytes it was last synced
//! from. Comparing it with the digest of the current bytes tells whether
//! the sidecar is up to date, was synced before but has drifted, or was
//! never synced at all.

use crate::Result;
use crate::container::{MetadataContainer, ns};
use hvrsync_formats::IndexDigest;

/// Struct property holding per-format legacy digests
pub const DIGESTS_PROPERTY: &str = "NativeDigests";

/// Field of [`DIGESTS_PROPERTY`] owned by this format
pub const DIGEST_FIELD: &str = "SonyHDV";

/// What to do with the sidecar given its stored digest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Stored digest matches the index; nothing to do
    Unchanged,
    /// A digest was stored but no longer matches; the index wins
    Stale,
    /// No digest stored; only fill in missing properties
    FirstSync,
}

impl GateDecision {
    /// Whether reconciliation has to run
    pub fn needs_reconcile(self) -> bool {
        !matches!(self, Self::Unchanged)
    }

    /// Whether a digest property existed, which makes the sync authoritative
    pub fn prior_digest_present(self) -> bool {
        matches!(self, Self::Stale)
    }
}

/// Classify a stored digest against the current one
///
/// `current` is `None` when the index could not produce a digest (no
/// matching record); a stored digest can never match that.
pub fn classify(stored: Option<&str>, current: Option<&IndexDigest>) -> GateDecision {
    match (stored, current) {
        (None, _) => GateDecision::FirstSync,
        (Some(stored), Some(current)) if current.matches(stored) => GateDecision::Unchanged,
        (Some(_), _) => GateDecision::Stale,
    }
}

/// Digest stored in the container, if any
pub fn stored_digest<C: MetadataContainer>(container: &C) -> Option<&str> {
    container.struct_field(ns::XMP, DIGESTS_PROPERTY, ns::XMP, DIGEST_FIELD)
}

/// Overwrite the stored digest, or remove it when there is none to store
pub fn store_digest<C: MetadataContainer>(
    container: &mut C,
    digest: Option<&IndexDigest>,
) -> Result<()> {
    match digest {
        Some(digest) => container.set_struct_field(
            ns::XMP,
            DIGESTS_PROPERTY,
            ns::XMP,
            DIGEST_FIELD,
            &digest.to_hex(),
        ),
        None => {
            container.delete_struct_field(ns::XMP, DIGESTS_PROPERTY, ns::XMP, DIGEST_FIELD);
            Ok(())
        }
    }
}
