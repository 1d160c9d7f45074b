/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This software may be used and distributed according to the terms of the
 * GNU General Public License version 2 or any later version.
 */

use std::collections::HashMap;

use slog::{debug, warn, Logger};

use bundle_types::{Inventory, InventoryDelta, Repository, Revision, RevisionId, Sha1};

use crate::errors::*;
use crate::registry::BundleFormat;

/// One revision as carried by a bundle: the commit record, the inventory
/// delta against its base, and the testament digest the sender stored.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BundleRecord {
    pub revision: Revision,
    /// Revision whose inventory the delta applies to. `None` means the
    /// delta applies to the empty inventory.
    pub base: Option<RevisionId>,
    pub delta: InventoryDelta,
    pub stored_digest: Sha1,
}

/// Result of checking one record's stored digest against the digest
/// recomputed from the reconstructed inventory.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VerifyOutcome {
    Verified,
    Mismatch { stored: Sha1, computed: Sha1 },
}

/// A fully parsed bundle.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BundleInfo {
    pub format: BundleFormat,
    pub records: Vec<BundleRecord>,
}

impl BundleInfo {
    pub fn revision_ids(&self) -> impl Iterator<Item = &RevisionId> {
        self.records.iter().map(|record| record.revision.id())
    }

    /// Reconstruct each record's inventory and check its testament digest.
    ///
    /// Base inventories are resolved against earlier records in this bundle
    /// first, then against `repo`, so a self-contained run of revisions
    /// verifies without the repository knowing any of them yet.
    ///
    /// A digest mismatch is reported per revision rather than failing the
    /// whole call. A delta that does not fit its base, or a base that can
    /// be found neither in the bundle nor in `repo`, is a structural error
    /// and fails the call.
    pub fn verify<R: Repository>(
        &self,
        logger: &Logger,
        repo: &R,
    ) -> Result<Vec<(RevisionId, VerifyOutcome)>> {
        let mut reconstructed: HashMap<RevisionId, Inventory> = HashMap::new();
        let mut outcomes = Vec::with_capacity(self.records.len());

        for record in &self.records {
            let base_inventory = match &record.base {
                Some(base) => match reconstructed.get(base) {
                    Some(inventory) => inventory.clone(),
                    None => repo.resolve_base(base)?,
                },
                None => Inventory::new(),
            };
            let inventory = record.delta.apply(&base_inventory)?;
            let computed = self
                .format
                .testament
                .digest(&record.revision, &inventory)?;

            let outcome = if computed == record.stored_digest {
                debug!(logger, "testament verified";
                    "revision" => %record.revision.id());
                VerifyOutcome::Verified
            } else {
                warn!(logger, "testament mismatch";
                    "revision" => %record.revision.id(),
                    "stored" => %record.stored_digest,
                    "computed" => %computed);
                VerifyOutcome::Mismatch {
                    stored: record.stored_digest,
                    computed,
                }
            };

            reconstructed.insert(record.revision.id().clone(), inventory);
            outcomes.push((record.revision.id().clone(), outcome));
        }
        Ok(outcomes)
    }
}
