/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This software may be used and distributed according to the terms of the
 * GNU General Public License version 2 or any later version.
 */

use crate::errors::*;
use crate::id::RevisionId;
use crate::inventory::Inventory;
use crate::revision::Revision;

/// The narrow read-only interface the exchange layer consumes from the
/// underlying storage.
pub trait Repository {
    /// Look up a revision by id. Fails with `NotFound` if the repository
    /// does not have it.
    fn get_revision(&self, id: &RevisionId) -> Result<Revision>;

    /// Look up the inventory at a revision. Fails with `NotFound` if the
    /// repository does not have it.
    fn get_inventory(&self, id: &RevisionId) -> Result<Inventory>;

    /// Resolve a delta base to the inventory a delta against it applies to.
    /// By default that is simply the inventory at that revision.
    fn resolve_base(&self, id: &RevisionId) -> Result<Inventory> {
        self.get_inventory(id)
    }
}
