/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This software may be used and distributed according to the terms of the
 * GNU General Public License version 2 or any later version.
 */

use std::collections::HashMap;

use crate::errors::*;
use crate::id::RevisionId;
use crate::inventory::Inventory;
use crate::repo::Repository;
use crate::revision::Revision;

/// In-memory `Repository` implementation, primarily for tests and for
/// staging revisions received from a bundle.
#[derive(Clone, Debug, Default)]
pub struct MemoryRepo {
    revisions: HashMap<RevisionId, Revision>,
    inventories: HashMap<RevisionId, Inventory>,
}

impl MemoryRepo {
    #[inline]
    pub fn new() -> Self {
        Default::default()
    }

    /// Store a revision together with its inventory.
    pub fn add_revision(&mut self, revision: Revision, inventory: Inventory) {
        let id = revision.id().clone();
        self.revisions.insert(id.clone(), revision);
        self.inventories.insert(id, inventory);
    }

    #[inline]
    pub fn contains(&self, id: &RevisionId) -> bool {
        self.revisions.contains_key(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }
}

impl Repository for MemoryRepo {
    fn get_revision(&self, id: &RevisionId) -> Result<Revision> {
        match self.revisions.get(id) {
            Some(revision) => Ok(revision.clone()),
            None => bail!(ErrorKind::NotFound(format!("revision {}", id))),
        }
    }

    fn get_inventory(&self, id: &RevisionId) -> Result<Inventory> {
        match self.inventories.get(id) {
            Some(inventory) => Ok(inventory.clone()),
            None => bail!(ErrorKind::NotFound(format!("inventory for {}", id))),
        }
    }
}
