/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This software may be used and distributed according to the terms of the
 * GNU General Public License version 2 or any later version.
 */

use itertools::{EitherOrBoth, Itertools};

use crate::errors::*;
use crate::id::FileId;
use crate::inventory::{Inventory, InventoryEntry};

/// One add/change/delete step in an inventory delta.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DeltaOp {
    /// The entry is present in the target but not the base.
    Add(InventoryEntry),
    /// The entry is present in both but differs.
    Change(InventoryEntry),
    /// The entry is present in the base but not the target.
    Delete(FileId),
}

impl DeltaOp {
    pub fn file_id(&self) -> &FileId {
        match self {
            DeltaOp::Add(entry) | DeltaOp::Change(entry) => &entry.file_id,
            DeltaOp::Delete(file_id) => file_id,
        }
    }
}

/// The difference between two inventories, as an ordered list of operations.
/// Operations are kept sorted by file id.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct InventoryDelta {
    ops: Vec<DeltaOp>,
}

impl InventoryDelta {
    pub fn new(mut ops: Vec<DeltaOp>) -> Self {
        ops.sort_by(|a, b| a.file_id().cmp(b.file_id()));
        InventoryDelta { ops }
    }

    /// Compute the delta that turns `base` into `target`.
    ///
    /// Both inventories iterate in ascending file-id order, so a single
    /// merge pass is enough.
    pub fn diff(base: &Inventory, target: &Inventory) -> Self {
        let ops = base
            .iter()
            .merge_join_by(target.iter(), |a, b| a.file_id.cmp(&b.file_id))
            .filter_map(|entry| match entry {
                EitherOrBoth::Left(gone) => Some(DeltaOp::Delete(gone.file_id.clone())),
                EitherOrBoth::Right(added) => Some(DeltaOp::Add(added.clone())),
                EitherOrBoth::Both(old, new) => {
                    if old == new {
                        None
                    } else {
                        Some(DeltaOp::Change(new.clone()))
                    }
                }
            })
            .collect();
        InventoryDelta { ops }
    }

    /// Replay this delta onto `base`, producing the target inventory.
    ///
    /// Fails with `DeltaConflict` if the delta does not fit the base: adding
    /// an entry that is already present, or changing or deleting one that is
    /// missing.
    pub fn apply(&self, base: &Inventory) -> Result<Inventory> {
        let mut result = base.clone();
        for op in &self.ops {
            match op {
                DeltaOp::Add(entry) => {
                    if result.contains(&entry.file_id) {
                        bail!(ErrorKind::DeltaConflict(format!(
                            "add of already-present entry {}",
                            entry.file_id
                        )));
                    }
                    result.insert(entry.clone());
                }
                DeltaOp::Change(entry) => {
                    if !result.contains(&entry.file_id) {
                        bail!(ErrorKind::DeltaConflict(format!(
                            "change of missing entry {}",
                            entry.file_id
                        )));
                    }
                    result.insert(entry.clone());
                }
                DeltaOp::Delete(file_id) => {
                    if result.remove(file_id).is_none() {
                        bail!(ErrorKind::DeltaConflict(format!(
                            "delete of missing entry {}",
                            file_id
                        )));
                    }
                }
            }
        }
        Ok(result)
    }

    /// Operations in ascending file-id order.
    #[inline]
    pub fn ops(&self) -> &[DeltaOp] {
        &self.ops
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
