/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This software may be used and distributed according to the terms of the
 * GNU General Public License version 2 or any later version.
 */

use std::collections::btree_map::{self, BTreeMap};

use quickcheck::{Arbitrary, Gen};
use serde_derive::Serialize;

use crate::hash::Sha1;
use crate::id::FileId;

/// What kind of object an inventory entry describes.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum EntryKind {
    File { hash: Sha1, executable: bool },
    Dir,
    Symlink { target: String },
}

impl EntryKind {
    pub fn tag(&self) -> &'static str {
        match self {
            EntryKind::File { .. } => "file",
            EntryKind::Dir => "dir",
            EntryKind::Symlink { .. } => "symlink",
        }
    }
}

/// One versioned entry in an inventory.
///
/// `parent_id` is `None` only for the root directory; every other entry
/// names the file id of its containing directory.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct InventoryEntry {
    pub file_id: FileId,
    pub parent_id: Option<FileId>,
    pub path: String,
    pub kind: EntryKind,
}

/// The full set of versioned entries at one revision, keyed uniquely by
/// file id. Iteration is always in ascending file-id order.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Inventory {
    entries: BTreeMap<FileId, InventoryEntry>,
}

impl Inventory {
    #[inline]
    pub fn new() -> Self {
        Inventory {
            entries: BTreeMap::new(),
        }
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = InventoryEntry>,
    {
        let mut inv = Inventory::new();
        for entry in entries {
            inv.insert(entry);
        }
        inv
    }

    /// Insert an entry, replacing any previous entry with the same file id.
    pub fn insert(&mut self, entry: InventoryEntry) -> Option<InventoryEntry> {
        self.entries.insert(entry.file_id.clone(), entry)
    }

    pub fn remove(&mut self, file_id: &FileId) -> Option<InventoryEntry> {
        self.entries.remove(file_id)
    }

    #[inline]
    pub fn get(&self, file_id: &FileId) -> Option<&InventoryEntry> {
        self.entries.get(file_id)
    }

    #[inline]
    pub fn contains(&self, file_id: &FileId) -> bool {
        self.entries.contains_key(file_id)
    }

    /// The root directory entry, if the inventory has one. The root is the
    /// unique entry with no parent.
    pub fn root(&self) -> Option<&InventoryEntry> {
        self.entries.values().find(|entry| entry.parent_id.is_none())
    }

    /// Iterate over entries in ascending file-id order.
    #[inline]
    pub fn iter(&self) -> btree_map::Values<'_, FileId, InventoryEntry> {
        self.entries.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Inventory {
    type Item = &'a InventoryEntry;
    type IntoIter = btree_map::Values<'a, FileId, InventoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Arbitrary for EntryKind {
    fn arbitrary<G: Gen>(g: &mut G) -> Self {
        match u8::arbitrary(g) % 3 {
            0 => EntryKind::File {
                hash: Sha1::arbitrary(g),
                executable: bool::arbitrary(g),
            },
            1 => EntryKind::Dir,
            _ => EntryKind::Symlink {
                target: String::arbitrary(g),
            },
        }
    }
}

impl Arbitrary for Inventory {
    fn arbitrary<G: Gen>(g: &mut G) -> Self {
        let root_id = FileId::new("fid-root");
        let mut inv = Inventory::new();
        inv.insert(InventoryEntry {
            file_id: root_id.clone(),
            parent_id: None,
            path: "/".to_string(),
            kind: EntryKind::Dir,
        });

        let count = usize::arbitrary(g) % 8;
        for i in 0..count {
            let file_id = FileId::new(format!("fid-{:x}-{}", u64::arbitrary(g), i));
            let path = format!("/entry-{}", i);
            inv.insert(InventoryEntry {
                file_id,
                parent_id: Some(root_id.clone()),
                path,
                kind: EntryKind::arbitrary(g),
            });
        }
        inv
    }
}
