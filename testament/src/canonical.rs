/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This software may be used and distributed according to the terms of the
 * GNU General Public License version 2 or any later version.
 */

use ascii::AsciiString;

use bundle_types::escape::escape_field;
use bundle_types::{Context, EntryKind, Inventory, InventoryEntry, Revision, Sha1};

use crate::errors::*;

/// The canonical text layouts a testament digest can be computed over.
///
/// Version 1 reproduces the layout of long-lived historical testaments,
/// including their omissions: the root entry is skipped, the executable
/// flag is never written, and an empty symlink target is left out rather
/// than written as an empty field. Version 2 writes every entry and every
/// attribute explicitly, so no two distinct revision states share a text.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TestamentVersion {
    V1Loose,
    V2Strict,
}

impl TestamentVersion {
    /// The first line of the canonical text.
    pub fn header(&self) -> &'static str {
        match self {
            TestamentVersion::V1Loose => "revision testament version 1",
            TestamentVersion::V2Strict => "revision testament version 2 strict",
        }
    }

    /// Render the canonical text for one revision and its inventory.
    pub fn canonical_text(&self, revision: &Revision, inventory: &Inventory) -> Result<Vec<u8>> {
        let mut text = String::new();
        text.push_str(self.header());
        text.push('\n');

        check_id("revision id", revision.id().as_str())?;
        text.push_str(&format!("revision-id: {}\n", revision.id()));

        let parents: Vec<_> = revision.parents().collect();
        text.push_str(&format!("parents: {}\n", parents.len()));
        for parent in parents {
            check_id("parent id", parent.as_str())?;
            text.push_str(&format!("parent: {}\n", parent));
        }

        text.push_str(&format!(
            "committer: {}\n",
            escape_field(revision.committer())
        ));
        text.push_str(&format!("timestamp: {}\n", revision.date().timestamp_secs()));
        text.push_str(&format!("timezone: {}\n", revision.date().tz_offset_secs()));
        text.push_str(&format!("message: {}\n", escape_field(revision.message())));

        let properties: Vec<_> = revision.properties().collect();
        text.push_str(&format!("properties: {}\n", properties.len()));
        for (key, value) in properties {
            check_key("property key", key)?;
            text.push_str(&format!("property: {} {}\n", key, escape_field(value)));
        }

        let mut entry_lines = Vec::new();
        for entry in inventory {
            if let Some(line) = self.entry_line(entry)? {
                entry_lines.push(line);
            }
        }
        text.push_str(&format!("inventory: {}\n", entry_lines.len()));
        for line in entry_lines {
            text.push_str(&line);
            text.push('\n');
        }

        Ok(text.into_bytes())
    }

    /// Render one inventory entry, or `None` if this version omits it.
    fn entry_line(&self, entry: &InventoryEntry) -> Result<Option<String>> {
        check_id("file id", entry.file_id.as_str())?;
        if let Some(parent_id) = &entry.parent_id {
            check_id("parent file id", parent_id.as_str())?;
        }
        let path = escape_field(&entry.path);

        let line = match self {
            TestamentVersion::V1Loose => {
                // Historical testaments never included the root entry.
                let parent_id = match &entry.parent_id {
                    Some(parent_id) => parent_id,
                    None => return Ok(None),
                };
                match &entry.kind {
                    EntryKind::File { hash, .. } => format!(
                        "entry: file {} {} {} {}",
                        entry.file_id,
                        parent_id,
                        path,
                        hash.to_hex()
                    ),
                    EntryKind::Dir => {
                        format!("entry: dir {} {} {}", entry.file_id, parent_id, path)
                    }
                    EntryKind::Symlink { target } => {
                        if target.is_empty() {
                            format!("entry: symlink {} {} {}", entry.file_id, parent_id, path)
                        } else {
                            format!(
                                "entry: symlink {} {} {} {}",
                                entry.file_id,
                                parent_id,
                                path,
                                escape_field(target)
                            )
                        }
                    }
                }
            }
            TestamentVersion::V2Strict => {
                let parent_id = match &entry.parent_id {
                    Some(parent_id) => parent_id.as_str(),
                    None => "none",
                };
                match &entry.kind {
                    EntryKind::File { hash, executable } => format!(
                        "entry: file {} {} {} hash={} exe={}",
                        entry.file_id,
                        parent_id,
                        path,
                        hash.to_hex(),
                        if *executable { "yes" } else { "no" }
                    ),
                    EntryKind::Dir => {
                        format!("entry: dir {} {} {}", entry.file_id, parent_id, path)
                    }
                    EntryKind::Symlink { target } => format!(
                        "entry: symlink {} {} {} target={}",
                        entry.file_id,
                        parent_id,
                        path,
                        escape_field(target)
                    ),
                }
            }
        };
        Ok(Some(line))
    }

    /// The testament digest: a SHA-1 over the canonical text.
    pub fn digest(&self, revision: &Revision, inventory: &Inventory) -> Result<Sha1> {
        let text = self.canonical_text(revision, inventory)?;
        let mut context = Context::new();
        context.update(&text);
        Ok(context.finish())
    }

    pub fn hex_digest(&self, revision: &Revision, inventory: &Inventory) -> Result<AsciiString> {
        Ok(self.digest(revision, inventory)?.to_hex())
    }
}

/// Identifiers are embedded in the canonical text verbatim, so they must be
/// single tokens. `none` is reserved as the missing-parent marker.
fn check_id(what: &str, s: &str) -> Result<()> {
    check_key(what, s)?;
    if s == "none" {
        bail!(ErrorKind::Encoding(format!("{} is reserved: {}", what, s)));
    }
    Ok(())
}

fn check_key(what: &str, s: &str) -> Result<()> {
    if s.is_empty() {
        bail!(ErrorKind::Encoding(format!("{} is empty", what)));
    }
    for c in s.chars() {
        if (c as u32) < 0x21 || c as u32 == 0x7f {
            bail!(ErrorKind::Encoding(format!(
                "{} contains whitespace or control character: {:?}",
                what, s
            )));
        }
    }
    Ok(())
}
