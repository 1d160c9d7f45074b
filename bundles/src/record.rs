/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This software may be used and distributed according to the terms of the
 * GNU General Public License version 2 or any later version.
 */

//! Line codec for the per-revision records inside a bundle.
//!
//! Every variable field is escaped, so a record line splits unambiguously
//! on single spaces. Entry lines always carry every attribute, whatever
//! testament variant the surrounding bundle uses for its digests.

use std::str::FromStr;

use bundle_types::escape::{escape_field, unescape_field};
use bundle_types::{DeltaOp, EntryKind, FileId, InventoryEntry, Sha1};

use crate::errors::*;

pub const NO_PARENT: &str = "none";

pub fn format_entry(entry: &InventoryEntry) -> String {
    let parent_id = match &entry.parent_id {
        Some(parent_id) => escape_field(parent_id.as_str()),
        None => NO_PARENT.to_string(),
    };
    let common = format!(
        "{} {} {}",
        escape_field(entry.file_id.as_str()),
        parent_id,
        escape_field(&entry.path)
    );
    match &entry.kind {
        EntryKind::File { hash, executable } => format!(
            "file {} hash={} exe={}",
            common,
            hash.to_hex(),
            if *executable { "yes" } else { "no" }
        ),
        EntryKind::Dir => format!("dir {}", common),
        EntryKind::Symlink { target } => {
            format!("symlink {} target={}", common, escape_field(target))
        }
    }
}

pub fn parse_entry(spec: &str, line: usize) -> Result<InventoryEntry> {
    let fields: Vec<&str> = spec.split(' ').collect();
    // split always yields at least one field
    let kind_tag = fields[0];
    let rest = &fields[1..];

    let expected = match kind_tag {
        "file" => 5,
        "dir" => 3,
        "symlink" => 4,
        other => bail!(malformed(line, &format!("unknown entry kind: {}", other))),
    };
    if rest.len() != expected {
        bail!(malformed(
            line,
            &format!(
                "{} entry has {} fields, expected {}",
                kind_tag,
                rest.len(),
                expected
            )
        ));
    }

    let file_id = FileId::new(unescape_line(rest[0], line)?);
    let parent_id = if rest[1] == NO_PARENT {
        None
    } else {
        Some(FileId::new(unescape_line(rest[1], line)?))
    };
    let path = unescape_line(rest[2], line)?;

    let kind = match kind_tag {
        "file" => EntryKind::File {
            hash: parse_hash(tagged_value(rest[3], "hash=", line)?, line)?,
            executable: match tagged_value(rest[4], "exe=", line)? {
                "yes" => true,
                "no" => false,
                other => bail!(malformed(line, &format!("bad exe flag: {}", other))),
            },
        },
        "dir" => EntryKind::Dir,
        "symlink" => EntryKind::Symlink {
            target: unescape_line(tagged_value(rest[3], "target=", line)?, line)?,
        },
        _ => unreachable!(),
    };

    Ok(InventoryEntry {
        file_id,
        parent_id,
        path,
        kind,
    })
}

pub fn format_op(op: &DeltaOp) -> String {
    match op {
        DeltaOp::Add(entry) => format!("add: {}", format_entry(entry)),
        DeltaOp::Change(entry) => format!("change: {}", format_entry(entry)),
        DeltaOp::Delete(file_id) => format!("delete: {}", escape_field(file_id.as_str())),
    }
}

pub fn parse_op(tag: &str, rest: &str, line: usize) -> Result<DeltaOp> {
    let op = match tag {
        "add" => DeltaOp::Add(parse_entry(rest, line)?),
        "change" => DeltaOp::Change(parse_entry(rest, line)?),
        "delete" => DeltaOp::Delete(FileId::new(unescape_line(rest, line)?)),
        other => bail!(malformed(line, &format!("unknown delta op: {}", other))),
    };
    Ok(op)
}

pub fn parse_hash(hex: &str, line: usize) -> Result<Sha1> {
    match Sha1::from_str(hex) {
        Ok(hash) => Ok(hash),
        Err(e) => bail!(malformed(line, &format!("bad hash: {}", e))),
    }
}

pub fn unescape_line(field: &str, line: usize) -> Result<String> {
    match unescape_field(field) {
        Ok(s) => Ok(s),
        Err(e) => bail!(malformed(line, &format!("bad field: {}", e))),
    }
}

fn tagged_value<'a>(field: &'a str, tag: &str, line: usize) -> Result<&'a str> {
    if field.starts_with(tag) {
        Ok(&field[tag.len()..])
    } else {
        bail!(malformed(
            line,
            &format!("expected {}value, got {}", tag, field)
        ))
    }
}

pub fn malformed(line: usize, what: &str) -> ErrorKind {
    ErrorKind::MalformedBundle(format!("line {}: {}", line, what))
}
