/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This software may be used and distributed according to the terms of the
 * GNU General Public License version 2 or any later version.
 */

use std::io::Write;

use bytes::Bytes;
use slog::{debug, Logger};

use bundle_types::escape::escape_field;
use bundle_types::{Inventory, InventoryDelta, Repository, RevisionId};

use crate::errors::*;
use crate::record::{format_op, NO_PARENT};
use crate::registry::BundleFormat;

/// First line of every bundle.
pub const BUNDLE_MAGIC: &str = "# changeset bundle";

/// Serializes a run of revisions from a repository into a bundle stream.
///
/// Each revision is written as a delta against its first parent's
/// inventory, or against the empty inventory for a parentless revision,
/// together with a testament digest the receiving side can verify the
/// reconstructed state against.
pub struct BundleWriter {
    logger: Logger,
    format: BundleFormat,
}

impl BundleWriter {
    pub fn new(logger: Logger, format: BundleFormat) -> Self {
        BundleWriter { logger, format }
    }

    pub fn write<R, W>(&self, repo: &R, revisions: &[RevisionId], out: &mut W) -> Result<()>
    where
        R: Repository,
        W: Write,
    {
        if revisions.is_empty() {
            bail!("no revisions to bundle");
        }

        writeln!(out, "{}", BUNDLE_MAGIC)?;
        writeln!(out, "{}", self.format.version)?;
        writeln!(out, "#")?;

        for id in revisions {
            let revision = repo.get_revision(id)?;
            let inventory = repo.get_inventory(id)?;
            let base = revision.parents().next().cloned();
            let base_inventory = match &base {
                Some(parent) => repo.get_inventory(parent)?,
                None => Inventory::new(),
            };
            let delta = InventoryDelta::diff(&base_inventory, &inventory);
            // Also validates identifiers and property keys before any of
            // this record's lines are emitted.
            let digest = self.format.testament.digest(&revision, &inventory)?;
            debug!(self.logger, "bundling revision";
                "revision" => %id, "ops" => delta.len());

            writeln!(out, "revision: {}", escape_field(revision.id().as_str()))?;
            let parents: Vec<_> = revision.parents().collect();
            writeln!(out, "parents: {}", parents.len())?;
            for parent in parents {
                writeln!(out, "parent: {}", escape_field(parent.as_str()))?;
            }
            writeln!(out, "committer: {}", escape_field(revision.committer()))?;
            writeln!(
                out,
                "date: {} {}",
                revision.date().timestamp_secs(),
                revision.date().tz_offset_secs()
            )?;
            writeln!(out, "message: {}", escape_field(revision.message()))?;
            let properties: Vec<_> = revision.properties().collect();
            writeln!(out, "properties: {}", properties.len())?;
            for (key, value) in properties {
                writeln!(out, "property: {} {}", key, escape_field(value))?;
            }
            match &base {
                Some(parent) => {
                    writeln!(out, "base: id {}", escape_field(parent.as_str()))?;
                }
                None => writeln!(out, "base: {}", NO_PARENT)?,
            }
            writeln!(out, "delta: {}", delta.len())?;
            for op in delta.ops() {
                writeln!(out, "{}", format_op(op))?;
            }
            writeln!(out, "testament: {}", digest.to_hex())?;
        }
        Ok(())
    }

    pub fn to_bytes<R: Repository>(&self, repo: &R, revisions: &[RevisionId]) -> Result<Bytes> {
        let mut buf = Vec::new();
        self.write(repo, revisions, &mut buf)?;
        Ok(Bytes::from(buf))
    }
}
