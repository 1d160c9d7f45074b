/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This software may be used and distributed according to the terms of the
 * GNU General Public License version 2 or any later version.
 */

use std::collections::BTreeMap;
use std::io::BufRead;

use slog::{debug, Logger};

use bundle_types::{DateTime, InventoryDelta, RevisionId, RevisionMut};

use crate::errors::*;
use crate::info::{BundleInfo, BundleRecord};
use crate::record::{malformed, parse_hash, parse_op, unescape_line, NO_PARENT};
use crate::registry::FormatRegistry;
use crate::writer::BUNDLE_MAGIC;

/// Parse a bundle stream in a single pass.
///
/// The version line is checked against `registry` before any record is
/// looked at, so unsupported bundles are rejected up front. Records are
/// parsed but not verified; call `BundleInfo::verify` for that.
pub fn read_bundle<B: BufRead>(
    logger: &Logger,
    registry: &FormatRegistry,
    stream: B,
) -> Result<BundleInfo> {
    let mut reader = LineReader::new(stream);

    let magic = reader.expect_line()?;
    if magic != BUNDLE_MAGIC {
        bail!(malformed(reader.line, "bad magic line"));
    }
    let version = reader.expect_line()?;
    let format = registry.get(&version)?;
    let comment = reader.expect_line()?;
    if comment != "#" {
        bail!(malformed(reader.line, "missing comment line"));
    }
    debug!(logger, "reading bundle"; "version" => format.version);

    let mut records = Vec::new();
    while let Some(first) = reader.next_line()? {
        let record = read_record(&mut reader, &first)?;
        debug!(logger, "read revision record";
            "revision" => %record.revision.id(), "ops" => record.delta.len());
        records.push(record);
    }
    Ok(BundleInfo { format, records })
}

fn read_record<B: BufRead>(reader: &mut LineReader<B>, first: &str) -> Result<BundleRecord> {
    let id = RevisionId::new(unescape_line(
        field(first, "revision: ", reader.line)?,
        reader.line,
    )?);

    let mut parents = Vec::new();
    for _ in 0..reader.expect_count("parents: ")? {
        let line = reader.expect_line()?;
        let parent = unescape_line(field(&line, "parent: ", reader.line)?, reader.line)?;
        parents.push(RevisionId::new(parent));
    }

    let line = reader.expect_line()?;
    let committer = unescape_line(field(&line, "committer: ", reader.line)?, reader.line)?;

    let line = reader.expect_line()?;
    let date = parse_date(field(&line, "date: ", reader.line)?, reader.line)?;

    let line = reader.expect_line()?;
    let message = unescape_line(field(&line, "message: ", reader.line)?, reader.line)?;

    let mut properties = BTreeMap::new();
    for _ in 0..reader.expect_count("properties: ")? {
        let line = reader.expect_line()?;
        let value = field(&line, "property: ", reader.line)?;
        let mut split = value.splitn(2, ' ');
        // splitn always yields at least one piece
        let key = split.next().unwrap();
        let value = match split.next() {
            Some(value) => unescape_line(value, reader.line)?,
            None => bail!(malformed(reader.line, "property line has no value")),
        };
        if properties.insert(key.to_string(), value).is_some() {
            bail!(malformed(
                reader.line,
                &format!("duplicate property key: {}", key)
            ));
        }
    }

    let line = reader.expect_line()?;
    let base = match field(&line, "base: ", reader.line)? {
        NO_PARENT => None,
        value => {
            let base = field(value, "id ", reader.line)?;
            Some(RevisionId::new(unescape_line(base, reader.line)?))
        }
    };

    let mut ops = Vec::new();
    for _ in 0..reader.expect_count("delta: ")? {
        let line = reader.expect_line()?;
        let mut split = line.splitn(2, ": ");
        let tag = split.next().unwrap();
        let rest = match split.next() {
            Some(rest) => rest,
            None => bail!(malformed(reader.line, "untagged delta line")),
        };
        ops.push(parse_op(tag, rest, reader.line)?);
    }

    let line = reader.expect_line()?;
    let stored_digest = parse_hash(field(&line, "testament: ", reader.line)?, reader.line)?;

    let revision = RevisionMut {
        id,
        parents,
        committer,
        message,
        date,
        properties,
    }
    .freeze();

    Ok(BundleRecord {
        revision,
        base,
        delta: InventoryDelta::new(ops),
        stored_digest,
    })
}

fn parse_date(value: &str, line: usize) -> Result<DateTime> {
    let fields: Vec<&str> = value.split(' ').collect();
    if fields.len() != 2 {
        bail!(malformed(line, "date line needs seconds and timezone"));
    }
    let secs = match fields[0].parse::<i64>() {
        Ok(secs) => secs,
        Err(_) => bail!(malformed(line, &format!("bad seconds: {}", fields[0]))),
    };
    let tz_offset_secs = match fields[1].parse::<i32>() {
        Ok(tz) => tz,
        Err(_) => bail!(malformed(line, &format!("bad timezone: {}", fields[1]))),
    };
    match DateTime::from_timestamp(secs, tz_offset_secs) {
        Ok(date) => Ok(date),
        Err(e) => bail!(malformed(line, &format!("bad date: {}", e))),
    }
}

fn field<'a>(text: &'a str, tag: &str, line: usize) -> Result<&'a str> {
    if text.starts_with(tag) {
        Ok(&text[tag.len()..])
    } else {
        bail!(malformed(line, &format!("expected \"{}\"", tag.trim_end())))
    }
}

struct LineReader<B> {
    lines: std::io::Lines<B>,
    line: usize,
}

impl<B: BufRead> LineReader<B> {
    fn new(stream: B) -> Self {
        LineReader {
            lines: stream.lines(),
            line: 0,
        }
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        match self.lines.next() {
            Some(line) => {
                self.line += 1;
                Ok(Some(line?))
            }
            None => Ok(None),
        }
    }

    fn expect_line(&mut self) -> Result<String> {
        match self.next_line()? {
            Some(line) => Ok(line),
            None => bail!(malformed(self.line + 1, "unexpected end of bundle")),
        }
    }

    fn expect_count(&mut self, tag: &str) -> Result<usize> {
        let line = self.expect_line()?;
        let value = field(&line, tag, self.line)?;
        match value.parse::<usize>() {
            Ok(count) => Ok(count),
            Err(_) => bail!(malformed(self.line, &format!("bad count: {}", value))),
        }
    }
}
