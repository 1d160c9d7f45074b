/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This software may be used and distributed according to the terms of the
 * GNU General Public License version 2 or any later version.
 */

use std::fmt::{self, Display};
use std::str::FromStr;

use quickcheck::{Arbitrary, Gen};
use serde_derive::{Deserialize, Serialize};

use crate::errors::*;

/// Opaque identifier for a revision.
///
/// Revision identifiers are assigned by whichever repository created the
/// revision and are never interpreted, only compared for equality and
/// ordering.
#[derive(
    Clone,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize
)]
pub struct RevisionId(String);

impl RevisionId {
    #[inline]
    pub fn new<S: Into<String>>(s: S) -> Self {
        RevisionId(s.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl Display for RevisionId {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self.0)
    }
}

impl FromStr for RevisionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(RevisionId(s.to_string()))
    }
}

impl From<&str> for RevisionId {
    fn from(s: &str) -> Self {
        RevisionId(s.to_string())
    }
}

impl From<String> for RevisionId {
    fn from(s: String) -> Self {
        RevisionId(s)
    }
}

/// Opaque identifier for a versioned file.
///
/// File identifiers stay stable across renames, so two inventories can be
/// matched up entry-by-entry no matter how paths moved between them.
#[derive(
    Clone,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize
)]
pub struct FileId(String);

impl FileId {
    #[inline]
    pub fn new<S: Into<String>>(s: S) -> Self {
        FileId(s.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl Display for FileId {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self.0)
    }
}

impl FromStr for FileId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(FileId(s.to_string()))
    }
}

impl From<&str> for FileId {
    fn from(s: &str) -> Self {
        FileId(s.to_string())
    }
}

impl From<String> for FileId {
    fn from(s: String) -> Self {
        FileId(s)
    }
}

impl Arbitrary for RevisionId {
    fn arbitrary<G: Gen>(g: &mut G) -> Self {
        RevisionId(format!("rev-{:x}", u64::arbitrary(g)))
    }
}

impl Arbitrary for FileId {
    fn arbitrary<G: Gen>(g: &mut G) -> Self {
        FileId(format!("fid-{:x}", u64::arbitrary(g)))
    }
}
