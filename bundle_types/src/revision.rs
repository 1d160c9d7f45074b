/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This software may be used and distributed according to the terms of the
 * GNU General Public License version 2 or any later version.
 */

use std::collections::BTreeMap;

use quickcheck::{Arbitrary, Gen};
use serde_derive::Serialize;

use crate::datetime::DateTime;
use crate::id::RevisionId;

/// A mutable revision under construction. Call `freeze` to get an immutable
/// `Revision` out of it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RevisionMut {
    pub id: RevisionId,
    pub parents: Vec<RevisionId>,
    pub committer: String,
    pub message: String,
    pub date: DateTime,
    pub properties: BTreeMap<String, String>,
}

impl RevisionMut {
    #[inline]
    pub fn freeze(self) -> Revision {
        Revision { inner: self }
    }
}

/// One immutable commit record: an opaque identifier, an ordered list of
/// parent identifiers, committer, message, timestamp and an open-ended
/// property map. It carries no tree contents of its own.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Revision {
    inner: RevisionMut,
}

impl Revision {
    #[inline]
    pub fn id(&self) -> &RevisionId {
        &self.inner.id
    }

    /// The parents of this revision. Order is significant: the first parent
    /// is the one deltas are computed against.
    #[inline]
    pub fn parents(&self) -> impl Iterator<Item = &RevisionId> {
        self.inner.parents.iter()
    }

    #[inline]
    pub fn committer(&self) -> &str {
        &self.inner.committer
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.inner.message
    }

    #[inline]
    pub fn date(&self) -> &DateTime {
        &self.inner.date
    }

    /// Revision properties in ascending key order.
    #[inline]
    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner
            .properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Allow the revision to be mutated.
    #[inline]
    pub fn into_mut(self) -> RevisionMut {
        self.inner
    }
}

impl Arbitrary for Revision {
    fn arbitrary<G: Gen>(g: &mut G) -> Self {
        let parent_count = usize::arbitrary(g) % 3;
        let parents = (0..parent_count).map(|_| RevisionId::arbitrary(g)).collect();

        let prop_count = usize::arbitrary(g) % 4;
        let mut properties = BTreeMap::new();
        for i in 0..prop_count {
            properties.insert(format!("prop-{}", i), String::arbitrary(g));
        }

        RevisionMut {
            id: RevisionId::arbitrary(g),
            parents,
            committer: String::arbitrary(g),
            message: String::arbitrary(g),
            date: DateTime::arbitrary(g),
            properties,
        }
        .freeze()
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let rev = self.clone().into_mut();
        let iter = rev
            .message
            .shrink()
            .map(move |message| {
                let mut rev = rev.clone();
                rev.message = message;
                rev.freeze()
            });
        Box::new(iter)
    }
}
