/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This software may be used and distributed according to the terms of the
 * GNU General Public License version 2 or any later version.
 */

use std::collections::HashMap;

use lazy_static::lazy_static;

use testament::TestamentVersion;

use crate::errors::*;

/// One bundle container version and the testament variant its digests use.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BundleFormat {
    pub version: &'static str,
    pub testament: TestamentVersion,
}

/// Original bundle layout, carrying loose (version 1) testament digests.
pub const FORMAT_1_0: BundleFormat = BundleFormat {
    version: "1.0",
    testament: TestamentVersion::V1Loose,
};

/// Current bundle layout, carrying strict (version 2) testament digests.
pub const FORMAT_2_0: BundleFormat = BundleFormat {
    version: "2.0",
    testament: TestamentVersion::V2Strict,
};

lazy_static! {
    pub static ref DEFAULT_REGISTRY: FormatRegistry = FormatRegistry::standard();
}

/// The set of bundle versions a reader is willing to accept.
#[derive(Clone, Debug, Default)]
pub struct FormatRegistry {
    formats: HashMap<&'static str, BundleFormat>,
}

impl FormatRegistry {
    #[inline]
    pub fn new() -> Self {
        Default::default()
    }

    /// A registry with every version this crate knows how to read.
    pub fn standard() -> Self {
        let mut registry = FormatRegistry::new();
        registry.register(FORMAT_1_0);
        registry.register(FORMAT_2_0);
        registry
    }

    pub fn register(&mut self, format: BundleFormat) {
        self.formats.insert(format.version, format);
    }

    /// Look up a format by its version string. Fails with
    /// `UnsupportedVersion` for versions not in this registry.
    pub fn get(&self, version: &str) -> Result<BundleFormat> {
        match self.formats.get(version) {
            Some(format) => Ok(*format),
            None => bail!(ErrorKind::UnsupportedVersion(version.to_string())),
        }
    }
}
