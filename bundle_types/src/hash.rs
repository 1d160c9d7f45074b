/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This software may be used and distributed according to the terms of the
 * GNU General Public License version 2 or any later version.
 */

use std::fmt::{self, Debug, Display};
use std::str::FromStr;

use ascii::{AsciiStr, AsciiString};
use crypto::digest::Digest;
use crypto::sha1::Sha1 as Sha1Hasher;
use faster_hex::{hex_decode, hex_encode};
use quickcheck::{empty_shrinker, Arbitrary, Gen};
use serde_derive::{Deserialize, Serialize};

use crate::errors::*;

/// Length of a raw SHA-1 hash in bytes.
pub const SHA1_BYTES: usize = 20;

/// Length of a hex-encoded SHA-1 hash.
pub const SHA1_HEX_BYTES: usize = 40;

/// Raw SHA-1 hash.
///
/// SHA-1 is used both for per-file content hashes supplied by the repository
/// and for testament digests over canonical revision text. This type holds a
/// hash value, not the bytes being hashed.
#[derive(
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize
)]
pub struct Sha1([u8; SHA1_BYTES]);

impl Sha1 {
    /// Construct a `Sha1` from a slice of 20 bytes already containing a
    /// SHA-1 hash (ie, *not* a hash of the bytes).
    pub fn from_bytes<B: AsRef<[u8]>>(bytes: B) -> Result<Self> {
        let bytes = bytes.as_ref();
        if bytes.len() != SHA1_BYTES {
            bail!(ErrorKind::InvalidSha1Input(
                "need exactly 20 bytes".into()
            ));
        }
        let mut ret = Sha1([0; SHA1_BYTES]);
        ret.0.copy_from_slice(bytes);
        Ok(ret)
    }

    /// Construct a `Sha1` from an array of 20 bytes.
    #[inline]
    pub const fn from_byte_array(arr: [u8; SHA1_BYTES]) -> Self {
        Sha1(arr)
    }

    /// Construct a `Sha1` from a hex-encoded `AsciiStr`.
    #[inline]
    pub fn from_ascii_str(s: &AsciiStr) -> Result<Self> {
        Self::from_str(s.as_str())
    }

    pub fn to_hex(&self) -> AsciiString {
        let mut v = vec![0; SHA1_HEX_BYTES];

        // This can only panic if the buffer size is wrong, which would be a
        // programming error.
        hex_encode(self.as_ref(), &mut v).expect("failed to hex encode");

        unsafe {
            // A hex string is always a pure ASCII string.
            AsciiString::from_ascii_unchecked(v)
        }
    }
}

/// Context for incrementally computing a `Sha1` hash.
pub struct Context(Sha1Hasher);

impl Context {
    #[inline]
    pub fn new() -> Self {
        Context(Sha1Hasher::new())
    }

    #[inline]
    pub fn update<T>(&mut self, data: T)
    where
        T: AsRef<[u8]>,
    {
        self.0.input(data.as_ref())
    }

    #[inline]
    pub fn finish(mut self) -> Sha1 {
        let mut ret = [0u8; SHA1_BYTES];
        self.0.result(&mut ret);
        Sha1(ret)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

/// Get a reference to the underlying bytes of a `Sha1`
impl AsRef<[u8]> for Sha1 {
    fn as_ref(&self) -> &[u8] {
        &self.0[..]
    }
}

impl FromStr for Sha1 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() != SHA1_HEX_BYTES {
            bail!(ErrorKind::InvalidSha1Input(
                "need exactly 40 hex digits".into()
            ));
        }

        let mut ret = Sha1([0; SHA1_BYTES]);
        match hex_decode(s.as_bytes(), &mut ret.0) {
            Ok(_) => Ok(ret),
            Err(_) => bail!(ErrorKind::InvalidSha1Input("bad hex character".into())),
        }
    }
}

impl Display for Sha1 {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        Display::fmt(&self.to_hex(), fmt)
    }
}

/// Custom `Debug` output for `Sha1` so it prints in hex.
impl Debug for Sha1 {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "Sha1({})", self)
    }
}

impl Arbitrary for Sha1 {
    fn arbitrary<G: Gen>(g: &mut G) -> Self {
        let mut bytes = [0; SHA1_BYTES];
        g.fill_bytes(&mut bytes);
        Sha1(bytes)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        empty_shrinker()
    }
}
