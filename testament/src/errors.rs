/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This software may be used and distributed according to the terms of the
 * GNU General Public License version 2 or any later version.
 */

use thiserror::Error;

pub use anyhow::{bail, Error, Result};

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("encoding error: {0}")]
    Encoding(String),
}
