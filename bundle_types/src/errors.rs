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
    #[error("invalid sha-1 input: {0}")]
    InvalidSha1Input(String),
    #[error("invalid date-time: {0}")]
    InvalidDateTime(String),
    #[error("invalid escape sequence: {0}")]
    InvalidEscape(String),
    #[error("delta conflict: {0}")]
    DeltaConflict(String),
    #[error("{0} not found")]
    NotFound(String),
}
