// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for core geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing geometry primitives
///
/// All errors are construction-phase: published surfaces and bin utilities
/// are immutable and their query methods never fail.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),

    #[error("Invalid binning: {0}")]
    InvalidBinning(String),

    #[error("Invalid transform: {0}")]
    InvalidTransform(String),
}
