// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for layer construction operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or closing layers
///
/// Queries never return errors: an empty result or a cleared intersection
/// is a valid outcome, and the hot navigation path stays fault-free.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Empty layer: {0}")]
    EmptyLayer(String),

    #[error("Invalid layer setup: {0}")]
    InvalidLayer(String),

    #[error("Layer already enclosed by volume {0}")]
    AlreadyEnclosed(u32),

    #[error("Unknown layer handle {0}")]
    UnknownLayer(u32),

    #[error("Core primitive error: {0}")]
    CoreError(#[from] tracklite_core::Error),
}
