// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stable geometry identifiers.
//!
//! A [`GeometryId`] packs the position of an object within the geometry
//! tree into a single `u64`: volume, layer, approach-surface and
//! sensitive-surface fields. Identifiers are assigned once during geometry
//! closing and are immutable afterwards.

use std::fmt;

/// Bit layout of a packed geometry identifier
///
/// ```text
/// | volume (8) | layer (8) | approach (8) | sensitive (20) | reserved (20) |
/// ```
const VOLUME_SHIFT: u64 = 56;
const LAYER_SHIFT: u64 = 48;
const APPROACH_SHIFT: u64 = 40;
const SENSITIVE_SHIFT: u64 = 20;

const VOLUME_MASK: u64 = 0xff << VOLUME_SHIFT;
const LAYER_MASK: u64 = 0xff << LAYER_SHIFT;
const APPROACH_MASK: u64 = 0xff << APPROACH_SHIFT;
const SENSITIVE_MASK: u64 = 0xfffff << SENSITIVE_SHIFT;

/// Stable identifier of an object within a tracking geometry
///
/// Derived top-down: the enclosing volume supplies its prefix, the closing
/// step appends the layer field, and sub-surfaces get approach or sensitive
/// fields counted from 1 (0 means "not set").
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(u64);

impl GeometryId {
    /// Identifier with only the volume field set
    pub fn volume(volume: u64) -> Self {
        Self((volume << VOLUME_SHIFT) & VOLUME_MASK)
    }

    /// Raw packed value
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Derive an identifier with the layer field replaced
    pub fn with_layer(self, layer: u64) -> Self {
        Self((self.0 & !LAYER_MASK) | ((layer << LAYER_SHIFT) & LAYER_MASK))
    }

    /// Derive an identifier with the approach field replaced
    pub fn with_approach(self, approach: u64) -> Self {
        Self((self.0 & !APPROACH_MASK) | ((approach << APPROACH_SHIFT) & APPROACH_MASK))
    }

    /// Derive an identifier with the sensitive field replaced
    pub fn with_sensitive(self, sensitive: u64) -> Self {
        Self((self.0 & !SENSITIVE_MASK) | ((sensitive << SENSITIVE_SHIFT) & SENSITIVE_MASK))
    }

    /// Volume field
    pub fn volume_id(&self) -> u64 {
        (self.0 & VOLUME_MASK) >> VOLUME_SHIFT
    }

    /// Layer field
    pub fn layer_id(&self) -> u64 {
        (self.0 & LAYER_MASK) >> LAYER_SHIFT
    }

    /// Approach-surface field
    pub fn approach_id(&self) -> u64 {
        (self.0 & APPROACH_MASK) >> APPROACH_SHIFT
    }

    /// Sensitive-surface field
    pub fn sensitive_id(&self) -> u64 {
        (self.0 & SENSITIVE_MASK) >> SENSITIVE_SHIFT
    }

    /// Whether no field has been assigned yet
    pub fn is_unset(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for GeometryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}|{}|{}|{}]",
            self.volume_id(),
            self.layer_id(),
            self.approach_id(),
            self.sensitive_id()
        )
    }
}

/// Opaque handle to a detector element hosted by a sensitive surface
///
/// The layer engine stores and exposes these handles; it never interprets
/// their contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DetectorElementId(pub u64);

impl fmt::Display for DetectorElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
