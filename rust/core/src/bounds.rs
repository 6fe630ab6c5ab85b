// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lateral surface bounds in the local frame.

use crate::error::{Error, Result};
use nalgebra::Point2;

/// Rectangular bounds centered on the local origin
///
/// Describes the lateral extent of a planar surface as half lengths along
/// the local x and y axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangleBounds {
    half_x: f64,
    half_y: f64,
}

impl RectangleBounds {
    /// Create rectangular bounds from half lengths
    ///
    /// Both half lengths must be strictly positive.
    pub fn new(half_x: f64, half_y: f64) -> Result<Self> {
        if !(half_x > 0.0 && half_y > 0.0) {
            return Err(Error::InvalidBounds(format!(
                "half lengths must be positive, got ({half_x}, {half_y})"
            )));
        }
        Ok(Self { half_x, half_y })
    }

    /// Half length along local x
    pub fn half_x(&self) -> f64 {
        self.half_x
    }

    /// Half length along local y
    pub fn half_y(&self) -> f64 {
        self.half_y
    }

    /// Check whether a local position lies inside the bounds
    ///
    /// `tolerance` inflates the bounds symmetrically; a point exactly on the
    /// edge counts as inside.
    pub fn inside(&self, local: &Point2<f64>, tolerance: f64) -> bool {
        local.x.abs() <= self.half_x + tolerance && local.y.abs() <= self.half_y + tolerance
    }
}
