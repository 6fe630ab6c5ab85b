// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Deterministic binning of the local surface parameter space.
//!
//! A [`BinUtility`] partitions a layer's local 1D/2D parameter space into
//! equidistant bins. Point-to-bin mapping is a pure function of the point,
//! so repeated lookups at the same position always return the same bin.

use crate::error::{Error, Result};
use nalgebra::Point2;
use smallvec::SmallVec;

/// Edge behavior of a binning axis
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinningOption {
    /// Out-of-range values clamp to the first/last bin
    Open,
    /// Values wrap around (periodic axis, e.g. an azimuthal angle)
    Closed,
}

/// One equidistant binning axis
#[derive(Clone, Debug)]
pub struct BinningData {
    min: f64,
    max: f64,
    bins: usize,
    option: BinningOption,
}

impl BinningData {
    /// Create an equidistant axis over `[min, max)` with `bins` bins
    pub fn equidistant(min: f64, max: f64, bins: usize, option: BinningOption) -> Result<Self> {
        if bins == 0 {
            return Err(Error::InvalidBinning("bin count must be at least 1".into()));
        }
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(Error::InvalidBinning(format!(
                "invalid axis range [{min}, {max})"
            )));
        }
        Ok(Self {
            min,
            max,
            bins,
            option,
        })
    }

    /// Number of bins on this axis
    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Axis range
    pub fn range(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Map a value to its bin
    pub fn bin(&self, value: f64) -> usize {
        let step = (self.max - self.min) / self.bins as f64;
        let raw = ((value - self.min) / step).floor() as i64;
        self.resolve(raw)
    }

    /// Resolve a raw (possibly out-of-range) bin index per the edge option
    fn resolve(&self, raw: i64) -> usize {
        let n = self.bins as i64;
        match self.option {
            BinningOption::Open => raw.clamp(0, n - 1) as usize,
            BinningOption::Closed => (((raw % n) + n) % n) as usize,
        }
    }

    /// Bins within `radius` of `bin`, in ascending raw order, deduplicated
    pub fn neighbor_range(&self, bin: usize, radius: usize) -> SmallVec<[usize; 5]> {
        let mut out: SmallVec<[usize; 5]> = SmallVec::new();
        let (bin, radius) = (bin as i64, radius as i64);
        for raw in (bin - radius)..=(bin + radius) {
            let resolved = self.resolve(raw);
            if !out.contains(&resolved) {
                out.push(resolved);
            }
        }
        out
    }
}

/// Deterministic 1D/2D partition of a local parameter space
///
/// Built once at construction and immutable afterwards; all lookups are
/// pure functions of the query point.
#[derive(Clone, Debug)]
pub struct BinUtility {
    axes: SmallVec<[BinningData; 2]>,
}

impl BinUtility {
    /// One-dimensional binning over the local x coordinate
    pub fn one_dimensional(axis: BinningData) -> Self {
        let mut axes = SmallVec::new();
        axes.push(axis);
        Self { axes }
    }

    /// Two-dimensional binning over the local x/y coordinates
    pub fn two_dimensional(axis_x: BinningData, axis_y: BinningData) -> Self {
        let mut axes = SmallVec::new();
        axes.push(axis_x);
        axes.push(axis_y);
        Self { axes }
    }

    /// Dimensionality (1 or 2)
    pub fn dimension(&self) -> usize {
        self.axes.len()
    }

    /// Bin counts per axis; a 1D utility reports one bin on the second axis
    pub fn bins(&self) -> (usize, usize) {
        match self.axes.len() {
            1 => (self.axes[0].bins(), 1),
            _ => (self.axes[0].bins(), self.axes[1].bins()),
        }
    }

    /// Total number of bins
    pub fn total_bins(&self) -> usize {
        let (nx, ny) = self.bins();
        nx * ny
    }

    /// Map a local position to its bin key
    pub fn bin(&self, local: &Point2<f64>) -> (usize, usize) {
        match self.axes.len() {
            1 => (self.axes[0].bin(local.x), 0),
            _ => (self.axes[0].bin(local.x), self.axes[1].bin(local.y)),
        }
    }

    /// Row-major flat index of a bin key
    pub fn flat_index(&self, bin: (usize, usize)) -> usize {
        let (_, ny) = self.bins();
        bin.0 * ny + bin.1
    }

    /// All bin keys within `radius` of `bin` per axis, deduplicated
    ///
    /// The rectangular neighborhood of the key, resolved per each axis'
    /// edge option; the order is deterministic (row-major over the
    /// expanded ranges).
    pub fn neighbors(&self, bin: (usize, usize), radius: usize) -> Vec<(usize, usize)> {
        let range_x = self.axes[0].neighbor_range(bin.0, radius);
        let range_y: SmallVec<[usize; 5]> = if self.axes.len() > 1 {
            self.axes[1].neighbor_range(bin.1, radius)
        } else {
            SmallVec::from_slice(&[0])
        };

        let mut out = Vec::with_capacity(range_x.len() * range_y.len());
        for &bx in &range_x {
            for &by in &range_y {
                out.push((bx, by));
            }
        }
        out
    }
}
