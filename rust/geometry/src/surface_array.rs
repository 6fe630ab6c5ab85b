// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Binned spatial index of a layer's sub-surfaces.
//!
//! A [`SurfaceArray`] maps a bin key of the layer's local parameter space
//! to the set of sub-surfaces located there. It is built once during layer
//! construction and immutable afterwards; lookups are pure functions of the
//! query position, so concurrent readers never block and repeated queries
//! at the same point return the identical set.

use crate::error::{Error, Result};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tracklite_core::{BinUtility, Isometry3, Point2, Point3, SurfaceRef};

/// Immutable binned container of sub-surfaces
///
/// The isometry places the layer's local frame in the global frame; query
/// positions are pulled back into the local frame and binned on local x/y.
#[derive(Debug)]
pub struct SurfaceArray {
    transform: Isometry3<f64>,
    bin_utility: BinUtility,
    grid: Vec<SmallVec<[SurfaceRef; 4]>>,
    all: Vec<SurfaceRef>,
    neighbor_radius: usize,
}

impl SurfaceArray {
    /// Build the index by binning each surface at its center
    ///
    /// The input order is preserved in [`all_surfaces`](Self::all_surfaces)
    /// and acts as the tie-breaking order of the layer search.
    pub fn new(
        transform: Isometry3<f64>,
        bin_utility: BinUtility,
        surfaces: Vec<SurfaceRef>,
    ) -> Result<Self> {
        if surfaces.is_empty() {
            return Err(Error::EmptyLayer(
                "surface array needs at least one surface".into(),
            ));
        }

        let mut grid = vec![SmallVec::new(); bin_utility.total_bins()];
        for surface in &surfaces {
            let local = transform.inverse_transform_point(&surface.center());
            let bin = bin_utility.bin(&Point2::new(local.x, local.y));
            grid[bin_utility.flat_index(bin)].push(surface.clone());
        }

        Ok(Self {
            transform,
            bin_utility,
            grid,
            all: surfaces,
            neighbor_radius: 0,
        })
    }

    /// Widen the neighbor-bin expansion of [`surfaces_near`](Self::surfaces_near)
    ///
    /// The default radius is 0: the immediate bin only.
    pub fn with_neighbor_radius(mut self, radius: usize) -> Self {
        self.neighbor_radius = radius;
        self
    }

    /// The binning scheme
    pub fn bin_utility(&self) -> &BinUtility {
        &self.bin_utility
    }

    /// Neighbor-bin expansion radius
    pub fn neighbor_radius(&self) -> usize {
        self.neighbor_radius
    }

    /// Number of surfaces in the index
    pub fn len(&self) -> usize {
        self.all.len()
    }

    /// Whether the index is empty (never true for a published array)
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// All indexed surfaces in stable input order
    pub fn all_surfaces(&self) -> &[SurfaceRef] {
        &self.all
    }

    /// Surfaces stored in one bin
    pub fn surfaces_at(&self, bin: (usize, usize)) -> &[SurfaceRef] {
        &self.grid[self.bin_utility.flat_index(bin)]
    }

    /// Bin key of a global position
    pub fn bin_of(&self, position: &Point3<f64>) -> (usize, usize) {
        let local = self.transform.inverse_transform_point(position);
        self.bin_utility.bin(&Point2::new(local.x, local.y))
    }

    /// Surfaces in the bin of `position` plus its neighbor-radius expansion
    ///
    /// Deduplicated; the order is deterministic (bin order, then insertion
    /// order within each bin).
    pub fn surfaces_near(&self, position: &Point3<f64>) -> Vec<SurfaceRef> {
        let bin = self.bin_of(position);
        let keys = self.bin_utility.neighbors(bin, self.neighbor_radius);

        let mut seen: FxHashSet<*const u8> = FxHashSet::default();
        let mut out = Vec::new();
        for key in keys {
            for surface in self.surfaces_at(key) {
                let ptr = std::sync::Arc::as_ptr(surface) as *const u8;
                if seen.insert(ptr) {
                    out.push(surface.clone());
                }
            }
        }
        out
    }
}
