// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tracklite Geometry
//!
//! Layer navigation for tracking geometries: the binned spatial index of a
//! layer's sub-surfaces, the approach-surface mechanism, the ordered
//! compatible-surface search, and the one-time geometry closing that
//! assigns stable identifiers.
//!
//! Construction (single-threaded) and query (arbitrarily concurrent) are
//! strictly ordered phases: once a geometry is closed, every layer is
//! immutable and all queries are pure, lock-free reads.

pub mod approach;
pub mod arena;
pub mod creator;
pub mod error;
pub mod layer;
pub mod options;
pub mod registrar;
pub mod surface_array;

// Re-export the core surface primitives alongside the layer engine
pub use tracklite_core::{
    same_surface, BinUtility, BinningData, BinningOption, BoundaryCheck, DetectorElementId,
    GeometryId, Intersection, Isometry3, PlaneSurface, Point2, Point3, RectangleBounds, Surface,
    SurfaceIntersection, SurfaceKind, SurfaceRef, Vector3,
};

pub use approach::ApproachDescriptor;
pub use arena::{LayerArena, LayerId, VolumeId};
pub use creator::{LayerCreator, LayerCreatorConfig};
pub use error::{Error, Result};
pub use layer::{Layer, LayerBuilder, LayerKind, NextLayers, SubstructureTags};
pub use options::{NavigationOptions, SearchDepth};
pub use registrar::GeometryRegistrar;

#[cfg(test)]
mod tests;
