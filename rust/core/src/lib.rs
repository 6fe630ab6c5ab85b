// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tracklite Core
//!
//! Core primitives for tracking geometries: the surface abstraction and
//! intersection value types, planar surfaces, lateral bounds, deterministic
//! binning of the local parameter space, and stable geometry identifiers.

pub mod binning;
pub mod bounds;
pub mod error;
pub mod identifier;
pub mod plane;
pub mod surface;

// Re-export nalgebra types for convenience
pub use nalgebra::{Isometry3, Point2, Point3, Vector2, Vector3};

pub use binning::{BinUtility, BinningData, BinningOption};
pub use bounds::RectangleBounds;
pub use error::{Error, Result};
pub use identifier::{DetectorElementId, GeometryId};
pub use plane::PlaneSurface;
pub use surface::{
    same_surface, BoundaryCheck, Intersection, Surface, SurfaceIntersection, SurfaceKind,
    SurfaceRef, ON_SURFACE_TOLERANCE,
};
