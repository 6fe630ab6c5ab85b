// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Surface abstraction and intersection value types.
//!
//! A [`Surface`] is the geometric primitive a layer navigates over:
//! sensitive modules, material surfaces and passive boundaries all
//! implement the same trait. Surfaces are shared immutably as
//! [`SurfaceRef`]; surface identity is pointer identity ([`same_surface`]).

use crate::identifier::DetectorElementId;
use nalgebra::{Point2, Point3, Vector3};
use std::fmt;
use std::sync::Arc;

/// Default tolerance for on-surface checks, in length units
pub const ON_SURFACE_TOLERANCE: f64 = 1e-4;

/// Classification of a surface for navigation filtering
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// Carries a detector element; found with `resolve_sensitive`
    Sensitive,
    /// Carries material only; found with `resolve_material`
    Material,
    /// Structural surface; found with `resolve_passive`
    Passive,
}

/// Directive controlling whether lateral bounds are enforced during
/// intersection testing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoundaryCheck {
    /// Accept intersections outside the lateral bounds
    Off,
    /// Reject intersections outside the lateral bounds
    #[default]
    On,
}

impl BoundaryCheck {
    /// Whether the lateral bounds test is enabled
    pub fn is_enabled(&self) -> bool {
        matches!(self, BoundaryCheck::On)
    }
}

/// Raw intersection of a trajectory with a surface
///
/// `path_length` is signed by the travel direction: positive means the
/// surface lies ahead of the query origin.
#[derive(Clone, Copy, Debug)]
pub struct Intersection {
    /// Global intersection position
    pub position: Point3<f64>,
    /// Signed path length from the query origin
    pub path_length: f64,
    /// Whether the intersection solution exists
    pub valid: bool,
}

impl Intersection {
    /// An invalid intersection at the query origin
    pub fn invalid(position: Point3<f64>) -> Self {
        Self {
            position,
            path_length: 0.0,
            valid: false,
        }
    }
}

/// Shared reference to an immutable surface
pub type SurfaceRef = Arc<dyn Surface>;

/// A struck surface together with its intersection
#[derive(Clone)]
pub struct SurfaceIntersection {
    /// The surface that was struck
    pub surface: SurfaceRef,
    /// Intersection point, path length and validity
    pub intersection: Intersection,
}

impl SurfaceIntersection {
    /// Signed path length from the query origin
    pub fn path_length(&self) -> f64 {
        self.intersection.path_length
    }
}

impl fmt::Debug for SurfaceIntersection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceIntersection")
            .field("kind", &self.surface.kind())
            .field("intersection", &self.intersection)
            .finish()
    }
}

/// Geometric primitive navigated over by the layer engine
///
/// Implementations must be immutable after publication: all methods take
/// `&self` and the trait requires `Send + Sync` so published geometries can
/// be read from any number of threads.
pub trait Surface: Send + Sync + fmt::Debug {
    /// Navigation classification of this surface
    fn kind(&self) -> SurfaceKind;

    /// Whether this surface carries material
    fn has_material(&self) -> bool {
        false
    }

    /// Detector element hosted by this surface, if any
    fn detector_element(&self) -> Option<DetectorElementId> {
        None
    }

    /// Global center of the surface
    fn center(&self) -> Point3<f64>;

    /// Surface normal at a global position
    fn normal(&self, position: &Point3<f64>) -> Vector3<f64>;

    /// Intersect a trajectory with this surface
    ///
    /// `curvature` is an optional inverse-radius hint; implementations may
    /// refine the estimate with it, omitting it is equivalent to a
    /// straight-line estimation. Never fails: a trajectory that misses the
    /// surface yields an intersection with `valid` cleared.
    fn intersect(
        &self,
        position: &Point3<f64>,
        direction: &Vector3<f64>,
        curvature: Option<f64>,
    ) -> Intersection;

    /// Whether a global position lies on the surface
    fn is_on_surface(&self, position: &Point3<f64>, boundary_check: BoundaryCheck) -> bool;

    /// Project a global position into the local 2D parameter frame
    ///
    /// Returns `None` if the position cannot be projected (e.g. it is not
    /// near the surface plane within tolerance for shapes that require it).
    fn local_position(&self, position: &Point3<f64>) -> Option<Point2<f64>>;
}

/// Pointer identity of two shared surfaces
pub fn same_surface(a: &SurfaceRef, b: &SurfaceRef) -> bool {
    Arc::ptr_eq(a, b)
}
