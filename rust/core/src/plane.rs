// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar surface primitive.
//!
//! A [`PlaneSurface`] is a rectangle-bounded plane placed in the global
//! frame by an isometry. It is the workhorse surface for plane layers:
//! sensitive modules, material planes and approach surfaces are all plane
//! surfaces with different classifications.

use crate::bounds::RectangleBounds;
use crate::identifier::DetectorElementId;
use crate::surface::{
    BoundaryCheck, Intersection, Surface, SurfaceKind, ON_SURFACE_TOLERANCE,
};
use nalgebra::{Isometry3, Point2, Point3, Vector3};

/// Denominator cutoff below which a trajectory counts as parallel
const PARALLEL_CUTOFF: f64 = 1e-12;

/// Rectangle-bounded plane in the global frame
///
/// The local frame has x/y in the plane and z along the normal; the
/// isometry maps local to global coordinates.
#[derive(Debug, Clone)]
pub struct PlaneSurface {
    transform: Isometry3<f64>,
    bounds: RectangleBounds,
    kind: SurfaceKind,
    material: bool,
    element: Option<DetectorElementId>,
}

impl PlaneSurface {
    /// Create a passive plane surface without material
    pub fn new(transform: Isometry3<f64>, bounds: RectangleBounds) -> Self {
        Self {
            transform,
            bounds,
            kind: SurfaceKind::Passive,
            material: false,
            element: None,
        }
    }

    /// Create a sensitive plane surface hosting a detector element
    pub fn sensitive(
        transform: Isometry3<f64>,
        bounds: RectangleBounds,
        element: DetectorElementId,
    ) -> Self {
        Self {
            transform,
            bounds,
            kind: SurfaceKind::Sensitive,
            material: false,
            element: Some(element),
        }
    }

    /// Override the navigation classification
    pub fn with_kind(mut self, kind: SurfaceKind) -> Self {
        self.kind = kind;
        self
    }

    /// Mark the surface as carrying material
    pub fn with_material(mut self) -> Self {
        self.material = true;
        self
    }

    /// Placement of the local frame in the global frame
    pub fn transform(&self) -> &Isometry3<f64> {
        &self.transform
    }

    /// Lateral bounds in the local frame
    pub fn bounds(&self) -> &RectangleBounds {
        &self.bounds
    }
}

impl Surface for PlaneSurface {
    fn kind(&self) -> SurfaceKind {
        self.kind
    }

    fn has_material(&self) -> bool {
        self.material
    }

    fn detector_element(&self) -> Option<DetectorElementId> {
        self.element
    }

    fn center(&self) -> Point3<f64> {
        self.transform.translation.vector.into()
    }

    fn normal(&self, _position: &Point3<f64>) -> Vector3<f64> {
        self.transform.transform_vector(&Vector3::z())
    }

    /// Straight-line plane intersection
    ///
    /// The curvature hint is ignored: a plane is intersected exactly by
    /// the straight-line estimate.
    fn intersect(
        &self,
        position: &Point3<f64>,
        direction: &Vector3<f64>,
        _curvature: Option<f64>,
    ) -> Intersection {
        let normal = self.normal(position);
        let denom = direction.dot(&normal);
        if denom.abs() < PARALLEL_CUTOFF {
            return Intersection::invalid(*position);
        }
        let path_length = (self.center() - position).dot(&normal) / denom;
        if !path_length.is_finite() {
            return Intersection::invalid(*position);
        }
        Intersection {
            position: position + direction * path_length,
            path_length,
            valid: true,
        }
    }

    fn is_on_surface(&self, position: &Point3<f64>, boundary_check: BoundaryCheck) -> bool {
        let local = self.transform.inverse_transform_point(position);
        if local.z.abs() > ON_SURFACE_TOLERANCE {
            return false;
        }
        !boundary_check.is_enabled()
            || self
                .bounds
                .inside(&Point2::new(local.x, local.y), ON_SURFACE_TOLERANCE)
    }

    fn local_position(&self, position: &Point3<f64>) -> Option<Point2<f64>> {
        let local = self.transform.inverse_transform_point(position);
        Some(Point2::new(local.x, local.y))
    }
}
