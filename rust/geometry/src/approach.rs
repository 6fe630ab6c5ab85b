// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Approach surfaces of a layer.
//!
//! An [`ApproachDescriptor`] owns the small set of boundary surfaces a
//! trajectory can step onto a layer through (e.g. the two faces of a plane
//! layer) and resolves which one is struck first.

use tracklite_core::{BoundaryCheck, Point3, SurfaceIntersection, SurfaceRef, Vector3};

/// Boundary surfaces of a layer with a first-struck resolution rule
///
/// Immutable after publication; may be rebuilt at most once while the
/// geometry is still under construction.
#[derive(Debug)]
pub struct ApproachDescriptor {
    surfaces: Vec<SurfaceRef>,
}

impl ApproachDescriptor {
    /// Create a descriptor from its boundary surfaces
    pub fn new(surfaces: Vec<SurfaceRef>) -> Self {
        Self { surfaces }
    }

    /// The owned boundary surfaces, for exhaustive iteration
    pub fn surfaces(&self) -> &[SurfaceRef] {
        &self.surfaces
    }

    /// Number of boundary surfaces
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// Whether the descriptor owns no surfaces
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// First boundary surface struck along `direction`
    ///
    /// Selects the smallest non-negative path length among all valid
    /// intersections; with `BoundaryCheck::On` the intersection must also
    /// lie within the surface's lateral bounds. `None` means no boundary
    /// surface is struck, which is a valid outcome, never an error.
    pub fn approach_surface(
        &self,
        position: &Point3<f64>,
        direction: &Vector3<f64>,
        boundary_check: BoundaryCheck,
    ) -> Option<SurfaceIntersection> {
        let mut best: Option<SurfaceIntersection> = None;
        for surface in &self.surfaces {
            let intersection = surface.intersect(position, direction, None);
            if !intersection.valid || intersection.path_length < 0.0 {
                continue;
            }
            if boundary_check.is_enabled()
                && !surface.is_on_surface(&intersection.position, boundary_check)
            {
                continue;
            }
            let closer = best
                .as_ref()
                .map(|b| intersection.path_length < b.path_length())
                .unwrap_or(true);
            if closer {
                best = Some(SurfaceIntersection {
                    surface: surface.clone(),
                    intersection,
                });
            }
        }
        best
    }
}
