// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Detector layer and its navigation queries.
//!
//! A [`Layer`] is a spatial slab of a tracking geometry: it always has a
//! representing surface, may carry a [`SurfaceArray`] of sub-surfaces and
//! an [`ApproachDescriptor`] of boundary surfaces, and knows its neighbors
//! through arena handles. Layers are built with a [`LayerBuilder`] during
//! the single-threaded construction phase and are immutable once the
//! geometry is closed; every query below is a pure read.

use crate::approach::ApproachDescriptor;
use crate::arena::{LayerId, VolumeId};
use crate::error::{Error, Result};
use crate::options::NavigationOptions;
use crate::surface_array::SurfaceArray;
use std::collections::BTreeMap;
use tracklite_core::{
    same_surface, BoundaryCheck, DetectorElementId, GeometryId, Point3, SurfaceIntersection,
    SurfaceKind, SurfaceRef, Vector3, ON_SURFACE_TOLERANCE,
};

/// Navigation role of a layer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerKind {
    /// Pure navigation aid, no physical substance
    Navigation,
    /// Physical but insensitive
    Passive,
    /// Hosts sensitive detector modules
    Active,
}

/// Adjacency handles of a layer, keyed by travel direction sign
///
/// `prev` is the neighbor against the layer normal, `next` the one along
/// it; either side may be unset.
#[derive(Clone, Copy, Debug, Default)]
pub struct NextLayers {
    pub prev: Option<LayerId>,
    pub next: Option<LayerId>,
}

/// Substructure tags of a layer: whether each surface class exists and
/// whether it carries material
///
/// 0 = absent, 1 = present, 2 = present with material. Assigned during
/// geometry closing.
#[derive(Clone, Copy, Debug, Default)]
pub struct SubstructureTags {
    pub representing: u8,
    pub sensitive: u8,
    pub approach: u8,
}

/// A hierarchical layer of a tracking geometry
///
/// Non-cloneable by design: layer identity is object identity. Mutated
/// only during the construction/closing phase (through crate-internal
/// access); afterwards safe for unbounded concurrent reads.
#[derive(Debug)]
pub struct Layer {
    representation: SurfaceRef,
    thickness: f64,
    kind: LayerKind,
    surface_array: Option<SurfaceArray>,
    approach_descriptor: Option<ApproachDescriptor>,
    representing_volume: Option<VolumeId>,
    material: bool,
    approach_rebuilt: bool,
    pub(crate) next_layers: NextLayers,
    pub(crate) tracking_volume: Option<VolumeId>,
    pub(crate) detached_volume: Option<VolumeId>,
    pub(crate) geometry_id: GeometryId,
    pub(crate) closed: bool,
    pub(crate) substructure: SubstructureTags,
    pub(crate) approach_ids: Vec<GeometryId>,
    pub(crate) detector_elements: BTreeMap<GeometryId, DetectorElementId>,
}

impl Layer {
    /// The representing surface standing in for the layer during coarse
    /// navigation
    pub fn representation(&self) -> &SurfaceRef {
        &self.representation
    }

    /// Thickness along the layer normal
    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    /// Navigation role of this layer
    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    /// The spatial index of sub-surfaces, if the layer has one
    pub fn surface_array(&self) -> Option<&SurfaceArray> {
        self.surface_array.as_ref()
    }

    /// The approach descriptor, if the layer has one
    pub fn approach_descriptor(&self) -> Option<&ApproachDescriptor> {
        self.approach_descriptor.as_ref()
    }

    /// Handle of the volume representing the layer's 3D extent, if any
    pub fn representing_volume(&self) -> Option<VolumeId> {
        self.representing_volume
    }

    /// Handle of the enclosing tracking volume, set exactly once
    pub fn tracking_volume(&self) -> Option<VolumeId> {
        self.tracking_volume
    }

    /// Handle of the enclosing detached volume, set at most once
    pub fn detached_volume(&self) -> Option<VolumeId> {
        self.detached_volume
    }

    /// Stable identifier assigned at geometry closing
    pub fn geometry_id(&self) -> GeometryId {
        self.geometry_id
    }

    /// Whether the closing step has run; queries before closing see stale
    /// or absent identifiers
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Substructure tags assigned at geometry closing
    pub fn substructure(&self) -> SubstructureTags {
        self.substructure
    }

    /// Whether any surface of the layer carries material
    pub fn has_material(&self) -> bool {
        self.material
    }

    /// Identifier to detector-element map, populated at geometry closing
    pub fn detector_elements(&self) -> &BTreeMap<GeometryId, DetectorElementId> {
        &self.detector_elements
    }

    /// Identifiers of the approach surfaces, in descriptor order,
    /// assigned at geometry closing
    pub fn approach_ids(&self) -> &[GeometryId] {
        &self.approach_ids
    }

    /// Replace the approach descriptor during construction
    ///
    /// Permitted at most once, and only before the geometry is closed.
    pub fn rebuild_approach_descriptor(
        &mut self,
        descriptor: ApproachDescriptor,
    ) -> Result<()> {
        if self.closed {
            return Err(Error::InvalidLayer(
                "approach descriptor cannot be rebuilt after closing".into(),
            ));
        }
        if self.approach_rebuilt {
            return Err(Error::InvalidLayer(
                "approach descriptor already rebuilt once".into(),
            ));
        }
        self.approach_rebuilt = true;
        self.approach_descriptor = Some(descriptor);
        Ok(())
    }

    /// Accept this layer for a broader traversal
    ///
    /// Active layers need `sensitive`, material-carrying layers need
    /// `material`, passive and navigation layers need `passive`. A coarse
    /// pre-filter ahead of the per-surface search.
    pub fn resolve(&self, sensitive: bool, material: bool, passive: bool) -> bool {
        (sensitive && self.kind == LayerKind::Active)
            || (material && self.material)
            || (passive && matches!(self.kind, LayerKind::Passive | LayerKind::Navigation))
    }

    /// [`resolve`](Self::resolve) driven by the options struct
    pub fn resolve_with(&self, options: &NavigationOptions) -> bool {
        self.resolve(
            options.resolve_sensitive,
            options.resolve_material,
            options.resolve_passive,
        )
    }

    /// Geometric membership test with thickness tolerance
    pub fn on_layer(&self, position: &Point3<f64>, boundary_check: BoundaryCheck) -> bool {
        let normal = self.representation.normal(position);
        let distance = (position - self.representation.center()).dot(&normal);
        if distance.abs() > 0.5 * self.thickness + ON_SURFACE_TOLERANCE {
            return false;
        }
        if boundary_check.is_enabled() {
            let projected = position - normal * distance;
            self.representation.is_on_surface(&projected, boundary_check)
        } else {
            true
        }
    }

    /// Ordered compatible-surface search
    ///
    /// Candidates come from the surface array per the options' search
    /// depth, or from the representing surface alone when the layer has no
    /// index. Kept intersections are valid, lie within `[0, path_limit]`,
    /// pass the effective boundary check, match an enabled resolve flag and
    /// are neither the start nor the end surface. The result is sorted
    /// ascending by absolute path length with ties kept in input order; an
    /// empty result means "no compatible surface", never an error.
    pub fn compatible_surfaces(
        &self,
        position: &Point3<f64>,
        direction: &Vector3<f64>,
        curvature: Option<f64>,
        options: &NavigationOptions,
    ) -> Vec<SurfaceIntersection> {
        if options.path_limit < 0.0 {
            return Vec::new();
        }

        let boundary_check = options.effective_boundary_check();
        let mut out = Vec::new();

        match &self.surface_array {
            None => {
                self.test_compatible(
                    &self.representation,
                    position,
                    direction,
                    curvature,
                    boundary_check,
                    options,
                    &mut out,
                );
            }
            Some(array) => {
                if options.search_depth.is_local() {
                    for surface in array.surfaces_near(position) {
                        self.test_compatible(
                            &surface,
                            position,
                            direction,
                            curvature,
                            boundary_check,
                            options,
                            &mut out,
                        );
                    }
                } else {
                    for surface in array.all_surfaces() {
                        self.test_compatible(
                            surface,
                            position,
                            direction,
                            curvature,
                            boundary_check,
                            options,
                            &mut out,
                        );
                    }
                }
            }
        }

        // Stable sort: ties keep candidate input order.
        out.sort_by(|a, b| {
            a.path_length()
                .abs()
                .total_cmp(&b.path_length().abs())
        });
        out
    }

    /// Intersection-test one candidate and collect it if compatible
    #[allow(clippy::too_many_arguments)]
    fn test_compatible(
        &self,
        surface: &SurfaceRef,
        position: &Point3<f64>,
        direction: &Vector3<f64>,
        curvature: Option<f64>,
        boundary_check: BoundaryCheck,
        options: &NavigationOptions,
        out: &mut Vec<SurfaceIntersection>,
    ) {
        if let Some(start) = &options.start_surface {
            if same_surface(surface, start) {
                return;
            }
        }
        if let Some(end) = &options.end_surface {
            if same_surface(surface, end) {
                return;
            }
        }
        if !accepts(surface, options) {
            return;
        }

        let intersection = surface.intersect(position, direction, curvature);
        if !intersection.valid
            || intersection.path_length < 0.0
            || intersection.path_length > options.path_limit
        {
            return;
        }
        if boundary_check.is_enabled()
            && !surface.is_on_surface(&intersection.position, boundary_check)
        {
            return;
        }

        out.push(SurfaceIntersection {
            surface: surface.clone(),
            intersection,
        });
    }

    /// Surface seen on approach
    ///
    /// The primitive used to step onto the layer: with an approach
    /// descriptor and substructure resolution enabled it is the first
    /// boundary surface struck, otherwise the representing surface.
    pub fn surface_on_approach(
        &self,
        position: &Point3<f64>,
        direction: &Vector3<f64>,
        options: &NavigationOptions,
    ) -> Option<SurfaceIntersection> {
        let resolve_any =
            options.resolve_sensitive || options.resolve_material || options.resolve_passive;
        if resolve_any {
            if let Some(descriptor) = &self.approach_descriptor {
                return descriptor.approach_surface(position, direction, options.boundary_check);
            }
        }

        let intersection = self.representation.intersect(position, direction, None);
        if !intersection.valid
            || intersection.path_length < 0.0
            || intersection.path_length > options.path_limit
        {
            return None;
        }
        if options.boundary_check.is_enabled()
            && !self
                .representation
                .is_on_surface(&intersection.position, options.boundary_check)
        {
            return None;
        }
        Some(SurfaceIntersection {
            surface: self.representation.clone(),
            intersection,
        })
    }

    /// Fast adjacency navigation
    ///
    /// Picks the neighbor on the side matching the sign of `direction`
    /// projected onto the layer normal; `None` if no neighbor is
    /// registered there.
    pub fn next_layer(&self, position: &Point3<f64>, direction: &Vector3<f64>) -> Option<LayerId> {
        let normal = self.representation.normal(position);
        if direction.dot(&normal) >= 0.0 {
            self.next_layers.next
        } else {
            self.next_layers.prev
        }
    }

    /// Field-level closing step, driven by the registrar
    ///
    /// The element map is rebuilt from scratch, never merged: stale
    /// entries must not survive a re-close under a different prefix.
    pub(crate) fn close_geometry(&mut self, layer_id: GeometryId) {
        self.geometry_id = layer_id;
        self.detector_elements.clear();
        self.approach_ids.clear();

        let mut tags = SubstructureTags {
            representing: if self.representation.has_material() { 2 } else { 1 },
            ..Default::default()
        };

        if let Some(descriptor) = &self.approach_descriptor {
            tags.approach = substructure_tag(descriptor.surfaces());
            for index in 0..descriptor.len() {
                self.approach_ids
                    .push(layer_id.with_approach(index as u64 + 1));
            }
        }
        if let Some(array) = &self.surface_array {
            tags.sensitive = substructure_tag(array.all_surfaces());
            for (index, surface) in array.all_surfaces().iter().enumerate() {
                if let Some(element) = surface.detector_element() {
                    let surface_id = layer_id.with_sensitive(index as u64 + 1);
                    self.detector_elements.insert(surface_id, element);
                }
            }
        }

        self.substructure = tags;
        self.closed = true;
    }
}

/// 0 = absent, 1 = present, 2 = present with material
fn substructure_tag(surfaces: &[SurfaceRef]) -> u8 {
    if surfaces.is_empty() {
        0
    } else if surfaces.iter().any(|s| s.has_material()) {
        2
    } else {
        1
    }
}

/// Whether a surface's classification matches an enabled resolve flag
fn accepts(surface: &SurfaceRef, options: &NavigationOptions) -> bool {
    (options.resolve_sensitive && surface.kind() == SurfaceKind::Sensitive)
        || (options.resolve_material
            && (surface.has_material() || surface.kind() == SurfaceKind::Material))
        || (options.resolve_passive && surface.kind() == SurfaceKind::Passive)
}

/// Two-phase builder producing an immutable [`Layer`]
///
/// Only geometry-assembly code holds a builder; queries only ever see the
/// finished layer.
pub struct LayerBuilder {
    representation: SurfaceRef,
    thickness: f64,
    kind: LayerKind,
    surface_array: Option<SurfaceArray>,
    approach_descriptor: Option<ApproachDescriptor>,
    representing_volume: Option<VolumeId>,
}

impl LayerBuilder {
    /// Start a layer around its representing surface
    pub fn new(representation: SurfaceRef) -> Self {
        Self {
            representation,
            thickness: 0.0,
            kind: LayerKind::Passive,
            surface_array: None,
            approach_descriptor: None,
            representing_volume: None,
        }
    }

    /// Thickness along the layer normal
    pub fn thickness(mut self, thickness: f64) -> Self {
        self.thickness = thickness;
        self
    }

    /// Navigation role
    pub fn kind(mut self, kind: LayerKind) -> Self {
        self.kind = kind;
        self
    }

    /// Attach the spatial index of sub-surfaces
    pub fn surface_array(mut self, array: SurfaceArray) -> Self {
        self.surface_array = Some(array);
        self
    }

    /// Attach the approach descriptor
    pub fn approach_descriptor(mut self, descriptor: ApproachDescriptor) -> Self {
        self.approach_descriptor = Some(descriptor);
        self
    }

    /// Attach the handle of the representing volume
    pub fn representing_volume(mut self, volume: VolumeId) -> Self {
        self.representing_volume = Some(volume);
        self
    }

    /// Finish into an immutable layer
    pub fn finish(self) -> Result<Layer> {
        if !(self.thickness >= 0.0) {
            return Err(Error::InvalidLayer(format!(
                "thickness must be non-negative, got {}",
                self.thickness
            )));
        }

        let material = self.representation.has_material()
            || self
                .surface_array
                .as_ref()
                .map(|a| a.all_surfaces().iter().any(|s| s.has_material()))
                .unwrap_or(false)
            || self
                .approach_descriptor
                .as_ref()
                .map(|d| d.surfaces().iter().any(|s| s.has_material()))
                .unwrap_or(false);

        Ok(Layer {
            representation: self.representation,
            thickness: self.thickness,
            kind: self.kind,
            surface_array: self.surface_array,
            approach_descriptor: self.approach_descriptor,
            representing_volume: self.representing_volume,
            material,
            approach_rebuilt: false,
            next_layers: NextLayers::default(),
            tracking_volume: None,
            detached_volume: None,
            geometry_id: GeometryId::default(),
            closed: false,
            substructure: SubstructureTags::default(),
            approach_ids: Vec::new(),
            detector_elements: BTreeMap::new(),
        })
    }
}
