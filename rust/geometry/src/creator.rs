// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Layer factory.
//!
//! A [`LayerCreator`] assembles a plane layer from its sensitive surfaces:
//! it measures the local extent, builds the bin grid and the surface
//! array, derives the representing surface and the default approach
//! descriptor, and validates that every surface is reachable through the
//! binning.

use crate::approach::ApproachDescriptor;
use crate::error::{Error, Result};
use crate::layer::{Layer, LayerBuilder, LayerKind};
use crate::surface_array::SurfaceArray;
use nalgebra::Translation3;
use tracklite_core::{
    same_surface, BinUtility, BinningData, BinningOption, Isometry3, PlaneSurface,
    RectangleBounds, SurfaceRef,
};

/// Configuration for the [`LayerCreator`]
#[derive(Clone, Debug)]
pub struct LayerCreatorConfig {
    /// Neighbor-bin expansion radius handed to the surface arrays
    pub neighbor_radius: usize,
}

impl Default for LayerCreatorConfig {
    fn default() -> Self {
        Self { neighbor_radius: 0 }
    }
}

/// Builds plane layers from sensitive surfaces
pub struct LayerCreator {
    cfg: LayerCreatorConfig,
}

/// Local extent of a set of surfaces, per axis
struct Extent {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
    min_z: f64,
    max_z: f64,
}

impl LayerCreator {
    /// Create a layer creator with the given configuration
    pub fn new(cfg: LayerCreatorConfig) -> Self {
        Self { cfg }
    }

    /// Build an active plane layer from sensitive surfaces
    ///
    /// `transform` places the nominal layer frame; the layer is recentered
    /// on the measured extent of the surfaces. `envelope_xy` and
    /// `envelope_z` are added around that extent laterally and along the
    /// normal; the layer thickness is the z extent plus both envelopes.
    /// When no `approach` descriptor is handed in, a default one is built
    /// from the two layer faces (or the representing surface itself for a
    /// thickness-zero layer).
    pub fn plane_layer(
        &self,
        surfaces: Vec<SurfaceRef>,
        envelope_xy: f64,
        envelope_z: f64,
        bins_x: usize,
        bins_y: usize,
        transform: Isometry3<f64>,
        approach: Option<ApproachDescriptor>,
    ) -> Result<Layer> {
        if surfaces.is_empty() {
            return Err(Error::EmptyLayer("plane layer needs surfaces".into()));
        }

        let extent = self.measure_extent(&surfaces, &transform);

        let half_x = 0.5 * (extent.max_x - extent.min_x) + envelope_xy;
        let half_y = 0.5 * (extent.max_y - extent.min_y) + envelope_xy;
        let thickness = (extent.max_z - extent.min_z) + 2.0 * envelope_z;

        // Recenter the layer frame on the measured extent.
        let center = Translation3::new(
            0.5 * (extent.min_x + extent.max_x),
            0.5 * (extent.min_y + extent.max_y),
            0.5 * (extent.min_z + extent.max_z),
        );
        let layer_transform = transform * center;

        let bounds = RectangleBounds::new(half_x, half_y).map_err(Error::from)?;
        let representation: SurfaceRef =
            std::sync::Arc::new(PlaneSurface::new(layer_transform, bounds));

        let utility = BinUtility::two_dimensional(
            BinningData::equidistant(-half_x, half_x, bins_x, BinningOption::Open)?,
            BinningData::equidistant(-half_y, half_y, bins_y, BinningOption::Open)?,
        );
        let array = SurfaceArray::new(layer_transform, utility, surfaces)?
            .with_neighbor_radius(self.cfg.neighbor_radius);
        self.check_binning(&array);

        let descriptor = match approach {
            Some(descriptor) => descriptor,
            None => self.default_approach(&representation, layer_transform, bounds, thickness),
        };

        tracing::debug!(
            surfaces = array.len(),
            bins_x,
            bins_y,
            thickness,
            "Built plane layer"
        );

        LayerBuilder::new(representation)
            .kind(LayerKind::Active)
            .thickness(thickness)
            .surface_array(array)
            .approach_descriptor(descriptor)
            .finish()
    }

    /// Extent of the surface centers in the nominal layer frame
    fn measure_extent(&self, surfaces: &[SurfaceRef], transform: &Isometry3<f64>) -> Extent {
        let mut extent = Extent {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
            min_z: f64::INFINITY,
            max_z: f64::NEG_INFINITY,
        };
        for surface in surfaces {
            let local = transform.inverse_transform_point(&surface.center());
            extent.min_x = extent.min_x.min(local.x);
            extent.max_x = extent.max_x.max(local.x);
            extent.min_y = extent.min_y.min(local.y);
            extent.max_y = extent.max_y.max(local.y);
            extent.min_z = extent.min_z.min(local.z);
            extent.max_z = extent.max_z.max(local.z);
        }
        extent
    }

    /// Default approach descriptor: the two layer faces, or the
    /// representing surface itself for a flat layer
    fn default_approach(
        &self,
        representation: &SurfaceRef,
        layer_transform: Isometry3<f64>,
        bounds: RectangleBounds,
        thickness: f64,
    ) -> ApproachDescriptor {
        if thickness > 0.0 {
            let half = 0.5 * thickness;
            ApproachDescriptor::new(vec![
                std::sync::Arc::new(PlaneSurface::new(
                    layer_transform * Translation3::new(0.0, 0.0, -half),
                    bounds,
                )) as SurfaceRef,
                std::sync::Arc::new(PlaneSurface::new(
                    layer_transform * Translation3::new(0.0, 0.0, half),
                    bounds,
                )) as SurfaceRef,
            ])
        } else {
            ApproachDescriptor::new(vec![representation.clone()])
        }
    }

    /// Validate that every surface is reachable through the binning
    ///
    /// A surface whose center bins into a cell that does not contain it
    /// would be invisible to the local search depths.
    fn check_binning(&self, array: &SurfaceArray) {
        let mut unreachable = 0usize;
        for surface in array.all_surfaces() {
            let bin = array.bin_of(&surface.center());
            if !array
                .surfaces_at(bin)
                .iter()
                .any(|s| same_surface(s, surface))
            {
                unreachable += 1;
            }
        }
        if unreachable > 0 {
            tracing::warn!(unreachable, "Surfaces not reachable through their bin");
        }

        let (bins_x, bins_y) = array.bin_utility().bins();
        let empty = (0..bins_x)
            .flat_map(|bx| (0..bins_y).map(move |by| (bx, by)))
            .filter(|&bin| array.surfaces_at(bin).is_empty())
            .count();
        if empty > 0 {
            tracing::debug!(empty, total = bins_x * bins_y, "Bin grid has empty bins");
        }
    }
}
