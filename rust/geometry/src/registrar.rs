// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One-shot geometry closing.
//!
//! The closing step runs once per layer at the end of geometry
//! construction, never from query code: it derives the layer's stable
//! identifier from the enclosing volume's prefix, assigns identifiers to
//! the owned sub-surfaces and builds the identifier to detector-element
//! lookup table. After closing, a layer is logically immutable.

use crate::layer::Layer;
use tracklite_core::GeometryId;

/// Assigns stable identifiers and builds the detector-element table
pub struct GeometryRegistrar;

impl GeometryRegistrar {
    /// Close one layer under its identifier prefix
    ///
    /// Indexed sub-surfaces get sensitive fields counted from 1 in stable
    /// index order, and every sub-surface carrying a detector element
    /// lands in the lookup table under its assigned identifier.
    ///
    /// Calling this twice is a construction error the registrar does not
    /// police (callers can consult [`Layer::is_closed`]); the state is
    /// rebuilt from scratch, so a second close under a different prefix
    /// leaves only entries reachable from that second prefix.
    pub fn close(layer: &mut Layer, layer_id: GeometryId) {
        layer.close_geometry(layer_id);

        tracing::debug!(
            layer_id = %layer.geometry_id(),
            elements = layer.detector_elements().len(),
            "Closed layer geometry"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approach::ApproachDescriptor;
    use crate::layer::{LayerBuilder, LayerKind};
    use crate::surface_array::SurfaceArray;
    use std::sync::Arc;
    use tracklite_core::{
        BinUtility, BinningData, BinningOption, DetectorElementId, Isometry3, PlaneSurface,
        RectangleBounds, SurfaceRef,
    };

    fn sensitive_row_layer() -> Layer {
        let bounds = RectangleBounds::new(0.5, 0.5).unwrap();
        let surfaces: Vec<SurfaceRef> = (0..3)
            .map(|i| {
                Arc::new(PlaneSurface::sensitive(
                    Isometry3::translation(i as f64, 0.0, 0.0),
                    bounds,
                    DetectorElementId(100 + i as u64),
                )) as SurfaceRef
            })
            .collect();

        let utility = BinUtility::one_dimensional(
            BinningData::equidistant(-0.5, 2.5, 3, BinningOption::Open).unwrap(),
        );
        let array = SurfaceArray::new(Isometry3::identity(), utility, surfaces).unwrap();

        let faces = RectangleBounds::new(2.0, 2.0).unwrap();
        let descriptor = ApproachDescriptor::new(vec![
            Arc::new(PlaneSurface::new(Isometry3::translation(1.0, 0.0, -0.5), faces))
                as SurfaceRef,
            Arc::new(PlaneSurface::new(Isometry3::translation(1.0, 0.0, 0.5), faces))
                as SurfaceRef,
        ]);

        LayerBuilder::new(Arc::new(PlaneSurface::new(
            Isometry3::translation(1.0, 0.0, 0.0),
            RectangleBounds::new(2.0, 2.0).unwrap(),
        )))
        .kind(LayerKind::Active)
        .thickness(1.0)
        .surface_array(array)
        .approach_descriptor(descriptor)
        .finish()
        .unwrap()
    }

    #[test]
    fn test_close_assigns_ids_and_elements() {
        let mut layer = sensitive_row_layer();
        assert!(!layer.is_closed());
        assert!(layer.geometry_id().is_unset());

        let prefix = GeometryId::volume(2).with_layer(4);
        GeometryRegistrar::close(&mut layer, prefix);

        assert!(layer.is_closed());
        assert_eq!(layer.geometry_id(), prefix);
        assert_eq!(layer.detector_elements().len(), 3);

        let ids: Vec<_> = layer.detector_elements().keys().copied().collect();
        for (index, id) in ids.iter().enumerate() {
            assert_eq!(id.volume_id(), 2);
            assert_eq!(id.layer_id(), 4);
            assert_eq!(id.sensitive_id(), index as u64 + 1);
        }
        assert_eq!(
            layer.detector_elements()[&prefix.with_sensitive(1)],
            DetectorElementId(100)
        );

        assert_eq!(
            layer.approach_ids(),
            &[prefix.with_approach(1), prefix.with_approach(2)]
        );
    }

    #[test]
    fn test_substructure_tags() {
        let mut layer = sensitive_row_layer();
        GeometryRegistrar::close(&mut layer, GeometryId::volume(1).with_layer(1));

        let tags = layer.substructure();
        assert_eq!(tags.representing, 1);
        assert_eq!(tags.sensitive, 1);
        assert_eq!(tags.approach, 1);
    }

    #[test]
    fn test_double_close_replaces_not_merges() {
        let mut layer = sensitive_row_layer();

        GeometryRegistrar::close(&mut layer, GeometryId::volume(1).with_layer(1));
        GeometryRegistrar::close(&mut layer, GeometryId::volume(9).with_layer(5));

        // Only entries reachable from the second prefix survive.
        assert_eq!(layer.detector_elements().len(), 3);
        for id in layer.detector_elements().keys() {
            assert_eq!(id.volume_id(), 9);
            assert_eq!(id.layer_id(), 5);
        }
    }

    #[test]
    fn test_close_without_substructure() {
        let mut layer = LayerBuilder::new(Arc::new(PlaneSurface::new(
            Isometry3::identity(),
            RectangleBounds::new(1.0, 1.0).unwrap(),
        )))
        .finish()
        .unwrap();

        GeometryRegistrar::close(&mut layer, GeometryId::volume(1).with_layer(2));

        assert!(layer.is_closed());
        assert!(layer.detector_elements().is_empty());
        assert_eq!(layer.substructure().sensitive, 0);
        assert_eq!(layer.substructure().approach, 0);
    }
}
