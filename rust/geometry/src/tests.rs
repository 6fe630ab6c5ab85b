// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cross-module layer navigation scenarios.

use crate::approach::ApproachDescriptor;
use crate::creator::{LayerCreator, LayerCreatorConfig};
use crate::layer::{Layer, LayerBuilder, LayerKind};
use crate::options::{NavigationOptions, SearchDepth};
use crate::surface_array::SurfaceArray;
use approx::assert_relative_eq;
use proptest::prelude::*;
use std::sync::Arc;
use tracklite_core::{
    same_surface, BinUtility, BinningData, BinningOption, BoundaryCheck, DetectorElementId,
    Isometry3, PlaneSurface, Point3, RectangleBounds, SurfaceKind, SurfaceRef, Vector3,
};

/// Flat active layer with a 3x3 grid of unit squares centered at integer
/// coordinates in the z = 0 plane.
fn grid_layer() -> Layer {
    let bounds = RectangleBounds::new(0.5, 0.5).unwrap();
    let mut surfaces: Vec<SurfaceRef> = Vec::new();
    for x in -1..=1 {
        for y in -1..=1 {
            surfaces.push(Arc::new(PlaneSurface::sensitive(
                Isometry3::translation(x as f64, y as f64, 0.0),
                bounds,
                DetectorElementId(((x + 1) * 3 + (y + 1)) as u64),
            )));
        }
    }
    LayerCreator::new(LayerCreatorConfig::default())
        .plane_layer(surfaces, 0.5, 0.0, 3, 3, Isometry3::identity(), None)
        .unwrap()
}

#[test]
fn test_grid_query_hits_central_square() {
    let layer = grid_layer();
    let options = NavigationOptions::default()
        .with_resolve(true, false, false)
        .with_search_depth(SearchDepth::LocalChecked);

    let hits = layer.compatible_surfaces(
        &Point3::new(0.0, 0.0, -10.0),
        &Vector3::new(0.0, 0.0, 1.0),
        None,
        &options,
    );

    assert_eq!(hits.len(), 1);
    assert_relative_eq!(hits[0].path_length(), 10.0);
    assert_eq!(hits[0].surface.detector_element(), Some(DetectorElementId(4)));
    assert_relative_eq!(hits[0].intersection.position.x, 0.0);
    assert_relative_eq!(hits[0].intersection.position.y, 0.0);
}

#[test]
fn test_grid_query_beyond_path_limit_is_empty() {
    let layer = grid_layer();
    let options = NavigationOptions::default()
        .with_resolve(true, false, false)
        .with_search_depth(SearchDepth::LocalChecked)
        .with_path_limit(5.0);

    assert!(layer
        .compatible_surfaces(
            &Point3::new(0.0, 0.0, -10.0),
            &Vector3::new(0.0, 0.0, 1.0),
            None,
            &options,
        )
        .is_empty());
}

#[test]
fn test_excluded_surfaces_never_appear() {
    let layer = grid_layer();
    let array = layer.surface_array().unwrap();
    let target = array
        .surfaces_near(&Point3::new(0.0, 0.0, 0.0))
        .first()
        .cloned()
        .unwrap();

    let options = NavigationOptions::default()
        .with_search_depth(SearchDepth::ExhaustiveChecked)
        .with_start_surface(target.clone());
    let hits = layer.compatible_surfaces(
        &Point3::new(0.0, 0.0, -10.0),
        &Vector3::new(0.0, 0.0, 1.0),
        None,
        &options,
    );
    assert!(hits.iter().all(|h| !same_surface(&h.surface, &target)));

    let options = NavigationOptions::default()
        .with_search_depth(SearchDepth::ExhaustiveChecked)
        .with_end_surface(target.clone());
    let hits = layer.compatible_surfaces(
        &Point3::new(0.0, 0.0, -10.0),
        &Vector3::new(0.0, 0.0, 1.0),
        None,
        &options,
    );
    assert!(hits.iter().all(|h| !same_surface(&h.surface, &target)));
}

#[test]
fn test_staggered_layer_orders_by_path_length() {
    // Sub-surfaces staggered along z; an exhaustive unchecked scan must
    // come back sorted by absolute path length.
    let bounds = RectangleBounds::new(0.5, 0.5).unwrap();
    let depths = [7.0, 2.0, 9.0, 4.0];
    let surfaces: Vec<SurfaceRef> = depths
        .iter()
        .enumerate()
        .map(|(i, &z)| {
            Arc::new(PlaneSurface::sensitive(
                Isometry3::translation(i as f64, 0.0, z),
                bounds,
                DetectorElementId(i as u64),
            )) as SurfaceRef
        })
        .collect();

    let utility = BinUtility::one_dimensional(
        BinningData::equidistant(-0.5, 3.5, 4, BinningOption::Open).unwrap(),
    );
    let array = SurfaceArray::new(Isometry3::identity(), utility, surfaces).unwrap();
    let layer = LayerBuilder::new(Arc::new(PlaneSurface::new(
        Isometry3::translation(1.5, 0.0, 5.0),
        RectangleBounds::new(3.0, 3.0).unwrap(),
    )))
    .kind(LayerKind::Active)
    .surface_array(array)
    .finish()
    .unwrap();

    let hits = layer.compatible_surfaces(
        &Point3::new(0.0, 0.0, 0.0),
        &Vector3::new(0.0, 0.0, 1.0),
        None,
        &NavigationOptions::default().with_search_depth(SearchDepth::ExhaustiveUnchecked),
    );

    let paths: Vec<f64> = hits.iter().map(|h| h.path_length()).collect();
    assert_eq!(paths, vec![2.0, 4.0, 7.0, 9.0]);
}

#[test]
fn test_approach_then_fine_search() {
    // Step onto the layer through its approach surface, then run the
    // fine-grained search from the approach point.
    let layer = grid_layer();
    let position = Point3::new(0.9, 0.9, -10.0);
    let direction = Vector3::new(0.0, 0.0, 1.0);

    let approach = layer
        .surface_on_approach(&position, &direction, &NavigationOptions::default())
        .unwrap();
    assert_relative_eq!(approach.path_length(), 10.0);

    let hits = layer.compatible_surfaces(
        &approach.intersection.position,
        &direction,
        None,
        &NavigationOptions::default().with_search_depth(SearchDepth::LocalChecked),
    );
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].surface.detector_element(), Some(DetectorElementId(8)));
}

#[test]
fn test_flat_layer_approach_is_representation() {
    let layer = grid_layer();
    let descriptor = layer.approach_descriptor().unwrap();
    assert_eq!(descriptor.len(), 1);

    let hit = layer
        .surface_on_approach(
            &Point3::new(0.0, 0.0, -10.0),
            &Vector3::new(0.0, 0.0, 1.0),
            &NavigationOptions::default(),
        )
        .unwrap();
    assert!(same_surface(&hit.surface, layer.representation()));
}

#[test]
fn test_rebuilt_descriptor_takes_over() {
    let mut layer = grid_layer();
    let face = RectangleBounds::new(2.0, 2.0).unwrap();
    layer
        .rebuild_approach_descriptor(ApproachDescriptor::new(vec![Arc::new(
            PlaneSurface::new(Isometry3::translation(0.0, 0.0, -0.25), face),
        ) as SurfaceRef]))
        .unwrap();

    let hit = layer
        .surface_on_approach(
            &Point3::new(0.0, 0.0, -10.0),
            &Vector3::new(0.0, 0.0, 1.0),
            &NavigationOptions::default(),
        )
        .unwrap();
    assert_relative_eq!(hit.path_length(), 9.75);
}

#[test]
fn test_closed_layer_reads_are_concurrent() {
    let mut layer = grid_layer();
    layer.close_geometry(tracklite_core::GeometryId::volume(1).with_layer(1));
    let layer = Arc::new(layer);

    let reference = layer.compatible_surfaces(
        &Point3::new(0.0, 0.0, -10.0),
        &Vector3::new(0.0, 0.0, 1.0),
        None,
        &NavigationOptions::default(),
    );

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let layer = Arc::clone(&layer);
            std::thread::spawn(move || {
                for _ in 0..100 {
                    let hits = layer.compatible_surfaces(
                        &Point3::new(0.0, 0.0, -10.0),
                        &Vector3::new(0.0, 0.0, 1.0),
                        None,
                        &NavigationOptions::default(),
                    );
                    assert_eq!(hits.len(), 1);
                    assert_eq!(hits[0].path_length(), 10.0);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(reference.len(), 1);
}

proptest! {
    /// Results are sorted by absolute path length, stay within the path
    /// window and match the requested surface kind.
    #[test]
    fn prop_search_is_sorted_and_filtered(
        x in -2.0..2.0f64,
        y in -2.0..2.0f64,
        dx in -0.3..0.3f64,
        dy in -0.3..0.3f64,
        limit in 0.0..40.0f64,
    ) {
        let layer = grid_layer();
        let direction = Vector3::new(dx, dy, 1.0).normalize();
        let options = NavigationOptions::default()
            .with_resolve(true, false, false)
            .with_search_depth(SearchDepth::ExhaustiveChecked)
            .with_path_limit(limit);

        let hits = layer.compatible_surfaces(
            &Point3::new(x, y, -10.0),
            &direction,
            None,
            &options,
        );

        for window in hits.windows(2) {
            prop_assert!(
                window[0].path_length().abs() <= window[1].path_length().abs()
            );
        }
        for hit in &hits {
            prop_assert!(hit.path_length() >= 0.0);
            prop_assert!(hit.path_length() <= limit);
            prop_assert_eq!(hit.surface.kind(), SurfaceKind::Sensitive);
        }
    }

    /// The bin lookup is a pure function of the query point.
    #[test]
    fn prop_surfaces_near_is_deterministic(
        x in -3.0..3.0f64,
        y in -3.0..3.0f64,
        z in -10.0..10.0f64,
    ) {
        let layer = grid_layer();
        let array = layer.surface_array().unwrap();
        let position = Point3::new(x, y, z);

        let first = array.surfaces_near(&position);
        let second = array.surfaces_near(&position);
        prop_assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            prop_assert!(same_surface(a, b));
        }
    }

    /// Depth levels only ever narrow the result, never reorder it.
    #[test]
    fn prop_local_results_are_subset_of_exhaustive(
        x in -1.4..1.4f64,
        y in -1.4..1.4f64,
    ) {
        let layer = grid_layer();
        let position = Point3::new(x, y, -10.0);
        let direction = Vector3::new(0.0, 0.0, 1.0);

        let local = layer.compatible_surfaces(
            &position,
            &direction,
            None,
            &NavigationOptions::default().with_search_depth(SearchDepth::LocalChecked),
        );
        let exhaustive = layer.compatible_surfaces(
            &position,
            &direction,
            None,
            &NavigationOptions::default().with_search_depth(SearchDepth::ExhaustiveChecked),
        );

        for hit in &local {
            prop_assert!(exhaustive
                .iter()
                .any(|e| same_surface(&e.surface, &hit.surface)));
        }
    }
}

#[test]
fn test_boundary_check_off_accepts_lateral_misses() {
    let layer = grid_layer();
    // Laterally outside every square: no hit under a checked search.
    let position = Point3::new(5.0, 5.0, -10.0);
    let direction = Vector3::new(0.0, 0.0, 1.0);

    let checked = layer.compatible_surfaces(
        &position,
        &direction,
        None,
        &NavigationOptions::default()
            .with_search_depth(SearchDepth::ExhaustiveChecked)
            .with_boundary_check(BoundaryCheck::On),
    );
    assert!(checked.is_empty());

    let unchecked = layer.compatible_surfaces(
        &position,
        &direction,
        None,
        &NavigationOptions::default().with_search_depth(SearchDepth::ExhaustiveUnchecked),
    );
    assert_eq!(unchecked.len(), 9);
}
