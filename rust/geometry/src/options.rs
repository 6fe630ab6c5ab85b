// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Query options for layer navigation.
//!
//! A single [`NavigationOptions`] struct carries every directive of the
//! compatible-surface search; callers build one with the defaults and
//! override what they need.

use tracklite_core::{BoundaryCheck, SurfaceRef};

/// Candidate-scan policy of the compatible-surface search
///
/// Ordered from most exhaustive to fastest: exhaustive scans test every
/// indexed surface, local scans restrict to the bin neighborhood of the
/// query position. Unchecked levels skip the lateral-bounds test entirely;
/// checked levels apply the caller's [`BoundaryCheck`] directive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchDepth {
    /// Test every surface, no lateral-bounds test
    ExhaustiveUnchecked,
    /// Test every surface with the boundary-check directive
    ExhaustiveChecked,
    /// Bin-local candidates, no lateral-bounds test
    LocalUnchecked,
    /// Bin-local candidates with the boundary-check directive
    #[default]
    LocalChecked,
}

impl SearchDepth {
    /// Whether this level restricts candidates to the local bin
    pub fn is_local(&self) -> bool {
        matches!(self, SearchDepth::LocalUnchecked | SearchDepth::LocalChecked)
    }

    /// Whether this level applies the lateral-bounds test
    pub fn is_checked(&self) -> bool {
        matches!(
            self,
            SearchDepth::ExhaustiveChecked | SearchDepth::LocalChecked
        )
    }
}

/// Directives for a compatible-surface or approach query
///
/// Defaults: sensitive and material surfaces are resolved, passive ones are
/// not; boundary checking is on; the path length is unlimited; the search
/// runs at the local-checked depth.
#[derive(Clone, Debug)]
pub struct NavigationOptions {
    /// Include sensitive surfaces in the result
    pub resolve_sensitive: bool,
    /// Include material-carrying surfaces in the result
    pub resolve_material: bool,
    /// Include passive surfaces in the result
    pub resolve_passive: bool,
    /// Lateral-bounds directive, applied at checked search depths
    pub boundary_check: BoundaryCheck,
    /// Maximum accepted path length; negative limits yield empty results
    pub path_limit: f64,
    /// Candidate-scan policy
    pub search_depth: SearchDepth,
    /// Surface the trajectory originated on, excluded from results
    pub start_surface: Option<SurfaceRef>,
    /// Surface the trajectory will terminate on, excluded from results
    pub end_surface: Option<SurfaceRef>,
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            resolve_sensitive: true,
            resolve_material: true,
            resolve_passive: false,
            boundary_check: BoundaryCheck::On,
            path_limit: f64::INFINITY,
            search_depth: SearchDepth::default(),
            start_surface: None,
            end_surface: None,
        }
    }
}

impl NavigationOptions {
    /// Override the resolve flags
    pub fn with_resolve(mut self, sensitive: bool, material: bool, passive: bool) -> Self {
        self.resolve_sensitive = sensitive;
        self.resolve_material = material;
        self.resolve_passive = passive;
        self
    }

    /// Override the boundary-check directive
    pub fn with_boundary_check(mut self, boundary_check: BoundaryCheck) -> Self {
        self.boundary_check = boundary_check;
        self
    }

    /// Override the path-length limit
    pub fn with_path_limit(mut self, path_limit: f64) -> Self {
        self.path_limit = path_limit;
        self
    }

    /// Override the search depth
    pub fn with_search_depth(mut self, search_depth: SearchDepth) -> Self {
        self.search_depth = search_depth;
        self
    }

    /// Exclude the surface the trajectory starts on
    pub fn with_start_surface(mut self, surface: SurfaceRef) -> Self {
        self.start_surface = Some(surface);
        self
    }

    /// Exclude the surface the trajectory ends on
    pub fn with_end_surface(mut self, surface: SurfaceRef) -> Self {
        self.end_surface = Some(surface);
        self
    }

    /// Effective boundary check for a given search depth
    pub(crate) fn effective_boundary_check(&self) -> BoundaryCheck {
        if self.search_depth.is_checked() {
            self.boundary_check
        } else {
            BoundaryCheck::Off
        }
    }
}
