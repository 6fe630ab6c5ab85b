// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry-wide layer table with stable handles.
//!
//! Layers reference their neighbors and enclosing volumes through
//! [`LayerId`] / [`VolumeId`] handles into a [`LayerArena`] instead of raw
//! back-pointers, which removes lifetime ambiguity during teardown: the
//! arena owns every layer and handles never dangle while it is alive.

use crate::error::{Error, Result};
use crate::layer::Layer;
use crate::registrar::GeometryRegistrar;
use std::fmt;
use tracklite_core::GeometryId;

/// Stable handle to a layer within a [`LayerArena`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u32);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle to a volume owned by the enclosing geometry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VolumeId(pub u32);

impl fmt::Display for VolumeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owning table of the layers of one geometry
///
/// Handles are insertion-ordered and stable: layers are never removed
/// individually, the whole arena is torn down at once (after the layers,
/// by ownership).
#[derive(Debug, Default)]
pub struct LayerArena {
    layers: Vec<Layer>,
}

impl LayerArena {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of layers in the arena
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the arena holds no layers
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Insert a layer and return its handle
    pub fn insert(&mut self, layer: Layer) -> LayerId {
        let id = LayerId(self.layers.len() as u32);
        self.layers.push(layer);
        id
    }

    /// Resolve a handle
    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(id.0 as usize)
    }

    /// Resolve a handle mutably (construction phase only)
    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(id.0 as usize)
    }

    /// Iterate over all layers with their handles
    pub fn iter(&self) -> impl Iterator<Item = (LayerId, &Layer)> {
        self.layers
            .iter()
            .enumerate()
            .map(|(i, layer)| (LayerId(i as u32), layer))
    }

    /// Wire two layers as neighbors along the ordering axis
    ///
    /// `prev` becomes the previous neighbor of `next` and vice versa.
    pub fn link(&mut self, prev: LayerId, next: LayerId) -> Result<()> {
        self.checked(prev)?;
        self.checked(next)?;
        self.layers[prev.0 as usize].next_layers.next = Some(next);
        self.layers[next.0 as usize].next_layers.prev = Some(prev);
        Ok(())
    }

    /// Register the enclosing tracking volume of a layer
    ///
    /// The reference is set exactly once; a second registration is a
    /// construction error.
    pub fn enclose(&mut self, id: LayerId, volume: VolumeId) -> Result<()> {
        let layer = self.checked_mut(id)?;
        if let Some(existing) = layer.tracking_volume {
            return Err(Error::AlreadyEnclosed(existing.0));
        }
        layer.tracking_volume = Some(volume);
        Ok(())
    }

    /// Register the enclosing detached volume of a layer (at most once)
    pub fn enclose_detached(&mut self, id: LayerId, volume: VolumeId) -> Result<()> {
        let layer = self.checked_mut(id)?;
        if let Some(existing) = layer.detached_volume {
            return Err(Error::AlreadyEnclosed(existing.0));
        }
        layer.detached_volume = Some(volume);
        Ok(())
    }

    /// Close every layer of the arena under one volume prefix
    ///
    /// Drives the registrar in handle order: the n-th layer gets layer
    /// field `n + 1` under `volume_prefix`. Called once by the owning
    /// volume at the end of geometry construction.
    pub fn close_all(&mut self, volume_prefix: GeometryId) -> Result<()> {
        for (index, layer) in self.layers.iter_mut().enumerate() {
            let layer_id = volume_prefix.with_layer(index as u64 + 1);
            GeometryRegistrar::close(layer, layer_id);
        }
        Ok(())
    }

    fn checked(&self, id: LayerId) -> Result<&Layer> {
        self.layers
            .get(id.0 as usize)
            .ok_or(Error::UnknownLayer(id.0))
    }

    fn checked_mut(&mut self, id: LayerId) -> Result<&mut Layer> {
        self.layers
            .get_mut(id.0 as usize)
            .ok_or(Error::UnknownLayer(id.0))
    }
}
