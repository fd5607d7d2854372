// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered layer records and occupancy tracking.
//!
//! A *layer* is an ordered slot that holds at most one non-dialog view at
//! any observable instant. Layers are registered once at startup from the
//! registrar's ordered list; the position in that list is the layer's
//! order index, which defines both stacking and the direction of overlay
//! scans (highest index first).
//!
//! Occupancy mutations go through the
//! [`ViewManager`](crate::ViewManager), which is the only component
//! allowed to arbitrate evictions; embedders read layer state through the
//! accessors here.

use std::collections::BTreeMap;

use crate::id::{ChannelMask, LayerId, SurfaceId, ViewId};
use crate::registry::LayerSpec;

/// The view currently occupying a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Occupant {
    /// Id of the occupying view.
    pub view: ViewId,
    /// Surface of the occupying view's instance.
    pub surface: SurfaceId,
}

/// A single ordered layer record.
#[derive(Debug)]
pub struct Layer {
    id: LayerId,
    name: String,
    channels: ChannelMask,
    is_overlay: bool,
    container: SurfaceId,
    occupant: Option<Occupant>,
}

impl Layer {
    /// The layer's order index handle.
    #[inline]
    #[must_use]
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// The layer's display name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Auxiliary-channel flags requested for this layer.
    #[inline]
    #[must_use]
    pub fn channels(&self) -> ChannelMask {
        self.channels
    }

    /// Whether the layer participates in scrim placement.
    #[inline]
    #[must_use]
    pub fn is_overlay(&self) -> bool {
        self.is_overlay
    }

    /// Surface of the layer's container node.
    #[inline]
    #[must_use]
    pub fn container(&self) -> SurfaceId {
        self.container
    }

    /// The current occupant, if any.
    #[inline]
    #[must_use]
    pub fn occupant(&self) -> Option<Occupant> {
        self.occupant
    }

    /// Whether a view currently occupies the layer.
    #[inline]
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }
}

/// Ordered collection of layers, keyed by order index.
///
/// No two layers share an id, and iteration follows the order index from
/// lowest to highest.
#[derive(Debug, Default)]
pub struct LayerTable {
    layers: BTreeMap<LayerId, Layer>,
    contains_overlay: bool,
}

impl LayerTable {
    /// Creates an empty table.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers a layer, or updates it if the order index is already
    /// taken (idempotent upsert). An existing layer keeps its container
    /// and occupant.
    ///
    /// Once any overlay layer has been registered the table reports
    /// [`contains_overlay`](Self::contains_overlay) from then on, even if
    /// a later upsert flips that layer back.
    pub(crate) fn register(&mut self, id: LayerId, spec: &LayerSpec, container: SurfaceId) {
        let name = if spec.name.is_empty() {
            format!("Layer {}", id.index())
        } else {
            spec.name.clone()
        };

        match self.layers.get_mut(&id) {
            Some(layer) => {
                layer.name = name;
                layer.channels = spec.channels;
                layer.is_overlay = spec.is_overlay;
            }
            None => {
                self.layers.insert(
                    id,
                    Layer {
                        id,
                        name,
                        channels: spec.channels,
                        is_overlay: spec.is_overlay,
                        container,
                        occupant: None,
                    },
                );
            }
        }

        if spec.is_overlay {
            self.contains_overlay = true;
        }
    }

    /// Returns the layer with the given id.
    #[must_use]
    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    /// Whether any overlay layer has ever been registered.
    #[inline]
    #[must_use]
    pub fn contains_overlay(&self) -> bool {
        self.contains_overlay
    }

    /// Records `occupant` as the single occupant of `id`.
    pub(crate) fn set_occupant(&mut self, id: LayerId, view: ViewId, surface: SurfaceId) {
        if let Some(layer) = self.layers.get_mut(&id) {
            layer.occupant = Some(Occupant { view, surface });
        }
    }

    /// Clears the occupant of `id`.
    pub(crate) fn clear_occupant(&mut self, id: LayerId) {
        if let Some(layer) = self.layers.get_mut(&id) {
            layer.occupant = None;
        }
    }

    /// Scans layers from the highest order index down and returns the
    /// first occupied overlay layer whose occupant is not in `excluded`.
    #[must_use]
    pub fn topmost_occupied_overlay(&self, excluded: &[ViewId]) -> Option<&Layer> {
        self.layers.values().rev().find(|layer| {
            layer.is_overlay
                && layer
                    .occupant
                    .is_some_and(|occupant| !excluded.contains(&occupant.view))
        })
    }

    /// Iterates over layers from the lowest order index to the highest.
    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.values()
    }

    /// Returns the number of registered layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns whether no layers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
