// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registration input and the immutable view registry.
//!
//! An external registrar supplies a [`RegistrarConfig`] once at startup:
//! an ordered layer list and a view list. The engine validates each view
//! entry individually — an entry with an empty name, a duplicate id, or an
//! empty content reference is skipped with a warning and the rest of the
//! list still loads. Valid entries become [`ViewDescriptor`]s, which are
//! immutable for the rest of the process lifetime.

use std::collections::BTreeMap;

use crate::diag::DiagSink;
use crate::id::{ChannelMask, LayerId, ViewId};

/// One entry of the ordered layer list.
///
/// The position of the entry in [`RegistrarConfig::layers`] is the layer's
/// order index and becomes its [`LayerId`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerSpec {
    /// Display name for the layer. Empty names are replaced with
    /// `"Layer {index}"` at registration.
    pub name: String,
    /// Whether the layer participates in scrim placement even when no
    /// dialog is active.
    pub is_overlay: bool,
    /// Auxiliary-channel flags passed through to the embedder.
    pub channels: ChannelMask,
}

/// One entry of the view list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewSpec {
    /// Unique name; the view's [`ViewId`] is derived from it.
    pub name: String,
    /// Order index of the target layer. Ignored for dialogs.
    pub layer_index: u32,
    /// Content reference handed to the view loader (e.g. an asset path).
    pub content_ref: String,
    /// Dialogs stack independently above all layers.
    pub is_dialog: bool,
    /// Persistent views survive removal in a deactivated state.
    pub is_persistent: bool,
    /// Key selecting the [`ViewLoader`](crate::view::ViewLoader) that
    /// produces this view's instance.
    pub loader_key: String,
}

/// Startup configuration supplied by the registrar collaborator.
#[derive(Clone, Debug, Default)]
pub struct RegistrarConfig {
    /// Ordered layer list; index = stacking order, lowest first.
    pub layers: Vec<LayerSpec>,
    /// View list.
    pub views: Vec<ViewSpec>,
}

/// An immutable record describing a registered view.
///
/// Created from a [`ViewSpec`] at load time; never mutated and never
/// destroyed during the process lifetime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewDescriptor {
    id: ViewId,
    name: String,
    layer: Option<LayerId>,
    is_dialog: bool,
    is_persistent: bool,
    loader_key: String,
    content_ref: String,
}

impl ViewDescriptor {
    /// The view's stable id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ViewId {
        self.id
    }

    /// The unique name the id was derived from.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The target layer. `None` for dialogs.
    #[inline]
    #[must_use]
    pub fn layer(&self) -> Option<LayerId> {
        self.layer
    }

    /// Whether the view stacks on the dialog container instead of a layer.
    #[inline]
    #[must_use]
    pub fn is_dialog(&self) -> bool {
        self.is_dialog
    }

    /// Whether the instance survives removal in a deactivated state.
    #[inline]
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.is_persistent
    }

    /// Key of the loader that produces this view's instance.
    #[inline]
    #[must_use]
    pub fn loader_key(&self) -> &str {
        &self.loader_key
    }

    /// Content reference handed to the loader.
    #[inline]
    #[must_use]
    pub fn content_ref(&self) -> &str {
        &self.content_ref
    }
}

/// Immutable-after-load table of view descriptors, keyed by [`ViewId`].
#[derive(Debug, Default)]
pub struct ViewRegistry {
    views: BTreeMap<ViewId, ViewDescriptor>,
}

impl ViewRegistry {
    /// Builds a registry from the registrar's view list.
    ///
    /// Invalid entries are skipped with a warning on `diag`; the rest of
    /// the list still loads.
    pub(crate) fn from_specs(specs: &[ViewSpec], diag: &mut dyn DiagSink) -> Self {
        let mut views = BTreeMap::new();
        for spec in specs {
            if spec.name.is_empty() {
                diag.warning(
                    "a view entry in the registrar has no name; skipping registration of this entry",
                );
                continue;
            }
            let id = ViewId::from_name(&spec.name);
            if views.contains_key(&id) {
                diag.warning(&format!(
                    "a view with the id of {:?} is already registered; skipping duplicate",
                    spec.name
                ));
                continue;
            }
            if spec.content_ref.is_empty() {
                diag.warning(&format!(
                    "view {:?} has an empty content reference; skipping registration of this entry",
                    spec.name
                ));
                continue;
            }

            views.insert(
                id,
                ViewDescriptor {
                    id,
                    name: spec.name.clone(),
                    layer: (!spec.is_dialog).then_some(LayerId(spec.layer_index)),
                    is_dialog: spec.is_dialog,
                    is_persistent: spec.is_persistent,
                    loader_key: spec.loader_key.clone(),
                    content_ref: spec.content_ref.clone(),
                },
            );
        }
        Self { views }
    }

    /// Returns the descriptor for `id`, if registered.
    #[must_use]
    pub fn get(&self, id: ViewId) -> Option<&ViewDescriptor> {
        self.views.get(&id)
    }

    /// Returns whether `id` is registered.
    #[must_use]
    pub fn contains(&self, id: ViewId) -> bool {
        self.views.contains_key(&id)
    }

    /// Returns the number of registered views.
    #[must_use]
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Returns whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Iterates over all descriptors in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ViewDescriptor> {
        self.views.values()
    }
}
