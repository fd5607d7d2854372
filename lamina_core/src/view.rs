// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View instance contract and loader resolution.
//!
//! A *view* is a self-contained UI unit with a lifecycle: it is bound to
//! its descriptor, attached into a container surface, optionally handed a
//! typed payload, initialized, transitioned in, and eventually
//! transitioned out and destroyed (or suspended, for persistent views).
//! The engine drives that lifecycle; the embedder implements it.
//!
//! Instances are produced by [`ViewLoader`]s. Loaders are registered in a
//! [`LoaderRegistry`] under a stable string key at startup, and each
//! descriptor names the key of the loader that produces it — there is no
//! runtime discovery of loader implementations.
//!
//! # Transition completion
//!
//! Transitions are asynchronous only via explicit completion:
//! [`View::transition_out`] returns [`Transition::Pending`] when an
//! animation is in flight, and whatever mechanism drives that animation
//! reports completion later through
//! [`ViewManager::finish_removal`](crate::ViewManager::finish_removal).
//! Views without an out-animation return [`Transition::Complete`] and the
//! removal finalizes synchronously. There is no timeout: a pending
//! transition that never reports completion strands its view id in the
//! removing state by design.

use core::any::Any;
use core::fmt;
use std::collections::BTreeMap;

use crate::id::SurfaceId;
use crate::registry::ViewDescriptor;

/// Result of starting a transition-out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// The view has no out-animation; the removal can finalize now.
    Complete,
    /// An animation is in flight; completion will be reported through
    /// [`ViewManager::finish_removal`](crate::ViewManager::finish_removal).
    Pending,
}

/// A live view instance.
///
/// All methods carry default no-op bodies, so a minimal view implements
/// nothing. Views that animate out override [`transition_out`] to return
/// [`Transition::Pending`]; persistent views override [`suspend`] and
/// [`resume`] to park and restore their presentation state.
///
/// [`transition_out`]: Self::transition_out
/// [`suspend`]: Self::suspend
/// [`resume`]: Self::resume
pub trait View {
    /// Gives the view its descriptor. Called before [`attach`](Self::attach).
    fn bind(&mut self, descriptor: &ViewDescriptor) {
        _ = descriptor;
    }

    /// Parents the view's presentation node. `surface` is the id minted
    /// for this instance; `parent` is its layer container or the dialog
    /// container.
    fn attach(&mut self, surface: SurfaceId, parent: SurfaceId) {
        _ = (surface, parent);
    }

    /// Per-display initialization. Runs on every add, including
    /// reactivation of a cached persistent instance.
    fn initialize(&mut self) {}

    /// Starts the in-transition. Fire and forget; the view counts as
    /// active as soon as this returns.
    fn transition_in(&mut self) {}

    /// Starts the out-transition.
    fn transition_out(&mut self) -> Transition {
        Transition::Complete
    }

    /// Parks a persistent instance when it is removed without force.
    fn suspend(&mut self) {}

    /// Restores a suspended persistent instance before it is re-displayed.
    fn resume(&mut self) {}

    /// Final cleanup before the instance is dropped.
    fn destroy(&mut self) {}

    /// Returns the data-receiving capability, if this view accepts typed
    /// payloads. Payload delivery happens before
    /// [`initialize`](Self::initialize); views that return `None` silently
    /// receive no data.
    fn data_receiver(&mut self) -> Option<&mut dyn DataReceiver> {
        None
    }
}

/// Optional capability for views that accept a typed payload.
pub trait DataReceiver {
    /// Delivers the payload supplied to
    /// [`ViewManager::add_view_with`](crate::ViewManager::add_view_with).
    fn set_data(&mut self, data: ViewData);
}

/// A type-erased payload handed to a view when it is added.
///
/// ```
/// use lamina_core::view::ViewData;
///
/// let data = ViewData::new(75_u32);
/// assert_eq!(data.downcast::<u32>(), Some(75));
/// ```
pub struct ViewData(Box<dyn Any>);

impl ViewData {
    /// Wraps a payload value.
    #[must_use]
    pub fn new<T: Any>(value: T) -> Self {
        Self(Box::new(value))
    }

    /// Recovers the payload if it has type `T`.
    #[must_use]
    pub fn downcast<T: Any>(self) -> Option<T> {
        self.0.downcast::<T>().ok().map(|boxed| *boxed)
    }

    /// Borrows the payload if it has type `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for ViewData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewData").finish_non_exhaustive()
    }
}

/// Failure to resolve a descriptor to a live instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadError {
    message: String,
}

impl LoadError {
    /// Creates an error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for LoadError {}

/// Resolves a descriptor to a live view instance.
///
/// Implementations own the mechanics of turning a descriptor's content
/// reference into a presentation object (asset instantiation, widget
/// construction, test doubles). Loading is allowed to fail; the engine
/// logs the failure and rejects the add.
pub trait ViewLoader {
    /// Produces the instance for `descriptor`.
    fn create_view(&mut self, descriptor: &ViewDescriptor) -> Result<Box<dyn View>, LoadError>;
}

/// Maps stable string keys to [`ViewLoader`] implementations.
///
/// Populated at startup; each [`ViewDescriptor`] selects its loader by
/// [`loader_key`](ViewDescriptor::loader_key).
#[derive(Default)]
pub struct LoaderRegistry {
    loaders: BTreeMap<String, Box<dyn ViewLoader>>,
}

impl LoaderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `loader` under `key`, replacing any previous loader with
    /// the same key.
    pub fn register(&mut self, key: impl Into<String>, loader: Box<dyn ViewLoader>) {
        self.loaders.insert(key.into(), loader);
    }

    /// Returns whether a loader is registered under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.loaders.contains_key(key)
    }

    /// Returns the loader registered under `key`.
    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut (dyn ViewLoader + '_)> {
        match self.loaders.get_mut(key) {
            Some(boxed) => Some(boxed.as_mut()),
            None => None,
        }
    }
}

impl fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderRegistry")
            .field("keys", &self.loaders.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;
    impl View for Plain {}

    struct PlainLoader;
    impl ViewLoader for PlainLoader {
        fn create_view(&mut self, _: &ViewDescriptor) -> Result<Box<dyn View>, LoadError> {
            Ok(Box::new(Plain))
        }
    }

    #[test]
    fn default_view_methods_are_noops() {
        let mut view = Plain;
        view.initialize();
        view.transition_in();
        assert_eq!(view.transition_out(), Transition::Complete);
        assert!(view.data_receiver().is_none());
    }

    #[test]
    fn view_data_round_trips() {
        let data = ViewData::new(String::from("payload"));
        assert_eq!(data.downcast_ref::<String>().unwrap(), "payload");
        assert_eq!(data.downcast::<String>().unwrap(), "payload");
    }

    #[test]
    fn view_data_rejects_wrong_type() {
        let data = ViewData::new(42_u32);
        assert!(data.downcast_ref::<String>().is_none());
        assert_eq!(data.downcast::<i64>(), None);
    }

    #[test]
    fn loader_registry_resolves_by_key() {
        let mut registry = LoaderRegistry::new();
        registry.register("resource", Box::new(PlainLoader));

        assert!(registry.contains("resource"));
        assert!(!registry.contains("addressable"));
        assert!(registry.get_mut("resource").is_some());
        assert!(registry.get_mut("addressable").is_none());
    }
}
