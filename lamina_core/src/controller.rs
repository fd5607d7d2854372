// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The view lifecycle controller.
//!
//! [`ViewManager`] orchestrates every view's add/remove state machine,
//! arbitrates layer occupancy, owns the persistent-instance cache, and
//! keeps the [`GreyoutCoordinator`] in sync with whatever surface
//! currently owns attention.
//!
//! # Per-id state machine
//!
//! ```text
//!   Inactive ──► PendingAdd ──► Active ──► PendingRemove ──► Inactive
//!                                              │                 (or CachedInactive
//!                                              ▼                  when persistent)
//!                              accelerated finalize on re-add
//! ```
//!
//! At most one add and one remove can be in flight per id. A re-add of an
//! id that is mid-removal does not error: it forces the pending removal to
//! its finalize step synchronously (skipping the rest of the out-animation
//! but none of the bookkeeping) and then proceeds as if the id had been
//! inactive.
//!
//! # Ordering guarantees
//!
//! - For a given layer, the prior occupant's removal fully finalizes
//!   strictly before the replacement's creation begins; no observable
//!   instant shows two occupants on one layer. This holds across animated
//!   removals: the replacement is parked as a queued add on the occupant's
//!   pending-removal record and created from the finalize step.
//! - Dialog additions and removals never block on, or reorder relative
//!   to, layer occupancy changes.
//!
//! # Owning context
//!
//! All lifecycle mutation must happen on the thread that constructed the
//! manager. Calls from any other thread are rejected with a warning and
//! become no-ops; they are not queued or retried.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::thread::{self, ThreadId};

use crate::diag::{DiagSink, StdDiag};
use crate::events::{NoopEvents, ViewEvents};
use crate::greyout::GreyoutCoordinator;
use crate::id::{LayerId, SurfaceId, ViewId};
use crate::layer::LayerTable;
use crate::presenter::Presenter;
use crate::registry::{RegistrarConfig, ViewDescriptor, ViewRegistry};
use crate::view::{LoaderRegistry, Transition, View, ViewData};

/// A live instance record: the surface minted for it plus the instance.
struct LiveHandle {
    surface: SurfaceId,
    view: Box<dyn View>,
}

/// An add request parked behind an in-flight removal of the same layer's
/// occupant.
struct QueuedAdd {
    id: ViewId,
    data: Option<ViewData>,
}

/// Bookkeeping for a removal between its start and its finalize step.
struct PendingRemoval {
    force: bool,
    queued_add: Option<QueuedAdd>,
    on_complete: Option<Box<dyn FnOnce(&mut ViewManager)>>,
}

/// The view lifecycle controller.
///
/// One instance per process is the intended shape; it is an explicitly
/// constructed value passed to call sites, not a global.
pub struct ViewManager {
    registry: ViewRegistry,
    layers: LayerTable,
    loaders: LoaderRegistry,
    presenter: Box<dyn Presenter>,
    diag: Box<dyn DiagSink>,
    events: Box<dyn ViewEvents>,
    greyout: GreyoutCoordinator,

    active: BTreeMap<ViewId, LiveHandle>,
    dialogs: Vec<ViewId>,
    persistent: BTreeMap<ViewId, Option<LiveHandle>>,
    pending_adds: BTreeSet<ViewId>,
    pending_removals: BTreeMap<ViewId, PendingRemoval>,

    dialog_container: SurfaceId,
    next_surface: u32,
    owner: ThreadId,
}

impl fmt::Debug for ViewManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewManager")
            .field("registered", &self.registry.len())
            .field("active", &self.active.keys().collect::<Vec<_>>())
            .field("dialogs", &self.dialogs)
            .field("pending_adds", &self.pending_adds)
            .field(
                "pending_removals",
                &self.pending_removals.keys().collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl ViewManager {
    /// Constructs the controller from registrar configuration, a loader
    /// registry, and the embedder's presenter.
    ///
    /// Diagnostics go to [`StdDiag`] until
    /// [`set_diag_sink`](Self::set_diag_sink) injects something else.
    #[must_use]
    pub fn new(
        config: &RegistrarConfig,
        loaders: LoaderRegistry,
        presenter: Box<dyn Presenter>,
    ) -> Self {
        Self::with_diag(config, loaders, presenter, Box::new(StdDiag))
    }

    /// Like [`new`](Self::new), with a diagnostics sink that also receives
    /// registration-time warnings.
    #[must_use]
    pub fn with_diag(
        config: &RegistrarConfig,
        loaders: LoaderRegistry,
        presenter: Box<dyn Presenter>,
        mut diag: Box<dyn DiagSink>,
    ) -> Self {
        let mut next_surface = 0;
        let mut mint = || {
            let id = SurfaceId(next_surface);
            next_surface += 1;
            id
        };

        let mut layers = LayerTable::new();
        for (index, spec) in (0..).zip(&config.layers) {
            let container = mint();
            layers.register(LayerId(index), spec, container);
        }
        // The dialog container stacks above every layer container.
        let dialog_container = mint();

        let registry = ViewRegistry::from_specs(&config.views, diag.as_mut());
        let persistent = registry
            .iter()
            .filter(|descriptor| descriptor.is_persistent())
            .map(|descriptor| (descriptor.id(), None))
            .collect();

        let mut manager = Self {
            registry,
            layers,
            loaders,
            presenter,
            diag,
            events: Box::new(NoopEvents),
            greyout: GreyoutCoordinator::new(),
            active: BTreeMap::new(),
            dialogs: Vec::new(),
            persistent,
            pending_adds: BTreeSet::new(),
            pending_removals: BTreeMap::new(),
            dialog_container,
            next_surface,
            owner: thread::current().id(),
        };
        manager
            .greyout
            .disable_now(manager.presenter.as_mut());
        manager
    }

    /// Replaces the diagnostics sink.
    pub fn set_diag_sink(&mut self, diag: Box<dyn DiagSink>) {
        self.diag = diag;
    }

    /// Replaces the lifecycle event sink.
    pub fn set_event_sink(&mut self, events: Box<dyn ViewEvents>) {
        self.events = events;
    }

    // -- Add ---------------------------------------------------------------

    /// Adds the view on its registered layer, or on top of the dialog
    /// stack if it is a dialog.
    ///
    /// If a non-dialog's target layer is occupied, the occupant is removed
    /// first and the new view is created once that removal finalizes. If
    /// the id itself is mid-removal, the removal is accelerated and the
    /// add proceeds. A duplicate add of an active or already-pending id is
    /// rejected with a warning.
    pub fn add_view(&mut self, id: ViewId) {
        self.add_view_impl(id, None);
    }

    /// Like [`add_view`](Self::add_view), delivering `data` to the
    /// instance before `initialize` if it exposes the data-receiving
    /// capability.
    pub fn add_view_with(&mut self, id: ViewId, data: ViewData) {
        self.add_view_impl(id, Some(data));
    }

    fn add_view_impl(&mut self, id: ViewId, data: Option<ViewData>) {
        if !self.can_add(id) {
            return;
        }

        if self.active.contains_key(&id) {
            if self.pending_removals.contains_key(&id) {
                // Re-add while mid-removal: speed the removal along so the
                // id can come back without erroring.
                self.finalize_removal(id, true);
            } else {
                self.diag
                    .warning(&format!("view {id:?} is already active"));
                return;
            }
        }

        let Some(descriptor) = self.registry.get(id).cloned() else {
            return;
        };

        if descriptor.is_dialog() {
            // Dialogs stack as the topmost dialog-container entry; nothing
            // to evict.
            self.create_view(&descriptor, data);
            return;
        }

        let Some(layer_id) = descriptor.layer() else {
            self.diag.error(&format!(
                "non-dialog view {:?} carries no layer",
                descriptor.name()
            ));
            return;
        };
        let Some(layer) = self.layers.get(layer_id) else {
            self.diag.error(&format!(
                "view {:?} targets layer {layer_id:?}, which was never registered",
                descriptor.name()
            ));
            return;
        };

        match layer.occupant() {
            Some(occupant) => {
                let occupant_id = occupant.view;
                self.pending_adds.insert(id);
                if let Some(record) = self.pending_removals.get_mut(&occupant_id) {
                    // The occupant is already on its way out; park this add
                    // on the in-flight removal. Latest queued add wins.
                    if let Some(superseded) = record.queued_add.replace(QueuedAdd { id, data }) {
                        self.pending_adds.remove(&superseded.id);
                        self.diag.warning(&format!(
                            "queued add of {:?} superseded by {id:?} on layer {layer_id:?}",
                            superseded.id
                        ));
                    }
                } else if !self.begin_removal(
                    occupant_id,
                    PendingRemoval {
                        force: false,
                        queued_add: Some(QueuedAdd { id, data }),
                        on_complete: None,
                    },
                ) {
                    self.pending_adds.remove(&id);
                }
            }
            None => self.create_view(&descriptor, data),
        }
    }

    // -- Remove ------------------------------------------------------------

    /// Removes an active view, transitioning it out first.
    pub fn remove_view(&mut self, id: ViewId) {
        self.begin_removal(
            id,
            PendingRemoval {
                force: false,
                queued_add: None,
                on_complete: None,
            },
        );
    }

    /// Like [`remove_view`](Self::remove_view), invoking `on_complete`
    /// once the removal finalizes. `force` destroys the instance even if
    /// the view is flagged persistent (and clears its cache entry).
    pub fn remove_view_with(
        &mut self,
        id: ViewId,
        on_complete: impl FnOnce(&mut Self) + 'static,
        force: bool,
    ) {
        self.begin_removal(
            id,
            PendingRemoval {
                force,
                queued_add: None,
                on_complete: Some(Box::new(on_complete)),
            },
        );
    }

    /// Reports that a [`Transition::Pending`] out-transition finished.
    ///
    /// Finalizes the pending removal of `id`. Idempotent per id: calls for
    /// an id that is not mid-removal (including completions arriving after
    /// the removal was accelerated by a re-add) are no-ops. Note that a
    /// stale completion for an id that has since been re-added *and*
    /// re-removed will accelerate the newer removal.
    pub fn finish_removal(&mut self, id: ViewId) {
        if !self.check_owning_context("finish_removal") {
            return;
        }
        self.finalize_removal(id, false);
    }

    fn begin_removal(&mut self, id: ViewId, record: PendingRemoval) -> bool {
        if !self.can_remove(id) {
            return false;
        }
        self.pending_removals.insert(id, record);

        let transition = match self.active.get_mut(&id) {
            Some(handle) => handle.view.transition_out(),
            None => Transition::Complete,
        };
        if transition == Transition::Complete {
            self.finalize_removal(id, false);
        }
        true
    }

    /// The back half of every removal. Idempotent per id: the first thing
    /// it does is check that `id` is still mid-removal, so a second
    /// invocation (accelerated finalize racing a natural transition
    /// completion) is a no-op.
    fn finalize_removal(&mut self, id: ViewId, forced: bool) {
        let (force, queued_add, on_complete) = match self.pending_removals.get_mut(&id) {
            Some(record) => (
                record.force || forced,
                record.queued_add.take(),
                record.on_complete.take(),
            ),
            None => return,
        };

        let Some(mut handle) = self.active.remove(&id) else {
            self.diag.error(&format!(
                "removal of {id:?} finalized without a live instance"
            ));
            self.pending_removals.remove(&id);
            if let Some(queued) = queued_add {
                self.pending_adds.remove(&queued.id);
            }
            return;
        };
        let Some(descriptor) = self.registry.get(id).cloned() else {
            self.pending_removals.remove(&id);
            if let Some(queued) = queued_add {
                self.pending_adds.remove(&queued.id);
            }
            return;
        };

        if descriptor.is_dialog() {
            self.dialogs.retain(|dialog| *dialog != id);
        } else if let Some(layer_id) = descriptor.layer() {
            // Only clear the slot if it still refers to this view; a later
            // add may already have replaced the occupant.
            let still_occupied_by_us = self
                .layers
                .get(layer_id)
                .and_then(|layer| layer.occupant())
                .is_some_and(|occupant| occupant.view == id);
            if still_occupied_by_us {
                self.layers.clear_occupant(layer_id);
            }
        }

        if descriptor.is_persistent() && !force {
            handle.view.suspend();
            self.persistent.insert(id, Some(handle));
        } else {
            if descriptor.is_persistent() {
                self.persistent.insert(id, None);
            }
            handle.view.destroy();
        }

        // The id is still in the pending-removal set here, so the scrim
        // scans exclude it.
        self.refresh_greyout(descriptor.is_dialog());

        self.events.view_closed(id);
        self.pending_removals.remove(&id);

        if let Some(queued) = queued_add {
            // The queued add may have been cancelled by remove_all_views in
            // the meantime; only honor it if it is still requested.
            if self.pending_adds.contains(&queued.id) {
                if let Some(queued_descriptor) = self.registry.get(queued.id).cloned() {
                    self.create_view(&queued_descriptor, queued.data);
                } else {
                    self.pending_adds.remove(&queued.id);
                }
            }
        }
        if let Some(on_complete) = on_complete {
            on_complete(self);
        }
    }

    // -- Bulk operations ---------------------------------------------------

    /// Removes every layer occupant. Dialogs are left alone.
    ///
    /// Also cancels every not-yet-started add request and snaps the scrim
    /// off without animating.
    pub fn remove_all_views(&mut self, force: bool) {
        if !self.check_owning_context("remove_all_views") {
            return;
        }
        self.pending_adds.clear();
        for record in self.pending_removals.values_mut() {
            record.queued_add = None;
        }

        let occupants: Vec<ViewId> = self
            .layers
            .iter()
            .filter_map(|layer| layer.occupant().map(|occupant| occupant.view))
            .collect();
        for id in occupants {
            self.begin_removal(
                id,
                PendingRemoval {
                    force,
                    queued_add: None,
                    on_complete: None,
                },
            );
        }

        self.greyout.disable_now(self.presenter.as_mut());
    }

    /// Removes every layer occupant except those on the exempt layers.
    /// Queued adds and the scrim are left alone.
    pub fn remove_all_views_except(&mut self, exempt_layers: &[LayerId], force: bool) {
        if !self.check_owning_context("remove_all_views_except") {
            return;
        }
        let occupants: Vec<ViewId> = self
            .layers
            .iter()
            .filter(|layer| !exempt_layers.contains(&layer.id()))
            .filter_map(|layer| layer.occupant().map(|occupant| occupant.view))
            .collect();
        for id in occupants {
            self.begin_removal(
                id,
                PendingRemoval {
                    force,
                    queued_add: None,
                    on_complete: None,
                },
            );
        }
    }

    /// Removes every active dialog. Layer occupants are left untouched.
    pub fn remove_all_dialogs(&mut self, force: bool) {
        if !self.check_owning_context("remove_all_dialogs") {
            return;
        }
        let dialogs = self.dialogs.clone();
        for id in dialogs {
            self.begin_removal(
                id,
                PendingRemoval {
                    force,
                    queued_add: None,
                    on_complete: None,
                },
            );
        }
    }

    // -- Queries -----------------------------------------------------------

    /// Whether `id` is active. Views mid-removal count as already gone,
    /// even though internal bookkeeping still lists them.
    #[must_use]
    pub fn is_view_active(&self, id: ViewId) -> bool {
        self.active.contains_key(&id) && !self.pending_removals.contains_key(&id)
    }

    /// The id of the view occupying `layer`, if any.
    #[must_use]
    pub fn view_id_on_layer(&self, layer: LayerId) -> Option<ViewId> {
        self.layers
            .get(layer)
            .and_then(|layer| layer.occupant())
            .map(|occupant| occupant.view)
    }

    /// The name of the view occupying `layer`, or `""` if the layer is
    /// empty. Typically used for debugging.
    #[must_use]
    pub fn view_name_on_layer(&self, layer: LayerId) -> &str {
        self.view_id_on_layer(layer)
            .and_then(|id| self.registry.get(id))
            .map_or("", ViewDescriptor::name)
    }

    /// The registered view descriptors.
    #[must_use]
    pub fn registry(&self) -> &ViewRegistry {
        &self.registry
    }

    /// The layer table.
    #[must_use]
    pub fn layers(&self) -> &LayerTable {
        &self.layers
    }

    /// The scrim coordinator state.
    #[must_use]
    pub fn greyout(&self) -> &GreyoutCoordinator {
        &self.greyout
    }

    /// Active dialog ids in insertion order (last = topmost).
    #[must_use]
    pub fn dialog_stack(&self) -> &[ViewId] {
        &self.dialogs
    }

    /// Surface of the container every dialog parents into.
    #[must_use]
    pub fn dialog_container(&self) -> SurfaceId {
        self.dialog_container
    }

    /// Surface of a layer's container node.
    #[must_use]
    pub fn layer_container(&self, layer: LayerId) -> Option<SurfaceId> {
        self.layers.get(layer).map(|layer| layer.container())
    }

    // -- Scrim and input ---------------------------------------------------

    /// Sets the scrim's visible-target alpha (clamped to `0.0..=1.0`).
    pub fn set_greyout_alpha(&mut self, alpha: f32) {
        self.greyout
            .set_visible_alpha(alpha, self.presenter.as_mut());
    }

    /// Advances the scrim fade by `dt` seconds. Call from whatever
    /// stepping primitive the embedder has.
    pub fn tick(&mut self, dt: f32) {
        self.greyout.tick(dt, self.presenter.as_mut());
    }

    /// Enables input for everything the manager manages.
    pub fn enable_input(&mut self) {
        self.presenter.set_input_enabled(true);
    }

    /// Disables input for everything the manager manages.
    pub fn disable_input(&mut self) {
        self.presenter.set_input_enabled(false);
    }

    // -- Internals ---------------------------------------------------------

    fn can_add(&mut self, id: ViewId) -> bool {
        if !self.check_owning_context("add_view") {
            return false;
        }
        if !self.registry.contains(id) {
            self.diag.warning(&format!(
                "no view with id {id:?} has been registered; nothing will be shown"
            ));
            return false;
        }
        if self.pending_adds.contains(&id) {
            self.diag.warning(&format!(
                "view {id:?} is already in the process of being added"
            ));
            return false;
        }
        true
    }

    fn can_remove(&mut self, id: ViewId) -> bool {
        if !self.check_owning_context("remove_view") {
            return false;
        }
        if !self.registry.contains(id) {
            self.diag.warning(&format!(
                "no view with id {id:?} has been registered; nothing will be removed"
            ));
            return false;
        }
        if !self.active.contains_key(&id) {
            self.diag.warning(&format!(
                "view {id:?} is not active and does not need to be removed"
            ));
            return false;
        }
        if self.pending_removals.contains_key(&id) {
            self.diag.warning(&format!(
                "view {id:?} is already in the process of being removed"
            ));
            return false;
        }
        true
    }

    fn check_owning_context(&mut self, operation: &str) -> bool {
        if thread::current().id() == self.owner {
            return true;
        }
        self.diag.warning(&format!(
            "{operation} called off the owning context; the call is ignored"
        ));
        false
    }

    fn mint_surface(&mut self) -> SurfaceId {
        let id = SurfaceId(self.next_surface);
        self.next_surface += 1;
        id
    }

    /// Creates (or reactivates) the instance for `descriptor` and runs the
    /// add sequence: bind, attach, record active, deliver data,
    /// initialize, transition in, scrim refresh, opened event.
    fn create_view(&mut self, descriptor: &ViewDescriptor, data: Option<ViewData>) {
        let id = descriptor.id();

        let cached = if descriptor.is_persistent() {
            self.persistent.get_mut(&id).and_then(Option::take)
        } else {
            None
        };

        let obtained = match cached {
            Some(handle) => Some((handle, true)),
            None => {
                let surface = self.mint_surface();
                match self.loaders.get_mut(descriptor.loader_key()) {
                    None => {
                        self.diag.error(&format!(
                            "no loader registered under key {:?} (view {:?})",
                            descriptor.loader_key(),
                            descriptor.name()
                        ));
                        None
                    }
                    Some(loader) => match loader.create_view(descriptor) {
                        Ok(view) => Some((LiveHandle { surface, view }, false)),
                        Err(error) => {
                            self.diag.error(&format!(
                                "loader {:?} failed to create view {:?}: {error}",
                                descriptor.loader_key(),
                                descriptor.name()
                            ));
                            None
                        }
                    },
                }
            }
        };
        let Some((mut handle, from_cache)) = obtained else {
            self.pending_adds.remove(&id);
            return;
        };

        let parent = if descriptor.is_dialog() {
            self.dialog_container
        } else {
            match descriptor.layer().and_then(|layer| self.layers.get(layer)) {
                Some(layer) => layer.container(),
                None => {
                    self.diag.error(&format!(
                        "view {:?} targets a layer that was never registered",
                        descriptor.name()
                    ));
                    self.pending_adds.remove(&id);
                    return;
                }
            }
        };

        if from_cache {
            // Reactivation re-runs per-display setup but skips one-time
            // construction.
            handle.view.resume();
        }
        handle.view.bind(descriptor);
        handle.view.attach(handle.surface, parent);

        let surface = handle.surface;
        self.active.insert(id, handle);
        if descriptor.is_dialog() {
            self.dialogs.push(id);
        } else if let Some(layer_id) = descriptor.layer() {
            self.layers.set_occupant(layer_id, id, surface);
        }

        if let Some(handle) = self.active.get_mut(&id) {
            if let Some(data) = data {
                if let Some(receiver) = handle.view.data_receiver() {
                    receiver.set_data(data);
                }
            }
            handle.view.initialize();
            handle.view.transition_in();
        }

        self.refresh_greyout(descriptor.is_dialog());
        self.pending_adds.remove(&id);
        self.events.view_opened(id);
    }

    fn refresh_greyout(&mut self, changed_is_dialog: bool) {
        let dialogs: Vec<(ViewId, SurfaceId)> = self
            .dialogs
            .iter()
            .filter_map(|id| self.active.get(id).map(|handle| (*id, handle.surface)))
            .collect();
        let excluded: Vec<ViewId> = self.pending_removals.keys().copied().collect();
        self.greyout.refresh(
            changed_is_dialog,
            &dialogs,
            &excluded,
            &self.layers,
            self.presenter.as_mut(),
        );
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::id::ChannelMask;
    use crate::presenter::NullPresenter;
    use crate::registry::{LayerSpec, ViewSpec};
    use crate::view::{DataReceiver, LoadError, ViewLoader};

    type Log = Rc<RefCell<Vec<String>>>;

    struct StubView {
        name: String,
        log: Log,
        pending_out: bool,
        accepts_data: bool,
    }

    impl View for StubView {
        fn initialize(&mut self) {
            self.log.borrow_mut().push(format!("init:{}", self.name));
        }

        fn transition_in(&mut self) {
            self.log.borrow_mut().push(format!("in:{}", self.name));
        }

        fn transition_out(&mut self) -> Transition {
            self.log.borrow_mut().push(format!("out:{}", self.name));
            if self.pending_out {
                Transition::Pending
            } else {
                Transition::Complete
            }
        }

        fn suspend(&mut self) {
            self.log.borrow_mut().push(format!("suspend:{}", self.name));
        }

        fn resume(&mut self) {
            self.log.borrow_mut().push(format!("resume:{}", self.name));
        }

        fn destroy(&mut self) {
            self.log.borrow_mut().push(format!("destroy:{}", self.name));
        }

        fn data_receiver(&mut self) -> Option<&mut dyn DataReceiver> {
            if self.accepts_data { Some(self) } else { None }
        }
    }

    impl DataReceiver for StubView {
        fn set_data(&mut self, data: ViewData) {
            let value = data.downcast::<u32>().unwrap_or(0);
            self.log.borrow_mut().push(format!("data:{}:{value}", self.name));
        }
    }

    struct StubLoader {
        log: Log,
        pending_out: Vec<String>,
        accepts_data: Vec<String>,
    }

    impl ViewLoader for StubLoader {
        fn create_view(&mut self, descriptor: &ViewDescriptor) -> Result<Box<dyn View>, LoadError> {
            let name = descriptor.name().to_owned();
            self.log.borrow_mut().push(format!("create:{name}"));
            Ok(Box::new(StubView {
                pending_out: self.pending_out.contains(&name),
                accepts_data: self.accepts_data.contains(&name),
                name,
                log: self.log.clone(),
            }))
        }
    }

    struct CollectingDiag {
        warnings: Log,
    }

    impl DiagSink for CollectingDiag {
        fn warning(&mut self, msg: &str) {
            self.warnings.borrow_mut().push(msg.into());
        }

        fn error(&mut self, msg: &str) {
            self.warnings.borrow_mut().push(format!("error: {msg}"));
        }
    }

    const A: ViewId = ViewId::from_name("A");
    const B: ViewId = ViewId::from_name("B");
    const HUD: ViewId = ViewId::from_name("Hud");
    const PERSISTENT: ViewId = ViewId::from_name("Persistent");
    const DIALOG: ViewId = ViewId::from_name("Dialog");

    fn layer(name: &str, is_overlay: bool) -> LayerSpec {
        LayerSpec {
            name: name.into(),
            is_overlay,
            channels: ChannelMask::NONE,
        }
    }

    fn view(name: &str, layer_index: u32) -> ViewSpec {
        ViewSpec {
            name: name.into(),
            layer_index,
            content_ref: format!("views/{name}"),
            is_dialog: false,
            is_persistent: false,
            loader_key: "stub".into(),
        }
    }

    fn config() -> RegistrarConfig {
        let mut dialog = view("Dialog", 0);
        dialog.is_dialog = true;
        let mut persistent = view("Persistent", 1);
        persistent.is_persistent = true;
        RegistrarConfig {
            layers: vec![layer("Main", false), layer("Overlay", true)],
            views: vec![
                view("A", 0),
                view("B", 0),
                view("Hud", 1),
                persistent,
                dialog,
            ],
        }
    }

    struct Fixture {
        manager: ViewManager,
        log: Log,
        warnings: Log,
    }

    fn fixture_with(pending_out: &[&str], accepts_data: &[&str]) -> Fixture {
        let log: Log = Rc::default();
        let warnings: Log = Rc::default();
        let mut loaders = LoaderRegistry::new();
        loaders.register(
            "stub",
            Box::new(StubLoader {
                log: log.clone(),
                pending_out: pending_out.iter().map(|s| (*s).to_owned()).collect(),
                accepts_data: accepts_data.iter().map(|s| (*s).to_owned()).collect(),
            }),
        );
        let manager = ViewManager::with_diag(
            &config(),
            loaders,
            Box::new(NullPresenter),
            Box::new(CollectingDiag {
                warnings: warnings.clone(),
            }),
        );
        Fixture {
            manager,
            log,
            warnings,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(&[], &[])
    }

    #[test]
    fn add_view_makes_it_active() {
        let mut fx = fixture();
        assert!(!fx.manager.is_view_active(A));

        fx.manager.add_view(A);

        assert!(fx.manager.is_view_active(A));
        assert_eq!(fx.manager.view_id_on_layer(LayerId(0)), Some(A));
        assert_eq!(fx.manager.view_name_on_layer(LayerId(0)), "A");
        assert_eq!(
            *fx.log.borrow(),
            ["create:A", "init:A", "in:A"],
            "creation sequence"
        );
    }

    #[test]
    fn adding_on_occupied_layer_replaces_the_occupant() {
        let mut fx = fixture();
        fx.manager.add_view(A);
        fx.manager.add_view(B);

        assert!(!fx.manager.is_view_active(A));
        assert!(fx.manager.is_view_active(B));
        assert_eq!(fx.manager.view_id_on_layer(LayerId(0)), Some(B));
        // The occupant fully leaves before the replacement is created.
        assert_eq!(
            *fx.log.borrow(),
            [
                "create:A", "init:A", "in:A", "out:A", "destroy:A", "create:B", "init:B", "in:B"
            ],
        );
    }

    #[test]
    fn dialog_add_evicts_nothing() {
        let mut fx = fixture();
        fx.manager.add_view(A);
        fx.manager.add_view(HUD);
        fx.manager.add_view(DIALOG);

        assert!(fx.manager.is_view_active(A));
        assert!(fx.manager.is_view_active(HUD));
        assert!(fx.manager.is_view_active(DIALOG));
        assert_eq!(fx.manager.dialog_stack(), [DIALOG]);
    }

    #[test]
    fn duplicate_add_is_rejected_with_warning() {
        let mut fx = fixture();
        fx.manager.add_view(A);
        fx.manager.add_view(A);

        assert!(fx.manager.is_view_active(A));
        assert_eq!(fx.log.borrow().len(), 3, "no second creation");
        assert!(
            fx.warnings.borrow().iter().any(|w| w.contains("already active")),
            "got: {:?}",
            fx.warnings.borrow()
        );
    }

    #[test]
    fn unregistered_id_is_rejected() {
        let mut fx = fixture();
        fx.manager.add_view(ViewId::from_name("Nope"));
        fx.manager.remove_view(ViewId::from_name("Nope"));

        assert!(fx.log.borrow().is_empty());
        assert_eq!(fx.warnings.borrow().len(), 2);
    }

    #[test]
    fn remove_of_inactive_view_is_rejected() {
        let mut fx = fixture();
        fx.manager.remove_view(A);
        assert!(
            fx.warnings.borrow().iter().any(|w| w.contains("not active")),
            "got: {:?}",
            fx.warnings.borrow()
        );
    }

    #[test]
    fn remove_view_runs_out_transition_then_destroys() {
        let mut fx = fixture();
        fx.manager.add_view(A);
        fx.log.borrow_mut().clear();

        fx.manager.remove_view(A);

        assert!(!fx.manager.is_view_active(A));
        assert_eq!(fx.manager.view_id_on_layer(LayerId(0)), None);
        assert_eq!(*fx.log.borrow(), ["out:A", "destroy:A"]);
    }

    #[test]
    fn animated_removal_holds_the_layer_until_finished() {
        let mut fx = fixture_with(&["A"], &[]);
        fx.manager.add_view(A);
        fx.manager.remove_view(A);

        // Mid-removal: no longer active, but the slot is not yet free.
        assert!(!fx.manager.is_view_active(A));
        assert_eq!(fx.manager.view_id_on_layer(LayerId(0)), Some(A));

        fx.manager.finish_removal(A);
        assert_eq!(fx.manager.view_id_on_layer(LayerId(0)), None);
        assert!(fx.log.borrow().last().unwrap().starts_with("destroy:A"));
    }

    #[test]
    fn finish_removal_is_idempotent() {
        let mut fx = fixture_with(&["A"], &[]);
        fx.manager.add_view(A);
        fx.manager.remove_view(A);
        fx.manager.finish_removal(A);
        let len = fx.log.borrow().len();

        fx.manager.finish_removal(A);
        assert_eq!(fx.log.borrow().len(), len, "second completion is a no-op");
    }

    #[test]
    fn replacement_waits_for_animated_eviction() {
        let mut fx = fixture_with(&["A"], &[]);
        fx.manager.add_view(A);
        fx.manager.add_view(B);

        // Eviction is still animating: B must not exist yet.
        assert!(!fx.manager.is_view_active(B));
        assert!(!fx.log.borrow().iter().any(|e| e == "create:B"));

        fx.manager.finish_removal(A);
        assert!(fx.manager.is_view_active(B));
        assert_eq!(fx.manager.view_id_on_layer(LayerId(0)), Some(B));
    }

    #[test]
    fn readd_mid_removal_accelerates_and_reactivates() {
        let mut fx = fixture_with(&["A"], &[]);
        fx.manager.add_view(A);
        fx.manager.remove_view(A);
        assert!(!fx.manager.is_view_active(A));

        // Re-adding forces the pending removal to finalize, then proceeds.
        fx.manager.add_view(A);
        assert!(fx.manager.is_view_active(A));
        assert!(
            !fx.warnings.borrow().iter().any(|w| w.contains("already")),
            "no duplicate-add rejection: {:?}",
            fx.warnings.borrow()
        );

        // The stale completion from the first transition changes nothing.
        let len = fx.log.borrow().len();
        fx.manager.finish_removal(A);
        assert!(fx.manager.is_view_active(A));
        assert_eq!(fx.log.borrow().len(), len);
    }

    #[test]
    fn persistent_view_is_suspended_and_resumed() {
        let mut fx = fixture();
        fx.manager.add_view(PERSISTENT);
        fx.manager.remove_view(PERSISTENT);

        assert!(!fx.manager.is_view_active(PERSISTENT));
        assert!(fx.log.borrow().iter().any(|e| e == "suspend:Persistent"));
        assert!(
            !fx.log.borrow().iter().any(|e| e == "destroy:Persistent"),
            "persistent instance survives removal"
        );

        fx.log.borrow_mut().clear();
        fx.manager.add_view(PERSISTENT);
        assert!(fx.manager.is_view_active(PERSISTENT));
        assert_eq!(
            *fx.log.borrow(),
            ["resume:Persistent", "init:Persistent", "in:Persistent"],
            "reactivation skips construction"
        );
    }

    #[test]
    fn forced_removal_destroys_a_persistent_instance() {
        let mut fx = fixture();
        fx.manager.add_view(PERSISTENT);
        fx.manager.remove_view_with(PERSISTENT, |_| {}, true);

        assert!(fx.log.borrow().iter().any(|e| e == "destroy:Persistent"));

        // The cache entry is gone: the next add constructs from scratch.
        fx.log.borrow_mut().clear();
        fx.manager.add_view(PERSISTENT);
        assert_eq!(
            *fx.log.borrow(),
            ["create:Persistent", "init:Persistent", "in:Persistent"],
        );
    }

    #[test]
    fn acceleration_destroys_even_persistent_instances() {
        let mut fx = fixture_with(&["Persistent"], &[]);
        fx.manager.add_view(PERSISTENT);
        fx.manager.remove_view(PERSISTENT);

        // The re-add forces the in-flight removal to finalize, and the
        // forced finalize destroys the instance instead of caching it.
        fx.manager.add_view(PERSISTENT);

        assert!(fx.manager.is_view_active(PERSISTENT));
        assert!(fx.log.borrow().iter().any(|e| e == "destroy:Persistent"));
        assert!(!fx.log.borrow().iter().any(|e| e == "suspend:Persistent"));
        let creations = fx
            .log
            .borrow()
            .iter()
            .filter(|e| *e == "create:Persistent")
            .count();
        assert_eq!(creations, 2, "the cache entry was cleared, so the re-add rebuilds");
    }

    #[test]
    fn data_is_delivered_before_initialize_to_receivers_only() {
        let mut fx = fixture_with(&[], &["Hud"]);
        fx.manager.add_view_with(HUD, ViewData::new(75_u32));
        assert_eq!(
            *fx.log.borrow(),
            ["create:Hud", "data:Hud:75", "init:Hud", "in:Hud"],
        );

        // A view without the capability silently receives nothing.
        fx.log.borrow_mut().clear();
        fx.manager.add_view_with(A, ViewData::new(1_u32));
        assert_eq!(*fx.log.borrow(), ["create:A", "init:A", "in:A"]);
    }

    #[test]
    fn remove_all_views_spares_dialogs_and_cancels_queued_adds() {
        let mut fx = fixture_with(&["A"], &[]);
        fx.manager.add_view(A);
        fx.manager.add_view(DIALOG);
        fx.manager.add_view(HUD);
        fx.manager.add_view(B); // queued behind A's animated removal

        fx.manager.remove_all_views(false);
        fx.manager.finish_removal(A);

        assert!(!fx.manager.is_view_active(A));
        assert!(!fx.manager.is_view_active(HUD));
        assert!(!fx.manager.is_view_active(B), "queued add was cancelled");
        assert!(!fx.log.borrow().iter().any(|e| e == "create:B"));
        assert!(fx.manager.is_view_active(DIALOG), "dialogs are spared");
    }

    #[test]
    fn remove_all_views_except_spares_exempt_layers() {
        let mut fx = fixture();
        fx.manager.add_view(A);
        fx.manager.add_view(HUD);

        fx.manager.remove_all_views_except(&[LayerId(1)], false);

        assert!(!fx.manager.is_view_active(A));
        assert!(fx.manager.is_view_active(HUD));
    }

    #[test]
    fn remove_all_dialogs_spares_layer_occupants() {
        let mut fx = fixture();
        fx.manager.add_view(A);
        fx.manager.add_view(DIALOG);

        fx.manager.remove_all_dialogs(false);

        assert!(!fx.manager.is_view_active(DIALOG));
        assert!(fx.manager.dialog_stack().is_empty());
        assert!(fx.manager.is_view_active(A));
    }

    #[test]
    fn on_complete_runs_after_finalize() {
        let mut fx = fixture();
        fx.manager.add_view(A);

        let observed = Rc::new(RefCell::new(None));
        let sink = observed.clone();
        fx.manager.remove_view_with(
            A,
            move |manager| {
                *sink.borrow_mut() = Some(manager.is_view_active(A));
            },
            false,
        );

        assert_eq!(*observed.borrow(), Some(false));
    }

    #[test]
    fn opened_and_closed_events_fire_in_order() {
        struct Collecting(Log);
        impl ViewEvents for Collecting {
            fn view_opened(&mut self, id: ViewId) {
                self.0.borrow_mut().push(format!("opened:{id:?}"));
            }
            fn view_closed(&mut self, id: ViewId) {
                self.0.borrow_mut().push(format!("closed:{id:?}"));
            }
        }

        let mut fx = fixture();
        let events: Log = Rc::default();
        fx.manager.set_event_sink(Box::new(Collecting(events.clone())));

        fx.manager.add_view(A);
        fx.manager.add_view(B);

        let events = events.borrow();
        assert_eq!(events.len(), 3);
        assert!(events[0].starts_with("opened:"), "A opened first: {events:?}");
        assert!(events[1].starts_with("closed:"), "A closes before B opens: {events:?}");
        assert!(events[2].starts_with("opened:"), "B opened last: {events:?}");
    }

    #[test]
    fn loader_failure_rejects_the_add() {
        struct FailingLoader;
        impl ViewLoader for FailingLoader {
            fn create_view(
                &mut self,
                _: &ViewDescriptor,
            ) -> Result<Box<dyn View>, LoadError> {
                Err(LoadError::new("asset missing"))
            }
        }

        let warnings: Log = Rc::default();
        let mut loaders = LoaderRegistry::new();
        loaders.register("stub", Box::new(FailingLoader));
        let mut manager = ViewManager::with_diag(
            &config(),
            loaders,
            Box::new(NullPresenter),
            Box::new(CollectingDiag {
                warnings: warnings.clone(),
            }),
        );

        manager.add_view(A);

        assert!(!manager.is_view_active(A));
        assert!(
            warnings.borrow().iter().any(|w| w.contains("asset missing")),
            "got: {:?}",
            warnings.borrow()
        );
    }

    #[test]
    fn unknown_loader_key_rejects_the_add() {
        let warnings: Log = Rc::default();
        let mut manager = ViewManager::with_diag(
            &config(),
            LoaderRegistry::new(),
            Box::new(NullPresenter),
            Box::new(CollectingDiag {
                warnings: warnings.clone(),
            }),
        );

        manager.add_view(A);

        assert!(!manager.is_view_active(A));
        assert!(
            warnings.borrow().iter().any(|w| w.contains("no loader")),
            "got: {:?}",
            warnings.borrow()
        );
    }

    #[test]
    fn containers_are_minted_in_stacking_order() {
        let fx = fixture();
        let main = fx.manager.layer_container(LayerId(0)).unwrap();
        let overlay = fx.manager.layer_container(LayerId(1)).unwrap();
        assert!(main < overlay, "layer order follows registration order");
        assert!(
            overlay < fx.manager.dialog_container(),
            "dialog container stacks above all layers"
        );
    }
}
