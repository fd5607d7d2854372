// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted collaborators for lifecycle harnesses.
//!
//! Everything the engine talks to is a trait, so a full lifecycle scenario
//! can run without a UI stack. This crate provides the standard doubles:
//!
//! - [`ScriptedLoader`] / scripted views — record every lifecycle call
//!   into a shared [`CallLog`], with per-view behavior (animated
//!   out-transitions, typed-data acceptance, load failures).
//! - [`RecordingPresenter`] — records scrim placement, alpha, blocking,
//!   activation, and input-gating calls.
//! - [`CollectingDiag`] / [`CollectingEvents`] — capture diagnostics and
//!   lifecycle events for assertions.
//!
//! The cross-component scenario tests in this crate's `tests/` directory
//! drive a real [`ViewManager`](lamina_core::ViewManager) against these
//! doubles.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use lamina_core::diag::DiagSink;
use lamina_core::events::ViewEvents;
use lamina_core::id::{SurfaceId, ViewId};
use lamina_core::presenter::Presenter;
use lamina_core::registry::ViewDescriptor;
use lamina_core::view::{DataReceiver, LoadError, Transition, View, ViewData, ViewLoader};

// ---------------------------------------------------------------------------
// Call log
// ---------------------------------------------------------------------------

/// One recorded lifecycle call on a scripted view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewCall {
    /// The loader constructed a fresh instance.
    Created,
    /// `bind` ran.
    Bound,
    /// `attach` ran with the instance surface and its parent container.
    Attached {
        /// Surface minted for the instance.
        surface: SurfaceId,
        /// Container the instance was parented into.
        parent: SurfaceId,
    },
    /// A typed payload was delivered (rendered with `Debug`).
    DataSet(String),
    /// `initialize` ran.
    Initialized,
    /// `transition_in` ran.
    TransitionedIn,
    /// `transition_out` started.
    TransitionOutStarted,
    /// `suspend` ran.
    Suspended,
    /// `resume` ran.
    Resumed,
    /// `destroy` ran.
    Destroyed,
}

/// A shared, ordered transcript of `(view name, call)` records.
#[derive(Clone, Debug, Default)]
pub struct CallLog {
    records: Rc<RefCell<Vec<(String, ViewCall)>>>,
}

impl CallLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record.
    pub fn record(&self, view: &str, call: ViewCall) {
        self.records.borrow_mut().push((view.to_owned(), call));
    }

    /// Returns a snapshot of all records.
    #[must_use]
    pub fn records(&self) -> Vec<(String, ViewCall)> {
        self.records.borrow().clone()
    }

    /// Returns the calls recorded for one view.
    #[must_use]
    pub fn calls_for(&self, view: &str) -> Vec<ViewCall> {
        self.records
            .borrow()
            .iter()
            .filter(|(name, _)| name == view)
            .map(|(_, call)| call.clone())
            .collect()
    }

    /// Counts how often `call` was recorded for `view`.
    #[must_use]
    pub fn count(&self, view: &str, call: &ViewCall) -> usize {
        self.records
            .borrow()
            .iter()
            .filter(|(name, recorded)| name == view && recorded == call)
            .count()
    }

    /// Clears the transcript.
    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }
}

// ---------------------------------------------------------------------------
// Scripted views and loader
// ---------------------------------------------------------------------------

/// A view double that records every lifecycle call.
#[derive(Debug)]
struct ScriptedView {
    name: String,
    log: CallLog,
    manual_out: bool,
    accepts_data: bool,
}

impl View for ScriptedView {
    fn bind(&mut self, _: &ViewDescriptor) {
        self.log.record(&self.name, ViewCall::Bound);
    }

    fn attach(&mut self, surface: SurfaceId, parent: SurfaceId) {
        self.log
            .record(&self.name, ViewCall::Attached { surface, parent });
    }

    fn initialize(&mut self) {
        self.log.record(&self.name, ViewCall::Initialized);
    }

    fn transition_in(&mut self) {
        self.log.record(&self.name, ViewCall::TransitionedIn);
    }

    fn transition_out(&mut self) -> Transition {
        self.log.record(&self.name, ViewCall::TransitionOutStarted);
        if self.manual_out {
            Transition::Pending
        } else {
            Transition::Complete
        }
    }

    fn suspend(&mut self) {
        self.log.record(&self.name, ViewCall::Suspended);
    }

    fn resume(&mut self) {
        self.log.record(&self.name, ViewCall::Resumed);
    }

    fn destroy(&mut self) {
        self.log.record(&self.name, ViewCall::Destroyed);
    }

    fn data_receiver(&mut self) -> Option<&mut dyn DataReceiver> {
        if self.accepts_data { Some(self) } else { None }
    }
}

impl DataReceiver for ScriptedView {
    fn set_data(&mut self, data: ViewData) {
        let rendered = data
            .downcast_ref::<String>()
            .cloned()
            .or_else(|| data.downcast_ref::<u32>().map(|v| v.to_string()))
            .unwrap_or_else(|| "<opaque>".to_owned());
        self.log.record(&self.name, ViewCall::DataSet(rendered));
    }
}

/// A loader that produces scripted views with per-view behavior.
#[derive(Debug, Default)]
pub struct ScriptedLoader {
    log: CallLog,
    manual_out: BTreeSet<String>,
    accepts_data: BTreeSet<String>,
    failing: BTreeSet<String>,
}

impl ScriptedLoader {
    /// Creates a loader recording into `log`.
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            manual_out: BTreeSet::new(),
            accepts_data: BTreeSet::new(),
            failing: BTreeSet::new(),
        }
    }

    /// Views whose out-transition stays pending until
    /// [`ViewManager::finish_removal`](lamina_core::ViewManager::finish_removal)
    /// is called.
    #[must_use]
    pub fn with_manual_out(mut self, view: &str) -> Self {
        self.manual_out.insert(view.to_owned());
        self
    }

    /// Views that expose the data-receiving capability.
    #[must_use]
    pub fn with_data_receiver(mut self, view: &str) -> Self {
        self.accepts_data.insert(view.to_owned());
        self
    }

    /// Views whose construction fails.
    #[must_use]
    pub fn with_failure(mut self, view: &str) -> Self {
        self.failing.insert(view.to_owned());
        self
    }
}

impl ViewLoader for ScriptedLoader {
    fn create_view(&mut self, descriptor: &ViewDescriptor) -> Result<Box<dyn View>, LoadError> {
        let name = descriptor.name().to_owned();
        if self.failing.contains(&name) {
            return Err(LoadError::new(format!("scripted failure for {name:?}")));
        }
        self.log.record(&name, ViewCall::Created);
        Ok(Box::new(ScriptedView {
            manual_out: self.manual_out.contains(&name),
            accepts_data: self.accepts_data.contains(&name),
            name,
            log: self.log.clone(),
        }))
    }
}

// ---------------------------------------------------------------------------
// Recording presenter
// ---------------------------------------------------------------------------

/// One recorded presenter call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PresenterCall {
    /// The scrim was reparented behind a surface.
    PlaceScrimBehind(SurfaceId),
    /// The scrim alpha was pushed.
    ScrimAlpha(f32),
    /// Input interception changed.
    ScrimBlocking(bool),
    /// The scrim node was activated or deactivated.
    ScrimActive(bool),
    /// Whole-surface input gating changed.
    InputEnabled(bool),
}

/// A [`Presenter`] double that records every call.
#[derive(Clone, Debug, Default)]
pub struct RecordingPresenter {
    calls: Rc<RefCell<Vec<PresenterCall>>>,
}

impl RecordingPresenter {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all recorded calls.
    #[must_use]
    pub fn calls(&self) -> Vec<PresenterCall> {
        self.calls.borrow().clone()
    }

    /// Returns the most recent scrim anchor, if any placement happened.
    #[must_use]
    pub fn last_anchor(&self) -> Option<SurfaceId> {
        self.calls
            .borrow()
            .iter()
            .rev()
            .find_map(|call| match call {
                PresenterCall::PlaceScrimBehind(anchor) => Some(*anchor),
                _ => None,
            })
    }

    /// Returns the most recent alpha pushed to the scrim.
    #[must_use]
    pub fn last_alpha(&self) -> Option<f32> {
        self.calls.borrow().iter().rev().find_map(|call| match call {
            PresenterCall::ScrimAlpha(alpha) => Some(*alpha),
            _ => None,
        })
    }

    /// Clears the recording.
    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    fn push(&self, call: PresenterCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl Presenter for RecordingPresenter {
    fn place_scrim_behind(&mut self, anchor: SurfaceId) {
        self.push(PresenterCall::PlaceScrimBehind(anchor));
    }

    fn set_scrim_alpha(&mut self, alpha: f32) {
        self.push(PresenterCall::ScrimAlpha(alpha));
    }

    fn set_scrim_blocking(&mut self, blocking: bool) {
        self.push(PresenterCall::ScrimBlocking(blocking));
    }

    fn set_scrim_active(&mut self, active: bool) {
        self.push(PresenterCall::ScrimActive(active));
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.push(PresenterCall::InputEnabled(enabled));
    }
}

// ---------------------------------------------------------------------------
// Collecting sinks
// ---------------------------------------------------------------------------

/// A recorded diagnostic message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagRecord {
    /// `"info"`, `"warning"`, or `"error"`.
    pub level: &'static str,
    /// The message text.
    pub message: String,
}

/// A [`DiagSink`] double that collects all messages.
#[derive(Clone, Debug, Default)]
pub struct CollectingDiag {
    records: Rc<RefCell<Vec<DiagRecord>>>,
}

impl CollectingDiag {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all records.
    #[must_use]
    pub fn records(&self) -> Vec<DiagRecord> {
        self.records.borrow().clone()
    }

    /// Whether any record of `level` contains `needle`.
    #[must_use]
    pub fn contains(&self, level: &str, needle: &str) -> bool {
        self.records
            .borrow()
            .iter()
            .any(|record| record.level == level && record.message.contains(needle))
    }
}

impl DiagSink for CollectingDiag {
    fn info(&mut self, msg: &str) {
        self.records.borrow_mut().push(DiagRecord {
            level: "info",
            message: msg.to_owned(),
        });
    }

    fn warning(&mut self, msg: &str) {
        self.records.borrow_mut().push(DiagRecord {
            level: "warning",
            message: msg.to_owned(),
        });
    }

    fn error(&mut self, msg: &str) {
        self.records.borrow_mut().push(DiagRecord {
            level: "error",
            message: msg.to_owned(),
        });
    }
}

/// One recorded lifecycle event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// `view_opened` fired.
    Opened(ViewId),
    /// `view_closed` fired.
    Closed(ViewId),
}

/// A [`ViewEvents`] double that collects all events.
#[derive(Clone, Debug, Default)]
pub struct CollectingEvents {
    events: Rc<RefCell<Vec<LifecycleEvent>>>,
}

impl CollectingEvents {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all events.
    #[must_use]
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events.borrow().clone()
    }
}

impl ViewEvents for CollectingEvents {
    fn view_opened(&mut self, id: ViewId) {
        self.events.borrow_mut().push(LifecycleEvent::Opened(id));
    }

    fn view_closed(&mut self, id: ViewId) {
        self.events.borrow_mut().push(LifecycleEvent::Closed(id));
    }
}
