// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle event notifications.

use crate::id::ViewId;

/// Receives lifecycle events from the [`ViewManager`](crate::ViewManager).
///
/// `view_opened` fires once a view has been created (or reactivated) and
/// its transition-in has been started; `view_closed` fires when a removal
/// finalizes. Both methods default to no-ops.
pub trait ViewEvents {
    /// A view finished opening.
    fn view_opened(&mut self, id: ViewId) {
        _ = id;
    }

    /// A view finished closing.
    fn view_closed(&mut self, id: ViewId) {
        _ = id;
    }
}

/// A [`ViewEvents`] sink that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopEvents;

impl ViewEvents for NoopEvents {}
