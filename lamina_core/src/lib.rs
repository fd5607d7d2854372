// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View lifecycle, layer occupancy, and focus-scrim coordination.
//!
//! `lamina_core` manages named UI *views* arranged on ordered *layers*
//! plus an independent *dialog* stack, and keeps a focus-dimming scrim
//! positioned behind whichever surface currently owns attention. It owns
//! the lifecycle state machines and ordering guarantees; everything
//! platform-specific (view content, animation, asset loading, the actual
//! surface tree) stays behind collaborator traits.
//!
//! # Architecture
//!
//! ```text
//!   caller ──► ViewManager::add_view / remove_view
//!                  │
//!                  ▼
//!           occupancy check (LayerTable) ──► evict occupant?
//!                  │
//!                  ▼
//!           ViewLoader::create_view ──► View instance
//!                  │
//!                  ▼
//!           attach / initialize / transitions ──► GreyoutCoordinator
//!                  │                                     │
//!                  ▼                                     ▼
//!           ViewEvents (opened/closed)         Presenter (scrim, input)
//! ```
//!
//! **[`registry`]** — Registrar configuration and the immutable
//! [`ViewDescriptor`](registry::ViewDescriptor) table; invalid entries are
//! skipped per entry with a warning.
//!
//! **[`layer`]** — Ordered layer records; each layer holds at most one
//! occupant, and overlay layers participate in scrim placement.
//!
//! **[`controller`]** — [`ViewManager`], the lifecycle controller:
//! add/remove state machines, occupancy arbitration, the
//! persistent-instance cache, and event dispatch.
//!
//! **[`greyout`]** — Scrim placement recompute and the delta-time fade
//! state machine.
//!
//! **[`view`]** — The [`View`](view::View) instance contract, typed
//! payloads, and [`ViewLoader`](view::ViewLoader) resolution through a
//! string-keyed registry.
//!
//! **[`presenter`]** — The [`Presenter`](presenter::Presenter) trait the
//! embedder implements to apply scrim and input-gating state.
//!
//! **[`diag`]** / **[`events`]** — Injectable sinks for diagnostics and
//! lifecycle events; all methods default to no-ops.
//!
//! # Threading
//!
//! A single owning context (the thread that constructs the
//! [`ViewManager`]) performs all lifecycle mutation; calls from any other
//! thread are rejected outright with a warning rather than queued. See the
//! [`controller`] module docs.

pub mod controller;
pub mod diag;
pub mod events;
pub mod greyout;
pub mod id;
pub mod layer;
pub mod presenter;
pub mod registry;
pub mod view;

pub use controller::ViewManager;
