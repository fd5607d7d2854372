// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing and JSON event-log sinks for lamina diagnostics.
//!
//! This crate provides [`DiagSink`](lamina_core::diag::DiagSink) and
//! [`ViewEvents`](lamina_core::events::ViewEvents) implementations for
//! development and post-mortem analysis:
//!
//! - [`pretty::PrettyDiag`] / [`pretty::PrettyEvents`] — human-readable
//!   one-line-per-event output.
//! - [`json::EventLog`] — a shared recorder that captures diagnostics and
//!   lifecycle events as JSON records for export.

pub mod json;
pub mod pretty;
