// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Injectable diagnostics sinks.
//!
//! The engine never fails outward: rejected operations and skipped
//! registrations are reported through a [`DiagSink`] and the call becomes a
//! no-op. Embedders route the three severities into their own logging
//! system by implementing the trait; every method defaults to a no-op, so
//! implementing only the severities you care about is fine.
//!
//! If no sink is injected, the engine uses [`StdDiag`], which writes
//! informational messages to stdout and warnings/errors to stderr.

use core::fmt;

/// Receives diagnostic messages from the engine.
///
/// All methods have default no-op implementations.
pub trait DiagSink {
    /// Informational message.
    fn info(&mut self, msg: &str) {
        _ = msg;
    }

    /// A rejected operation or skipped registration entry. The triggering
    /// call has already been turned into a no-op.
    fn warning(&mut self, msg: &str) {
        _ = msg;
    }

    /// An internal inconsistency (programmer error). Loud, but never fatal.
    fn error(&mut self, msg: &str) {
        _ = msg;
    }
}

/// A [`DiagSink`] that discards all messages.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopDiag;

impl DiagSink for NoopDiag {}

/// The platform-default [`DiagSink`]: stdout for info, stderr for
/// warnings and errors.
#[derive(Clone, Copy, Default)]
pub struct StdDiag;

impl fmt::Debug for StdDiag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdDiag").finish()
    }
}

impl DiagSink for StdDiag {
    fn info(&mut self, msg: &str) {
        println!("[lamina] {msg}");
    }

    fn warning(&mut self, msg: &str) {
        eprintln!("[lamina] warning: {msg}");
    }

    fn error(&mut self, msg: &str) {
        eprintln!("[lamina] error: {msg}");
    }
}
