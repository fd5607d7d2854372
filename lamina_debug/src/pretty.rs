// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable diagnostics output.
//!
//! [`PrettyDiag`] implements [`DiagSink`] and [`PrettyEvents`] implements
//! [`ViewEvents`]; both write one line per event to a
//! [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use lamina_core::diag::DiagSink;
use lamina_core::events::ViewEvents;
use lamina_core::id::ViewId;

/// Writes human-readable diagnostic lines to a [`Write`](std::io::Write)
/// destination.
pub struct PrettyDiag<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyDiag<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyDiag").finish_non_exhaustive()
    }
}

impl PrettyDiag {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }
}

impl<W: Write> PrettyDiag<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> DiagSink for PrettyDiag<W> {
    fn info(&mut self, msg: &str) {
        let _ = writeln!(self.writer, "[info] {msg}");
    }

    fn warning(&mut self, msg: &str) {
        let _ = writeln!(self.writer, "[warn] {msg}");
    }

    fn error(&mut self, msg: &str) {
        let _ = writeln!(self.writer, "[error] {msg}");
    }
}

/// Writes one line per lifecycle event to a [`Write`](std::io::Write)
/// destination.
pub struct PrettyEvents<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyEvents<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyEvents").finish_non_exhaustive()
    }
}

impl PrettyEvents {
    /// Creates a sink that writes to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self {
            writer: Box::new(std::io::stdout()),
        }
    }
}

impl<W: Write> PrettyEvents<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> ViewEvents for PrettyEvents<W> {
    fn view_opened(&mut self, id: ViewId) {
        let _ = writeln!(self.writer, "[opened] {id:?}");
    }

    fn view_closed(&mut self, id: ViewId) {
        let _ = writeln!(self.writer, "[closed] {id:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diag_lines_carry_severity_tags() {
        let mut sink = PrettyDiag::with_writer(Vec::<u8>::new());
        sink.warning("layer occupied");
        sink.error("loader missing");
        let output = String::from_utf8(sink.writer).unwrap();
        assert!(output.contains("[warn] layer occupied"), "got: {output}");
        assert!(output.contains("[error] loader missing"), "got: {output}");
    }

    #[test]
    fn event_lines_name_the_view() {
        let mut sink = PrettyEvents::with_writer(Vec::<u8>::new());
        sink.view_opened(ViewId::from_name("MainMenu"));
        sink.view_closed(ViewId::from_name("MainMenu"));
        let output = String::from_utf8(sink.writer).unwrap();
        assert!(output.contains("[opened] ViewId("), "got: {output}");
        assert!(output.contains("[closed] ViewId("), "got: {output}");
    }
}
