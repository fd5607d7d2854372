// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON event-log recording and export.
//!
//! [`EventLog`] is a cheaply cloneable handle over a shared record buffer.
//! Clones of one log can be installed as both the diagnostics sink and the
//! lifecycle event sink of a
//! [`ViewManager`](lamina_core::ViewManager), producing a single ordered
//! JSON transcript of everything the engine reported. [`EventLog::write_to`]
//! exports the transcript as a JSON array, one object per record.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use lamina_core::diag::DiagSink;
use lamina_core::events::ViewEvents;
use lamina_core::id::ViewId;
use serde_json::{Value, json};

/// A shared, ordered recorder of diagnostics and lifecycle events.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    records: Rc<RefCell<Vec<Value>>>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records captured so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    /// Whether no records were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    /// Returns a snapshot of the records.
    #[must_use]
    pub fn records(&self) -> Vec<Value> {
        self.records.borrow().clone()
    }

    /// Returns the whole transcript as a JSON array.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Array(self.records.borrow().clone())
    }

    /// Writes the transcript as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the destination.
    pub fn write_to(&self, mut writer: impl Write) -> io::Result<()> {
        let rendered = serde_json::to_string_pretty(&self.to_json())?;
        writer.write_all(rendered.as_bytes())
    }

    fn push(&self, record: Value) {
        self.records.borrow_mut().push(record);
    }
}

impl DiagSink for EventLog {
    fn info(&mut self, msg: &str) {
        self.push(json!({ "type": "diag", "level": "info", "message": msg }));
    }

    fn warning(&mut self, msg: &str) {
        self.push(json!({ "type": "diag", "level": "warning", "message": msg }));
    }

    fn error(&mut self, msg: &str) {
        self.push(json!({ "type": "diag", "level": "error", "message": msg }));
    }
}

impl ViewEvents for EventLog {
    fn view_opened(&mut self, id: ViewId) {
        self.push(json!({ "type": "lifecycle", "event": "opened", "view": format!("{id:?}") }));
    }

    fn view_closed(&mut self, id: ViewId) {
        self.push(json!({ "type": "lifecycle", "event": "closed", "view": format!("{id:?}") }));
    }
}
