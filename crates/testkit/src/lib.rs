#![warn(missing_docs)]
//! Deterministic testing surfaces: pointer event logs and recorders.

use anyhow::Result;
use raypoint_core::{FrameTick, ObjectId};
use raypoint_pointer::{EventDispatcher, ListenerId, PointerEvent, PointerEventKind};
use serde::Serialize;
use std::cell::RefCell;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

/// Primary event record captured by headless runs.
#[derive(Debug, Serialize)]
pub struct EventRecord<'a> {
    /// Frame when the event occurred.
    pub tick: FrameTick,
    /// Host timestamp in milliseconds.
    pub time_ms: f64,
    /// Event kind label (`enter`, `exit`, `click`).
    pub kind: &'a str,
    /// Target object.
    pub target: ObjectId,
    /// Human-readable target name.
    pub name: &'a str,
}

impl<'a> EventRecord<'a> {
    /// Build a record for a delivered pointer event.
    pub fn from_event(event: &PointerEvent, name: &'a str) -> Self {
        Self {
            tick: event.tick,
            time_ms: event.time_ms,
            kind: event.kind.as_str(),
            target: event.target,
            name,
        }
    }
}

/// A sink that writes newline-delimited JSON to disk.
pub struct JsonlSink {
    file: File,
}

impl JsonlSink {
    /// Create a new sink at `path`, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(Self { file })
    }

    /// Append an event to the log.
    pub fn write(&mut self, event: &EventRecord<'_>) -> Result<()> {
        let line = serde_json::to_string(event)?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        Ok(())
    }
}

/// Collects `(kind, target)` pairs delivered through a dispatcher.
///
/// Attach it to the objects under test; the recorded sequence reflects the
/// order in which handlers actually ran.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    log: Rc<RefCell<Vec<(PointerEventKind, ObjectId)>>>,
}

impl EventRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen for enter, exit and click on `target`.
    pub fn attach(&self, events: &EventDispatcher, target: ObjectId) -> [ListenerId; 3] {
        [
            PointerEventKind::Enter,
            PointerEventKind::Exit,
            PointerEventKind::Click,
        ]
        .map(|kind| {
            let log = self.log.clone();
            events.on(target, kind, move |event| {
                log.borrow_mut().push((event.kind, event.target));
                Ok(())
            })
        })
    }

    /// Everything recorded so far.
    pub fn events(&self) -> Vec<(PointerEventKind, ObjectId)> {
        self.log.borrow().clone()
    }

    /// Drain the recorded events.
    pub fn take(&self) -> Vec<(PointerEventKind, ObjectId)> {
        std::mem::take(&mut *self.log.borrow_mut())
    }
}
