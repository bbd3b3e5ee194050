//! Per-object event registration and dispatch.
//!
//! Listeners are stored in a table keyed by `(object, kind)` and invoked in
//! registration order. The dispatcher is a cheap handle around shared state,
//! so handlers may capture a clone and register or remove listeners while an
//! event is being delivered. Such changes apply from the next [`emit`] on:
//! every emit works on a snapshot of the listener list taken when it starts.
//!
//! There is no bubbling or capture phase; an event reaches exactly the
//! listeners registered on its target.
//!
//! [`emit`]: EventDispatcher::emit

use raypoint_core::{FrameTick, ObjectId};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use tracing::error;

/// Kind of pointer notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerEventKind {
    /// The pointer started hovering the object.
    Enter,
    /// The pointer stopped hovering the object.
    Exit,
    /// The activation signal fired while hovering the object.
    Click,
}

impl PointerEventKind {
    /// Stable lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            PointerEventKind::Enter => "enter",
            PointerEventKind::Exit => "exit",
            PointerEventKind::Click => "click",
        }
    }
}

impl fmt::Display for PointerEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A delivered notification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointerEvent {
    /// What happened.
    pub kind: PointerEventKind,
    /// Object the event is addressed to.
    pub target: ObjectId,
    /// Frame that produced the event.
    pub tick: FrameTick,
    /// Host timestamp of that frame, in milliseconds.
    pub time_ms: f64,
}

/// Handle returned by [`EventDispatcher::on`], used to remove the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Handler signature. Returning an error reports the failure without
/// stopping delivery to the remaining listeners.
pub type Handler = Rc<dyn Fn(&PointerEvent) -> anyhow::Result<()>>;

/// A listener that returned an error or panicked.
#[derive(Debug)]
pub struct HandlerFailure {
    /// Listener that failed.
    pub listener: ListenerId,
    /// Event being delivered.
    pub event: PointerEvent,
    /// The handler's error, or the panic message.
    pub error: anyhow::Error,
}

/// Outcome of delivering one event.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Events that were emitted, in order.
    pub events: Vec<PointerEvent>,
    /// Number of listeners invoked.
    pub invoked: usize,
    /// Listeners that returned an error or panicked.
    pub failures: Vec<HandlerFailure>,
}

impl DispatchReport {
    /// Fold another report into this one.
    pub fn merge(&mut self, other: DispatchReport) {
        self.events.extend(other.events);
        self.invoked += other.invoked;
        self.failures.extend(other.failures);
    }
}

type Key = (ObjectId, PointerEventKind);

#[derive(Default)]
struct ListenerTable {
    by_key: HashMap<Key, Vec<(ListenerId, Handler)>>,
    owners: HashMap<ListenerId, Key>,
    next_id: u64,
}

/// Observer table keyed by object identity and event kind.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    table: Rc<RefCell<ListenerTable>>,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.borrow();
        f.debug_struct("EventDispatcher")
            .field("listeners", &table.owners.len())
            .finish()
    }
}

impl EventDispatcher {
    /// Create an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `kind` events on `target`.
    pub fn on<F>(&self, target: ObjectId, kind: PointerEventKind, handler: F) -> ListenerId
    where
        F: Fn(&PointerEvent) -> anyhow::Result<()> + 'static,
    {
        let mut table = self.table.borrow_mut();
        table.next_id += 1;
        let id = ListenerId(table.next_id);
        table
            .by_key
            .entry((target, kind))
            .or_default()
            .push((id, Rc::new(handler)));
        table.owners.insert(id, (target, kind));
        id
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn off(&self, listener: ListenerId) -> bool {
        let mut table = self.table.borrow_mut();
        let Some(key) = table.owners.remove(&listener) else {
            return false;
        };
        if let Some(list) = table.by_key.get_mut(&key) {
            list.retain(|(id, _)| *id != listener);
            if list.is_empty() {
                table.by_key.remove(&key);
            }
        }
        true
    }

    /// Remove every listener on `target`, returning how many were dropped.
    pub fn clear_object(&self, target: ObjectId) -> usize {
        let mut table = self.table.borrow_mut();
        let doomed: Vec<ListenerId> = table
            .owners
            .iter()
            .filter(|(_, (owner, _))| *owner == target)
            .map(|(id, _)| *id)
            .collect();
        for id in &doomed {
            table.owners.remove(id);
        }
        table.by_key.retain(|(owner, _), _| *owner != target);
        doomed.len()
    }

    /// Number of listeners for `kind` on `target`.
    pub fn listener_count(&self, target: ObjectId, kind: PointerEventKind) -> usize {
        self.table
            .borrow()
            .by_key
            .get(&(target, kind))
            .map_or(0, Vec::len)
    }

    /// Deliver `event` to the listeners registered on its target.
    ///
    /// Handlers run synchronously in registration order. A handler that
    /// fails or panics is logged and recorded; the remaining handlers still
    /// run. The event is recorded in the report even with no listeners.
    pub fn emit(&self, event: &PointerEvent) -> DispatchReport {
        let snapshot: Vec<(ListenerId, Handler)> = self
            .table
            .borrow()
            .by_key
            .get(&(event.target, event.kind))
            .cloned()
            .unwrap_or_default();

        let mut report = DispatchReport {
            events: vec![*event],
            ..DispatchReport::default()
        };
        for (listener, handler) in snapshot {
            report.invoked += 1;
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(event)))
                .unwrap_or_else(|payload| Err(panic_error(payload.as_ref())));
            if let Err(err) = outcome {
                error!(
                    target_object = %event.target,
                    kind = %event.kind,
                    listener = listener.0,
                    "Pointer handler failed: {err:#}"
                );
                report.failures.push(HandlerFailure {
                    listener,
                    event: *event,
                    error: err,
                });
            }
        }
        report
    }
}

fn panic_error(payload: &(dyn std::any::Any + Send)) -> anyhow::Error {
    let message = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload");
    anyhow::anyhow!("handler panicked: {message}")
}
