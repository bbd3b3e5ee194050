//! Hover tracking: diff the previous target against the new raycast result.

use raypoint_core::ObjectId;

/// A hover transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverEvent {
    /// The pointer left this object.
    Exit(ObjectId),
    /// The pointer entered this object.
    Enter(ObjectId),
}

/// Transitions from `previous` to `current`, exit first.
///
/// Identical targets (including both `None`) produce nothing.
pub fn transition(previous: Option<ObjectId>, current: Option<ObjectId>) -> Vec<HoverEvent> {
    let mut events = Vec::with_capacity(2);
    if previous == current {
        return events;
    }
    if let Some(previous) = previous {
        events.push(HoverEvent::Exit(previous));
    }
    if let Some(current) = current {
        events.push(HoverEvent::Enter(current));
    }
    events
}

/// The single "currently hovered object" of a session.
#[derive(Debug, Default, Clone)]
pub struct HoverTracker {
    current: Option<ObjectId>,
}

impl HoverTracker {
    /// Tracker with nothing hovered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently hovered object.
    pub fn current(&self) -> Option<ObjectId> {
        self.current
    }

    /// Replace the hovered object and return the resulting transitions.
    pub fn update(&mut self, next: Option<ObjectId>) -> Vec<HoverEvent> {
        let events = transition(self.current, next);
        self.current = next;
        events
    }

    /// Drop a hovered object that no longer exists, yielding its exit.
    pub fn evict_stale(&mut self, exists: impl FnOnce(ObjectId) -> bool) -> Option<HoverEvent> {
        let current = self.current?;
        if exists(current) {
            return None;
        }
        self.current = None;
        Some(HoverEvent::Exit(current))
    }

    /// Clear the hover at teardown, yielding the pending exit if any.
    pub fn clear(&mut self) -> Option<HoverEvent> {
        self.current.take().map(HoverEvent::Exit)
    }
}
