//! Click trigger: activation edge + hovered object => click target.

use raypoint_core::ObjectId;
use tracing::debug;

/// Resolves activation edges into click targets.
#[derive(Debug, Default, Clone)]
pub struct ClickTrigger {
    clicks: u64,
    ignored: u64,
}

impl ClickTrigger {
    /// Create a trigger with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Target to click, if `edge` fired while something is hovered.
    ///
    /// Activating over empty space is ignored.
    pub fn resolve(&mut self, edge: bool, hovered: Option<ObjectId>) -> Option<ObjectId> {
        if !edge {
            return None;
        }
        match hovered {
            Some(target) => {
                self.clicks += 1;
                Some(target)
            }
            None => {
                self.ignored += 1;
                debug!("Activation over empty space ignored");
                None
            }
        }
    }

    /// Clicks delivered so far.
    pub fn clicks(&self) -> u64 {
        self.clicks
    }

    /// Activations that landed on nothing.
    pub fn ignored(&self) -> u64 {
        self.ignored
    }
}
