//! Errors raised while configuring a pointer session.

use thiserror::Error;

/// Configuration problems detected when a session is created.
///
/// Nothing that happens during a tick is reported through this type; tick-time
/// problems are recovered locally and surfaced in the tick report.
#[derive(Debug, Error, PartialEq)]
pub enum PointerError {
    /// Both mouse side channels were enabled at once.
    #[error("camera_follow_mouse and mouse_simulates_controller cannot both be enabled")]
    ConflictingMouseModes,
    /// A numeric setting is out of range.
    #[error("invalid pointer setting `{name}`: {reason}")]
    InvalidSetting {
        /// Setting name as it appears in configuration files.
        name: &'static str,
        /// What is wrong with the value.
        reason: String,
    },
}
