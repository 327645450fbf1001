//! Error types for the skirmish-core crate.

use skirmish_combat::CombatError;
use skirmish_types::RoomId;

/// Errors returned by the encounter registry and driver.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The room already has an encounter in progress.
    #[error("combat already active in room {0}")]
    AlreadyActive(RoomId),

    /// The room has no encounter in progress.
    #[error("no active combat in room {0}")]
    NotFound(RoomId),

    /// A combat precondition failed.
    #[error("combat error: {source}")]
    Combat {
        /// The underlying combat error.
        #[from]
        source: CombatError,
    },

    /// Round timers need a tokio runtime and none was running.
    #[error("no tokio runtime available: {reason}")]
    NoRuntime {
        /// Why the runtime handle could not be obtained.
        reason: String,
    },
}
