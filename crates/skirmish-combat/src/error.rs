//! Error types for the skirmish-combat crate.
//!
//! Only precondition violations surface here: malformed actions, spent
//! action points, unknown combatants. Missing content and scripting
//! failures never reach the caller as errors.

use skirmish_types::{ActionKind, CombatantId};

/// Errors returned by combat operations. State is unchanged on error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CombatError {
    /// The action carried the unset [`ActionKind::Unknown`] tag.
    #[error("invalid action for {combatant}: the unknown action kind is never valid")]
    InvalidAction {
        /// The combatant whose queue rejected the action.
        combatant: CombatantId,
    },

    /// The action costs more than the points left this round.
    #[error("insufficient action points: need {needed}, have {remaining}")]
    InsufficientPoints {
        /// The action's cost.
        needed: u32,
        /// Points left in the queue.
        remaining: u32,
    },

    /// No combatant with this id has an active queue or condition set.
    #[error("combatant {0} not found or has no active queue")]
    UnknownCombatant(CombatantId),

    /// The condition id is not in the registry.
    #[error("unknown condition {0:?}")]
    UnknownCondition(String),

    /// An active condition blocks this kind of action.
    #[error("{combatant} cannot {action} while {condition}")]
    ActionRestricted {
        /// The restricted combatant.
        combatant: CombatantId,
        /// The blocked action kind.
        action: ActionKind,
        /// The condition imposing the restriction.
        condition: String,
    },
}
