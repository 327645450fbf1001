//! Shared type definitions for the Skirmish combat engine.
//!
//! Every crate in the workspace speaks in these types: identifiers for
//! combatants and rooms, the action and outcome vocabularies, and the
//! event records a resolved round hands back to the presentation layer.
//!
//! # Modules
//!
//! - [`ids`] -- Identifier newtypes (combatants, rooms, zones, encounters)
//! - [`enums`] -- Allegiance, action kinds, outcome tiers, condition changes
//! - [`events`] -- Attack results, round events, condition events

pub mod enums;
pub mod events;
pub mod ids;

pub use enums::{ActionKind, Allegiance, ConditionChange, Outcome};
pub use events::{AttackResult, ConditionEvent, RoundEvent};
pub use ids::{CombatantId, EncounterId, RoomId, ZoneId};
