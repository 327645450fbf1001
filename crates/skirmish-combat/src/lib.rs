//! Core combat logic for the Skirmish engine.
//!
//! Pure, synchronous rules: no I/O, no locks, no clocks beyond the
//! encounter's start timestamp. All randomness comes in through
//! [`skirmish_dice::RandomSource`] so every path is reproducible in
//! tests.
//!
//! # Modules
//!
//! - [`combatant`] -- Combatants, ability modifiers, proficiency
//! - [`action`] -- Queued actions and per-round action-point queues
//! - [`conditions`] -- Active condition sets and their derived penalties
//! - [`dying`] -- The dying recovery chain
//! - [`resolver`] -- Attack, firearm and explosive resolution, outcome tiers
//! - [`round`] -- Round resolution
//! - [`combat`] -- Encounter state and the round lifecycle
//! - [`initiative`] -- Initiative rolls and ordering
//! - [`hooks`] -- Scripting hook capability and the in-process hook table
//! - [`error`] -- Precondition failures

pub mod action;
pub mod combat;
pub mod combatant;
pub mod conditions;
pub mod dying;
pub mod error;
pub mod hooks;
pub mod initiative;
pub mod resolver;
pub mod round;

pub use action::{ActionQueue, QueuedAction};
pub use combat::{Combat, CombatOutcome, EncounterParams};
pub use combatant::{Combatant, ability_modifier, proficiency_bonus};
pub use conditions::{ActiveCondition, ActiveSet};
pub use error::CombatError;
pub use hooks::{HookError, HookTable, HookValue, NoHooks, ScriptHooks};
pub use initiative::{roll_initiative, sort_by_initiative};
pub use resolver::{
    ExplosiveResult, outcome_for, resolve_attack, resolve_explosive, resolve_firearm_attack,
};
pub use round::resolve_round;
