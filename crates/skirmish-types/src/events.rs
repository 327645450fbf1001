//! Event records produced by round resolution and round start.
//!
//! Both event lists are plain data: the combat engine emits them, the
//! presentation layer renders them. Nothing here carries behavior beyond
//! the damage multiplier on [`AttackResult`].

use serde::{Deserialize, Serialize};

use crate::enums::{ActionKind, ConditionChange, Outcome};
use crate::ids::CombatantId;

// ---------------------------------------------------------------------------
// AttackResult
// ---------------------------------------------------------------------------

/// Outcome of a single attack roll against a single target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackResult {
    /// The attacking combatant.
    pub attacker_id: CombatantId,
    /// The defending combatant.
    pub target_id: CombatantId,
    /// The natural d20 before modifiers.
    pub attack_roll: i32,
    /// The full attack total after every modifier and override.
    pub attack_total: i32,
    /// Four-tier result of `attack_total` against the target's armor class.
    pub outcome: Outcome,
    /// Damage before the outcome multiplier.
    pub base_damage: i32,
    /// Individual damage dice.
    pub damage_roll: Vec<i32>,
}

impl AttackResult {
    /// Damage dealt once the outcome multiplier is applied.
    ///
    /// A critical success doubles base damage, a success keeps it, and
    /// both failure tiers deal nothing. Never negative.
    pub fn effective_damage(&self) -> i32 {
        let base = self.base_damage.max(0);
        match self.outcome {
            Outcome::CriticalSuccess => base.saturating_mul(2),
            Outcome::Success => base,
            Outcome::Failure | Outcome::CriticalFailure => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// RoundEvent
// ---------------------------------------------------------------------------

/// One resolved action, in the order round resolution produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundEvent {
    /// The acting combatant.
    pub actor_id: CombatantId,
    /// Display name of the acting combatant.
    pub actor_name: String,
    /// The kind of action that was resolved.
    pub action: ActionKind,
    /// Attack payload, absent for passes, reloads and whiffs.
    pub attack: Option<AttackResult>,
    /// Plain-text description of what happened.
    pub narrative: String,
}

impl RoundEvent {
    /// An event with no attack payload.
    pub fn narrative(
        actor_id: CombatantId,
        actor_name: impl Into<String>,
        action: ActionKind,
        narrative: impl Into<String>,
    ) -> Self {
        Self {
            actor_id,
            actor_name: actor_name.into(),
            action,
            attack: None,
            narrative: narrative.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ConditionEvent
// ---------------------------------------------------------------------------

/// A condition applied, advanced, expired or removed during round start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionEvent {
    /// The affected combatant.
    pub combatant_id: CombatantId,
    /// Display name of the affected combatant.
    pub combatant_name: String,
    /// Condition definition id.
    pub condition_id: String,
    /// Condition display name (falls back to the id for unknown definitions).
    pub condition_name: String,
    /// Stack count where relevant, zero otherwise.
    pub stacks: u32,
    /// Whether the condition was applied or removed.
    pub change: ConditionChange,
}
