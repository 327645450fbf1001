//! Enumeration types shared by every layer of the combat engine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Allegiance
// ---------------------------------------------------------------------------

/// Which side of an encounter a combatant fights for.
///
/// Allegiance also decides death semantics: NPCs die the moment their HP
/// reaches zero, players only when the dying chain marks them dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Allegiance {
    /// A player-controlled character.
    Player,
    /// A non-player combatant.
    Npc,
}

impl Allegiance {
    /// The opposing side.
    pub const fn opposing(self) -> Self {
        match self {
            Self::Player => Self::Npc,
            Self::Npc => Self::Player,
        }
    }

    /// Human-readable label for logging.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Npc => "npc",
        }
    }
}

// ---------------------------------------------------------------------------
// Action kinds
// ---------------------------------------------------------------------------

/// What a combatant intends to do with part of its round.
///
/// [`ActionKind::Unknown`] is the default value and is never a valid
/// action: queues reject it without changing state.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Unset tag. Always rejected.
    #[default]
    Unknown,
    /// A single melee attack.
    Attack,
    /// Two attacks, the second at the multiple-attack penalty.
    Strike,
    /// Forfeit the rest of the round.
    Pass,
    /// Refill the equipped firearm's magazine.
    Reload,
    /// Two ranged shots at one target.
    FireBurst,
    /// One ranged shot at each opponent, up to three.
    FireAutomatic,
    /// Throw an explosive at every opponent.
    Throw,
}

impl ActionKind {
    /// Every valid action kind, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Attack,
        Self::Strike,
        Self::Pass,
        Self::Reload,
        Self::FireBurst,
        Self::FireAutomatic,
        Self::Throw,
    ];

    /// Action point cost of this kind.
    ///
    /// `Pass` costs nothing but forfeits whatever remains; `Unknown` has
    /// no cost because it is never queued.
    pub const fn cost(self) -> u32 {
        match self {
            Self::Attack | Self::Reload | Self::Throw => 1,
            Self::Strike | Self::FireBurst => 2,
            Self::FireAutomatic => 3,
            Self::Pass | Self::Unknown => 0,
        }
    }

    /// Short name used in narratives and condition restriction lists.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Attack => "attack",
            Self::Strike => "strike",
            Self::Pass => "pass",
            Self::Reload => "reload",
            Self::FireBurst => "burst",
            Self::FireAutomatic => "automatic",
            Self::Throw => "throw",
        }
    }
}

impl core::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Outcome tiers
// ---------------------------------------------------------------------------

/// Four-tier result of comparing a roll total against a target number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Total at least ten above the target number.
    CriticalSuccess,
    /// Total meets the target number.
    Success,
    /// Total below the target number by at most ten.
    Failure,
    /// Total more than ten below the target number.
    CriticalFailure,
}

impl Outcome {
    /// Human-readable label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CriticalSuccess => "critical success",
            Self::Success => "success",
            Self::Failure => "failure",
            Self::CriticalFailure => "critical failure",
        }
    }
}

impl core::fmt::Display for Outcome {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Condition changes
// ---------------------------------------------------------------------------

/// Direction of a condition change reported at round start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionChange {
    /// The condition was applied or advanced.
    Applied,
    /// The condition expired or was removed.
    Removed,
}
