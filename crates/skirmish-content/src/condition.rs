//! Condition definitions and the registry that holds them.
//!
//! A [`ConditionDef`] is static content: its penalties, how its duration
//! behaves, and how far it stacks. The per-combatant bookkeeping of which
//! conditions are currently active lives in the combat crate; this module
//! only answers "what does condition X mean".
//!
//! Definitions are loaded from YAML, one file per condition:
//!
//! ```yaml
//! id: frightened
//! name: Frightened
//! duration_type: rounds
//! max_stacks: 4
//! attack_penalty: 1
//! ac_penalty: 1
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use skirmish_types::ActionKind;
use tracing::info;

use crate::error::ContentError;
use crate::loader::load_yaml_dir;

// ---------------------------------------------------------------------------
// Well-known condition ids
// ---------------------------------------------------------------------------

/// Applied to an attacker who critically fails.
pub const PRONE: &str = "prone";
/// Applied to a target struck by a critical success.
pub const FLAT_FOOTED: &str = "flat_footed";
/// Applied to a player at 0 HP; drives the recovery chain.
pub const DYING: &str = "dying";
/// Left behind when a player recovers from dying.
pub const WOUNDED: &str = "wounded";
/// Reduces next round's action points by its stack count.
pub const STUNNED: &str = "stunned";
/// Stacking penalty to attack and armor class.
pub const FRIGHTENED: &str = "frightened";

// ---------------------------------------------------------------------------
// ConditionDef
// ---------------------------------------------------------------------------

/// How a condition's duration counts down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationType {
    /// Decrements once per round start and expires at zero.
    Rounds,
    /// Never expires on its own; removed by game logic.
    UntilSave,
    /// Never expires.
    Permanent,
}

/// Static definition of a condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConditionDef {
    /// Unique condition id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Flavor text.
    #[serde(default)]
    pub description: String,
    /// Duration behavior.
    pub duration_type: DurationType,
    /// Stack cap. Zero means the condition does not stack.
    #[serde(default)]
    pub max_stacks: u32,
    /// Attack penalty per stack.
    #[serde(default)]
    pub attack_penalty: i32,
    /// Armor class penalty per stack.
    #[serde(default)]
    pub ac_penalty: i32,
    /// Movement penalty per stack. Carried for presentation only.
    #[serde(default)]
    pub speed_penalty: i32,
    /// Action names (see [`ActionKind::as_str`]) blocked while active.
    #[serde(default)]
    pub restrict_actions: Vec<String>,
}

impl ConditionDef {
    /// Whether this condition stacks.
    pub const fn is_stackable(&self) -> bool {
        self.max_stacks > 0
    }

    /// Whether this condition blocks `kind`.
    pub fn restricts(&self, kind: ActionKind) -> bool {
        self.restrict_actions.iter().any(|name| name == kind.as_str())
    }
}

// ---------------------------------------------------------------------------
// ConditionRegistry
// ---------------------------------------------------------------------------

/// Every known condition definition, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ConditionRegistry {
    defs: BTreeMap<String, ConditionDef>,
}

impl ConditionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `def`, replacing any definition with the same id.
    pub fn register(&mut self, def: ConditionDef) {
        self.defs.insert(def.id.clone(), def);
    }

    /// Look up a definition by id.
    pub fn get(&self, id: &str) -> Option<&ConditionDef> {
        self.defs.get(id)
    }

    /// Every definition in id order.
    pub fn all(&self) -> impl Iterator<Item = &ConditionDef> {
        self.defs.values()
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Build a registry from every `*.yaml` file in `dir`.
    pub fn load_dir(dir: &Path) -> Result<Self, ContentError> {
        let mut registry = Self::new();
        for (_, def) in load_yaml_dir::<ConditionDef>(dir)? {
            registry.register(def);
        }
        info!(dir = %dir.display(), count = registry.len(), "Loaded condition definitions");
        Ok(registry)
    }

    /// The built-in conditions the combat engine relies on.
    pub fn core() -> Self {
        let mut registry = Self::new();
        for def in core_conditions() {
            registry.register(def);
        }
        registry
    }
}

fn core_conditions() -> Vec<ConditionDef> {
    vec![
        ConditionDef {
            id: PRONE.to_owned(),
            name: "Prone".to_owned(),
            description: "Knocked to the ground.".to_owned(),
            duration_type: DurationType::Permanent,
            max_stacks: 0,
            attack_penalty: 2,
            ac_penalty: 0,
            speed_penalty: 0,
            restrict_actions: Vec::new(),
        },
        ConditionDef {
            id: FLAT_FOOTED.to_owned(),
            name: "Flat-Footed".to_owned(),
            description: "Caught off guard.".to_owned(),
            duration_type: DurationType::Rounds,
            max_stacks: 0,
            attack_penalty: 0,
            ac_penalty: 2,
            speed_penalty: 0,
            restrict_actions: Vec::new(),
        },
        ConditionDef {
            id: DYING.to_owned(),
            name: "Dying".to_owned(),
            description: "Bleeding out.".to_owned(),
            duration_type: DurationType::UntilSave,
            max_stacks: 4,
            attack_penalty: 0,
            ac_penalty: 0,
            speed_penalty: 0,
            restrict_actions: Vec::new(),
        },
        ConditionDef {
            id: WOUNDED.to_owned(),
            name: "Wounded".to_owned(),
            description: "Recovered from dying, but closer to death.".to_owned(),
            duration_type: DurationType::Permanent,
            max_stacks: 3,
            attack_penalty: 0,
            ac_penalty: 0,
            speed_penalty: 0,
            restrict_actions: Vec::new(),
        },
        ConditionDef {
            id: STUNNED.to_owned(),
            name: "Stunned".to_owned(),
            description: "Loses actions while reeling.".to_owned(),
            duration_type: DurationType::Rounds,
            max_stacks: 3,
            attack_penalty: 0,
            ac_penalty: 0,
            speed_penalty: 0,
            restrict_actions: Vec::new(),
        },
        ConditionDef {
            id: FRIGHTENED.to_owned(),
            name: "Frightened".to_owned(),
            description: "Shaken by fear.".to_owned(),
            duration_type: DurationType::Rounds,
            max_stacks: 4,
            attack_penalty: 1,
            ac_penalty: 1,
            speed_penalty: 0,
            restrict_actions: Vec::new(),
        },
    ]
}
