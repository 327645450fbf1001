//! Scripting hook capability.
//!
//! Content authors can override attack totals and damage, veto condition
//! application, and observe reloads and throws. The combat engine sees
//! only [`ScriptHooks`]: a synchronous call that returns a value or
//! nothing. Failures are the adapter's problem; they are logged and
//! reported as "no value" so resolution continues with the unmodified
//! numbers.
//!
//! [`HookTable`] is the in-process adapter: per-zone Rust closures with a
//! global fallback zone. Hosts embedding a script VM implement
//! [`ScriptHooks`] around it instead.

use std::collections::BTreeMap;

use skirmish_types::ZoneId;
use tracing::warn;

/// Fires before an attack outcome is derived. Args: attacker id, target id,
/// attack total, target AC. A number overrides the total.
pub const ON_ATTACK_ROLL: &str = "on_attack_roll";
/// Fires before positive damage is applied. Args: attacker id, target id,
/// damage. A number overrides the damage.
pub const ON_DAMAGE_ROLL: &str = "on_damage_roll";
/// Fires before a condition is applied. Args: combatant id, condition id,
/// stacks. An explicit `false` cancels the application.
pub const ON_CONDITION_APPLY: &str = "on_condition_apply";
/// Fires after a reload. Args: combatant id, weapon id.
pub const ON_RELOAD: &str = "on_reload";
/// Fires before an explosive detonates. Args: combatant id, explosive id.
pub const ON_EXPLOSIVE_THROW: &str = "on_explosive_throw";

/// Zone consulted when an encounter's own zone has no hooks registered.
pub const GLOBAL_ZONE: &str = "__global__";

/// A value crossing the scripting boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum HookValue {
    /// Explicit absence of a value.
    Nil,
    /// A boolean.
    Bool(bool),
    /// A number. Scripts speak in floats.
    Number(f64),
    /// A string.
    Str(String),
}

impl HookValue {
    /// The value as an integer, truncating toward zero. `None` for
    /// non-numbers and non-finite numbers.
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Number(n) if n.is_finite() => {
                let clamped = n.trunc().clamp(f64::from(i32::MIN), f64::from(i32::MAX));
                Some(clamped as i32)
            }
            _ => None,
        }
    }

    /// Whether this is exactly `false`.
    pub const fn is_false(&self) -> bool {
        matches!(self, Self::Bool(false))
    }
}

impl From<&str> for HookValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<i32> for HookValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for HookValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

/// Capability for invoking user-defined hooks.
pub trait ScriptHooks: Send + Sync {
    /// Call `hook` in `zone`. `None` when the hook is absent or failed.
    fn call(&self, zone: &ZoneId, hook: &str, args: &[HookValue]) -> Option<HookValue>;
}

/// Hooks that never fire.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl ScriptHooks for NoHooks {
    fn call(&self, _zone: &ZoneId, _hook: &str, _args: &[HookValue]) -> Option<HookValue> {
        None
    }
}

// ---------------------------------------------------------------------------
// HookTable
// ---------------------------------------------------------------------------

/// A script failure reported by a hook closure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("hook failed: {message}")]
pub struct HookError {
    /// What went wrong.
    pub message: String,
}

impl HookError {
    /// A failure with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

type HookFn = Box<dyn Fn(&[HookValue]) -> Result<HookValue, HookError> + Send + Sync>;

/// Per-zone hook closures with a global fallback zone.
///
/// A zone with any hook registered shadows the global zone entirely: a
/// hook missing from it is absent, not looked up globally.
#[derive(Default)]
pub struct HookTable {
    zones: BTreeMap<String, BTreeMap<String, HookFn>>,
}

impl HookTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `f` as `hook` in `zone`, replacing any previous closure.
    pub fn register<F>(&mut self, zone: impl Into<String>, hook: impl Into<String>, f: F)
    where
        F: Fn(&[HookValue]) -> Result<HookValue, HookError> + Send + Sync + 'static,
    {
        self.zones
            .entry(zone.into())
            .or_default()
            .insert(hook.into(), Box::new(f));
    }

    /// Register `f` as `hook` in the global fallback zone.
    pub fn register_global<F>(&mut self, hook: impl Into<String>, f: F)
    where
        F: Fn(&[HookValue]) -> Result<HookValue, HookError> + Send + Sync + 'static,
    {
        self.register(GLOBAL_ZONE, hook, f);
    }
}

impl core::fmt::Debug for HookTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let zones: Vec<(&String, Vec<&String>)> = self
            .zones
            .iter()
            .map(|(zone, hooks)| (zone, hooks.keys().collect()))
            .collect();
        f.debug_struct("HookTable").field("zones", &zones).finish()
    }
}

impl ScriptHooks for HookTable {
    fn call(&self, zone: &ZoneId, hook: &str, args: &[HookValue]) -> Option<HookValue> {
        let hooks = self
            .zones
            .get(zone.as_str())
            .or_else(|| self.zones.get(GLOBAL_ZONE))?;
        let f = hooks.get(hook)?;
        match f(args) {
            Ok(HookValue::Nil) => None,
            Ok(value) => Some(value),
            Err(e) => {
                warn!(zone = %zone, hook, error = %e, "Hook failed, using unmodified value");
                None
            }
        }
    }
}
