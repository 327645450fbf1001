//! The dying recovery chain.
//!
//! A player dropped to 0 HP gains "dying" instead of dying outright. At
//! the start of each round a dying combatant makes a flat d20 check:
//!
//! - 25 or better: recovers fully to 1 HP, no lasting effect
//! - 15 or better: recovers to 1 HP with one more stack of "wounded"
//! - otherwise: dying advances one stack; at 4 stacks the combatant dies
//!
//! The check carries no bonus, so a bare roll tops out at 20 and always
//! lands in the wounded band on success.
//!
//! Every transition is reported as a [`ConditionEvent`].

use skirmish_content::ConditionRegistry;
use skirmish_content::condition::{DYING, WOUNDED};
use skirmish_dice::RandomSource;
use skirmish_types::{ConditionChange, ConditionEvent};
use tracing::info;

use crate::combatant::Combatant;
use crate::conditions::ActiveSet;
use crate::resolver::D20;

/// Dying stacks at which the combatant dies.
pub const DEATH_STACKS: u32 = 4;

/// Flat check needed to stabilise.
pub const RECOVERY_DC: i32 = 15;

/// Check result that stabilises without a wound.
pub const CRITICAL_RECOVERY: i32 = 25;

/// Run one recovery check if `combatant` is dying. No-op otherwise.
pub fn recovery_check(
    combatant: &mut Combatant,
    conditions: &mut ActiveSet,
    registry: &ConditionRegistry,
    rng: &mut dyn RandomSource,
) -> Vec<ConditionEvent> {
    if !conditions.has(DYING) {
        return Vec::new();
    }

    let roll = rng.roll_die(D20);
    let stacks = conditions.stacks(DYING);
    let event = |id: &str, stacks: u32, change: ConditionChange| ConditionEvent {
        combatant_id: combatant.id.clone(),
        combatant_name: combatant.name.clone(),
        condition_id: id.to_owned(),
        condition_name: registry.get(id).map_or_else(|| id.to_owned(), |d| d.name.clone()),
        stacks,
        change,
    };

    let mut events = Vec::new();
    if roll >= CRITICAL_RECOVERY {
        conditions.remove(DYING);
        events.push(event(DYING, 0, ConditionChange::Removed));
        combatant.set_hp(1);
        info!(combatant = %combatant.id, roll, "Critical recovery from dying");
    } else if roll >= RECOVERY_DC {
        conditions.remove(DYING);
        if let Some(wounded) = registry.get(WOUNDED) {
            conditions.apply(wounded, 1, None);
        }
        events.push(event(DYING, 0, ConditionChange::Removed));
        events.push(event(
            WOUNDED,
            conditions.stacks(WOUNDED),
            ConditionChange::Applied,
        ));
        combatant.set_hp(1);
        info!(combatant = %combatant.id, roll, "Recovered from dying with a wound");
    } else {
        let advanced = stacks.saturating_add(1);
        if advanced >= DEATH_STACKS {
            conditions.remove(DYING);
            events.push(event(DYING, DEATH_STACKS, ConditionChange::Removed));
            combatant.current_hp = 0;
            combatant.dead = true;
            info!(combatant = %combatant.id, roll, "Died from wounds");
        } else {
            if let Some(dying) = registry.get(DYING) {
                conditions.remove(DYING);
                conditions.apply(dying, advanced, None);
            }
            events.push(event(DYING, advanced, ConditionChange::Applied));
            info!(combatant = %combatant.id, roll, stacks = advanced, "Dying worsened");
        }
    }
    events
}
