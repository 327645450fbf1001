//! Initiative rolls and turn ordering.

use skirmish_dice::RandomSource;
use tracing::debug;

use crate::combatant::Combatant;
use crate::resolver::D20;

/// Roll d20 + dexterity for every combatant and store it as initiative.
pub fn roll_initiative(combatants: &mut [Combatant], rng: &mut dyn RandomSource) {
    for combatant in combatants {
        let roll = rng.roll_die(D20);
        combatant.initiative = roll.saturating_add(combatant.dex_mod);
        debug!(combatant = %combatant.id, roll, initiative = combatant.initiative, "Rolled initiative");
    }
}

/// Order combatants by initiative, highest first. Ties keep input order.
pub fn sort_by_initiative(combatants: &mut [Combatant]) {
    combatants.sort_by(|a, b| b.initiative.cmp(&a.initiative));
}
