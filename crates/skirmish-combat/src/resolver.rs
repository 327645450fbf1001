//! Attack, firearm and explosive resolution.
//!
//! Pure functions over combatant stats and a [`RandomSource`]. None of
//! them mutate anything; round resolution applies the results.
//!
//! # Outcome tiers
//!
//! Every roll compared to a target number `N` lands in one of four tiers:
//!
//! | Total            | Outcome          |
//! |------------------|------------------|
//! | `>= N + 10`      | critical success |
//! | `>= N`           | success          |
//! | `>= N - 10`      | failure          |
//! | otherwise        | critical failure |

use skirmish_content::{ExplosiveDef, WeaponDef};
use skirmish_dice::{DiceEvaluator, RandomSource};
use skirmish_types::{AttackResult, CombatantId, Outcome};
use tracing::warn;

use crate::combatant::{Combatant, proficiency_bonus};

/// Sides on the die used for attack rolls and saves.
pub const D20: u32 = 20;

/// Sides on the unarmed damage die.
pub const UNARMED_DIE: u32 = 6;

/// Attack penalty per range increment.
pub const RANGE_PENALTY: i32 = 2;

/// Classify `total` against `target_number`.
pub const fn outcome_for(total: i32, target_number: i32) -> Outcome {
    if total >= target_number.saturating_add(10) {
        Outcome::CriticalSuccess
    } else if total >= target_number {
        Outcome::Success
    } else if total >= target_number.saturating_sub(10) {
        Outcome::Failure
    } else {
        Outcome::CriticalFailure
    }
}

/// Melee attack: d20 + strength + proficiency against the target's AC.
/// Damage is 1d6 + strength, with a negative strength ignored.
pub fn resolve_attack(
    attacker: &Combatant,
    target: &Combatant,
    rng: &mut dyn RandomSource,
) -> AttackResult {
    let d20 = rng.roll_die(D20);
    let total = d20
        .saturating_add(attacker.str_mod)
        .saturating_add(proficiency_bonus(attacker.level));

    let damage_die = rng.roll_die(UNARMED_DIE);
    let base_damage = damage_die.saturating_add(attacker.str_mod.max(0));

    AttackResult {
        attacker_id: attacker.id.clone(),
        target_id: target.id.clone(),
        attack_roll: d20,
        attack_total: total,
        outcome: outcome_for(total, target.armor_class),
        base_damage,
        damage_roll: vec![damage_die],
    }
}

/// Ranged attack with `weapon`: d20 + dexterity + proficiency, minus
/// [`RANGE_PENALTY`] per range increment. Negative increments count as
/// zero. Damage comes from the weapon's dice; an unparseable expression
/// deals nothing.
pub fn resolve_firearm_attack(
    attacker: &Combatant,
    target: &Combatant,
    weapon: &WeaponDef,
    range_increments: i32,
    dice: &dyn DiceEvaluator,
    rng: &mut dyn RandomSource,
) -> AttackResult {
    let d20 = rng.roll_die(D20);
    let range_penalty = RANGE_PENALTY.saturating_mul(range_increments.max(0));
    let total = d20
        .saturating_add(attacker.dex_mod)
        .saturating_add(proficiency_bonus(attacker.level))
        .saturating_sub(range_penalty);

    let (base_damage, damage_roll) = match dice.roll_expression(&weapon.damage_dice, rng) {
        Ok(roll) => (roll.total().max(0), roll.dice),
        Err(e) => {
            warn!(weapon = %weapon.id, error = %e, "Weapon damage dice failed to roll");
            (0, Vec::new())
        }
    };

    AttackResult {
        attacker_id: attacker.id.clone(),
        target_id: target.id.clone(),
        attack_roll: d20,
        attack_total: total,
        outcome: outcome_for(total, target.armor_class),
        base_damage,
        damage_roll,
    }
}

/// Per-target result of an explosive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplosiveResult {
    /// The target.
    pub target_id: CombatantId,
    /// d20 + target dexterity.
    pub save_total: i32,
    /// Save outcome against the explosive's DC.
    pub save_result: Outcome,
    /// Damage after the save, never negative.
    pub base_damage: i32,
}

/// Detonate `explosive` over `targets`.
///
/// Damage is rolled once and shared. Each target then saves (d20 +
/// dexterity against the DC): a critical success takes nothing, a success
/// half, a failure full, a critical failure double.
pub fn resolve_explosive(
    explosive: &ExplosiveDef,
    targets: &[&Combatant],
    dice: &dyn DiceEvaluator,
    rng: &mut dyn RandomSource,
) -> Vec<ExplosiveResult> {
    let damage = match dice.roll_expression(&explosive.damage_dice, rng) {
        Ok(roll) => roll.total(),
        Err(e) => {
            warn!(explosive = %explosive.id, error = %e, "Explosive damage dice failed to roll");
            0
        }
    };

    targets
        .iter()
        .map(|target| {
            let save_total = rng.roll_die(D20).saturating_add(target.dex_mod);
            let save_result = outcome_for(save_total, explosive.save_dc);
            let scaled = match save_result {
                Outcome::CriticalSuccess => 0,
                Outcome::Success => damage / 2,
                Outcome::Failure => damage,
                Outcome::CriticalFailure => damage.saturating_mul(2),
            };
            ExplosiveResult {
                target_id: target.id.clone(),
                save_total,
                save_result,
                base_damage: scaled.max(0),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use skirmish_content::{AreaType, FiringMode, FuseType};
    use skirmish_dice::{FixedSource, StandardDice};
    use skirmish_types::Allegiance;

    use super::*;

    fn fighter(id: &str, ac: i32, level: u32, str_mod: i32, dex_mod: i32) -> Combatant {
        Combatant::new(id, id, Allegiance::Player, 30, ac)
            .with_level(level)
            .with_modifiers(str_mod, dex_mod)
    }

    fn weapon(damage_dice: &str) -> WeaponDef {
        WeaponDef {
            id: "test-pistol".to_owned(),
            name: "Test Pistol".to_owned(),
            damage_dice: damage_dice.to_owned(),
            damage_type: "piercing".to_owned(),
            range_increment: 30,
            reload_actions: 1,
            magazine_capacity: 10,
            firing_modes: vec![FiringMode::Single],
            traits: Vec::new(),
        }
    }

    fn grenade(damage_dice: &str, save_dc: i32) -> ExplosiveDef {
        ExplosiveDef {
            id: "test-grenade".to_owned(),
            name: "Test Grenade".to_owned(),
            damage_dice: damage_dice.to_owned(),
            damage_type: "fire".to_owned(),
            area_type: AreaType::Burst,
            save_type: "reflex".to_owned(),
            save_dc,
            fuse: FuseType::Immediate,
            traits: Vec::new(),
        }
    }

    #[test]
    fn outcome_tiers_use_ten_point_bands() {
        assert_eq!(outcome_for(22, 12), Outcome::CriticalSuccess);
        assert_eq!(outcome_for(21, 12), Outcome::Success);
        assert_eq!(outcome_for(12, 12), Outcome::Success);
        assert_eq!(outcome_for(11, 12), Outcome::Failure);
        assert_eq!(outcome_for(2, 12), Outcome::Failure);
        assert_eq!(outcome_for(1, 12), Outcome::CriticalFailure);
    }

    #[test]
    fn natural_twenty_crits_against_ac_twelve() {
        let attacker = fighter("a", 10, 1, 2, 0);
        let target = fighter("t", 12, 1, 0, 0);
        let result = resolve_attack(&attacker, &target, &mut FixedSource::new(19));
        assert_eq!(result.attack_roll, 20);
        assert_eq!(result.attack_total, 24);
        assert_eq!(result.outcome, Outcome::CriticalSuccess);
        assert_eq!(result.damage_roll, vec![6]);
        assert_eq!(result.base_damage, 8);
    }

    #[test]
    fn negative_strength_does_not_reduce_damage() {
        let attacker = fighter("a", 10, 1, -3, 0);
        let target = fighter("t", 12, 1, 0, 0);
        let result = resolve_attack(&attacker, &target, &mut FixedSource::new(0));
        assert_eq!(result.attack_total, 1 - 3 + 2);
        assert_eq!(result.base_damage, 1);
    }

    #[test]
    fn firearm_uses_dexterity() {
        let attacker = fighter("a", 10, 1, 0, 2);
        let target = fighter("t", 14, 1, 0, 0);
        let result = resolve_firearm_attack(
            &attacker,
            &target,
            &weapon("1d6"),
            0,
            &StandardDice,
            &mut FixedSource::new(17),
        );
        assert_eq!(result.attack_roll, 18);
        assert_eq!(result.attack_total, 22);
        assert_eq!(result.outcome, Outcome::Success);
    }

    #[test]
    fn bad_weapon_dice_deal_no_damage() {
        let attacker = fighter("a", 10, 1, 0, 2);
        let target = fighter("t", 14, 1, 0, 0);
        let result = resolve_firearm_attack(
            &attacker,
            &target,
            &weapon("lots"),
            0,
            &StandardDice,
            &mut FixedSource::new(19),
        );
        assert_eq!(result.base_damage, 0);
        assert!(result.damage_roll.is_empty());
    }

    #[test]
    fn low_saves_take_damage() {
        let targets = [fighter("t1", 10, 1, 0, 0), fighter("t2", 10, 1, 0, 0)];
        let refs: Vec<&Combatant> = targets.iter().collect();
        let results = resolve_explosive(
            &grenade("1d4", 12),
            &refs,
            &StandardDice,
            &mut FixedSource::new(3),
        );
        assert_eq!(results.len(), 2);
        for r in &results {
            assert_eq!(r.save_total, 4);
            assert_eq!(r.save_result, Outcome::Failure);
            assert_eq!(r.base_damage, 4);
        }
    }

    #[test]
    fn critical_save_takes_nothing() {
        let target = fighter("t1", 10, 1, 0, 0);
        let results = resolve_explosive(
            &grenade("1d6", 5),
            &[&target],
            &StandardDice,
            &mut FixedSource::new(19),
        );
        assert_eq!(results.len(), 1);
        assert!(
            results
                .iter()
                .all(|r| r.save_result == Outcome::CriticalSuccess && r.base_damage == 0)
        );
    }

    #[test]
    fn successful_save_halves_damage() {
        let target = fighter("t1", 10, 1, 0, 0);
        // d6 rolls 6, save rolls 20 + 0 against DC 15: success, not critical.
        let results = resolve_explosive(
            &grenade("1d6+1", 15),
            &[&target],
            &StandardDice,
            &mut FixedSource::new(19),
        );
        assert!(
            results
                .iter()
                .all(|r| r.save_result == Outcome::Success && r.base_damage == 3)
        );
    }

    proptest! {
        #[test]
        fn explosive_damage_never_negative(roll in 0_u32..20, save_dc in 5_i32..26, modifier in -10_i32..5) {
            let target = fighter("t1", 10, 1, 0, 0);
            let expr = format!("1d6{modifier:+}");
            let results = resolve_explosive(
                &grenade(&expr, save_dc),
                &[&target],
                &StandardDice,
                &mut FixedSource::new(roll),
            );
            prop_assert_eq!(results.len(), 1);
            prop_assert!(results.iter().all(|r| r.base_damage >= 0));
        }

        #[test]
        fn more_range_never_helps(roll in 0_u32..20, near in 0_i32..6, far in 0_i32..6) {
            let attacker = fighter("a", 10, 1, 0, 2);
            let target = fighter("t", 14, 1, 0, 0);
            let w = weapon("1d6");
            let a = resolve_firearm_attack(&attacker, &target, &w, near, &StandardDice, &mut FixedSource::new(roll));
            let b = resolve_firearm_attack(&attacker, &target, &w, far, &StandardDice, &mut FixedSource::new(roll));
            if near < far {
                prop_assert!(a.attack_total >= b.attack_total);
            }
        }

        #[test]
        fn outcome_tiers_partition_totals(total in -50_i32..80, target in 0_i32..40) {
            let expected = if total >= target + 10 {
                Outcome::CriticalSuccess
            } else if total >= target {
                Outcome::Success
            } else if total >= target - 10 {
                Outcome::Failure
            } else {
                Outcome::CriticalFailure
            };
            prop_assert_eq!(outcome_for(total, target), expected);
        }
    }
}
