//! Round resolution.
//!
//! [`resolve_round`] walks the combatants in initiative order and drains
//! each living combatant's committed actions in submission order. Every
//! action produces one or more [`RoundEvent`]s; damage is applied in place
//! and reported through the caller's callback as it happens.
//!
//! # Attack pipeline
//!
//! Melee attacks (single and strike):
//!
//! 1. base roll from [`resolve_attack`]
//! 2. attacker condition penalties, and target AC penalties folded in
//!    with the opposite sign
//! 3. `on_attack_roll` may override the total
//! 4. the outcome is re-derived from the final total
//! 5. `on_damage_roll` may override positive damage
//! 6. damage is applied and reported
//! 7. outcome conditions: a critical failure knocks the attacker prone,
//!    a critical success leaves the target flat-footed, and a player
//!    dropped to 0 HP starts dying
//!
//! Ranged shots and explosives run the same pipeline minus the condition
//! penalties and the prone/flat-footed step.

use std::sync::Arc;

use skirmish_content::WeaponDef;
use skirmish_content::condition::{DYING, FLAT_FOOTED, PRONE, WOUNDED};
use skirmish_dice::RandomSource;
use skirmish_types::{ActionKind, AttackResult, CombatantId, Outcome, RoundEvent};
use tracing::{debug, info};

use crate::action::QueuedAction;
use crate::combat::Combat;
use crate::combatant::Combatant;
use crate::conditions::ActiveSet;
use crate::hooks::{
    HookValue, ON_ATTACK_ROLL, ON_CONDITION_APPLY, ON_DAMAGE_ROLL, ON_EXPLOSIVE_THROW, ON_RELOAD,
};
use crate::resolver::{outcome_for, resolve_attack, resolve_explosive, resolve_firearm_attack};

/// Attack penalty on the second swing of a strike.
pub const MULTIPLE_ATTACK_PENALTY: i32 = 5;

/// Shots in one burst.
pub const BURST_SHOTS: usize = 2;

/// Maximum shots in one automatic volley.
pub const AUTOMATIC_SHOTS: usize = 3;

/// Resolve every committed action in `combat`.
///
/// Combatants dead when their turn comes produce nothing. `on_damage` is
/// called with the target id and its new HP after every damage
/// application.
pub fn resolve_round(
    combat: &mut Combat,
    rng: &mut dyn RandomSource,
    on_damage: &mut dyn FnMut(&CombatantId, u32),
) -> Vec<RoundEvent> {
    let mut events = Vec::new();

    for index in 0..combat.combatants.len() {
        let Some(combatant) = combat.combatants.get(index) else {
            continue;
        };
        if combatant.is_dead() {
            continue;
        }
        let Some(queue) = combat.queues.get(combatant.id.as_str()) else {
            continue;
        };
        let actions = queue.actions().to_vec();
        let actor = Actor {
            index,
            id: combatant.id.clone(),
            name: combatant.name.clone(),
        };

        for action in &actions {
            let produced = match action.kind {
                ActionKind::Pass => vec![actor.event(
                    ActionKind::Pass,
                    format!("{} passes.", actor.name),
                )],
                ActionKind::Attack => resolve_single_attack(combat, &actor, action, rng, on_damage),
                ActionKind::Strike => resolve_strike(combat, &actor, action, rng, on_damage),
                ActionKind::Reload => vec![resolve_reload(combat, &actor, action)],
                ActionKind::FireBurst => resolve_burst(combat, &actor, action, rng, on_damage),
                ActionKind::FireAutomatic => {
                    resolve_automatic(combat, &actor, action, rng, on_damage)
                }
                ActionKind::Throw => resolve_throw(combat, &actor, action, rng, on_damage),
                ActionKind::Unknown => Vec::new(),
            };
            events.extend(produced);
        }
    }

    info!(
        room = %combat.room_id,
        round = combat.round,
        events = events.len(),
        "Round resolved"
    );
    events
}

/// The combatant whose actions are being drained.
struct Actor {
    index: usize,
    id: CombatantId,
    name: String,
}

impl Actor {
    fn event(&self, action: ActionKind, narrative: String) -> RoundEvent {
        RoundEvent::narrative(self.id.clone(), self.name.clone(), action, narrative)
    }

    fn attack_event(&self, action: ActionKind, attack: AttackResult, narrative: String) -> RoundEvent {
        RoundEvent {
            actor_id: self.id.clone(),
            actor_name: self.name.clone(),
            action,
            attack: Some(attack),
            narrative,
        }
    }
}

// ---------------------------------------------------------------------------
// Melee
// ---------------------------------------------------------------------------

fn resolve_single_attack(
    combat: &mut Combat,
    actor: &Actor,
    action: &QueuedAction,
    rng: &mut dyn RandomSource,
    on_damage: &mut dyn FnMut(&CombatantId, u32),
) -> Vec<RoundEvent> {
    let target = action
        .target
        .as_deref()
        .and_then(|name| living_by_name(combat, name));
    let Some((target, target_name)) = target else {
        return vec![actor.event(
            ActionKind::Attack,
            format!("{} attacks but hits nothing.", actor.name),
        )];
    };

    let Some(result) = melee_hit(combat, actor.index, target, 0, rng, on_damage) else {
        return Vec::new();
    };
    let narrative = format!(
        "{} attacks {target_name}: {} (total {}).",
        actor.name, result.outcome, result.attack_total
    );
    vec![actor.attack_event(ActionKind::Attack, result, narrative)]
}

fn resolve_strike(
    combat: &mut Combat,
    actor: &Actor,
    action: &QueuedAction,
    rng: &mut dyn RandomSource,
    on_damage: &mut dyn FnMut(&CombatantId, u32),
) -> Vec<RoundEvent> {
    let target = action
        .target
        .as_deref()
        .and_then(|name| living_by_name(combat, name));
    let Some((target, target_name)) = target else {
        return vec![
            actor.event(
                ActionKind::Strike,
                format!("{} strikes but hits nothing.", actor.name),
            ),
            actor.event(
                ActionKind::Strike,
                format!("{} strikes again but hits nothing.", actor.name),
            ),
        ];
    };

    let mut events = Vec::new();
    if let Some(first) = melee_hit(combat, actor.index, target, 0, rng, on_damage) {
        let narrative = format!(
            "{} strikes {target_name}: {} (total {}).",
            actor.name, first.outcome, first.attack_total
        );
        events.push(actor.attack_event(ActionKind::Strike, first, narrative));
    }

    if is_dead(combat, target) {
        events.push(actor.event(
            ActionKind::Strike,
            format!("{} follows up but {target_name} is already dead.", actor.name),
        ));
        return events;
    }

    if let Some(second) = melee_hit(
        combat,
        actor.index,
        target,
        MULTIPLE_ATTACK_PENALTY,
        rng,
        on_damage,
    ) {
        let narrative = format!(
            "{} strikes {target_name} again (MAP): {} (total {}).",
            actor.name, second.outcome, second.attack_total
        );
        events.push(actor.attack_event(ActionKind::Strike, second, narrative));
    }
    events
}

/// One melee swing through the full pipeline. `penalty` is subtracted
/// from the total before the override hook sees it.
fn melee_hit(
    combat: &mut Combat,
    attacker: usize,
    target: usize,
    penalty: i32,
    rng: &mut dyn RandomSource,
    on_damage: &mut dyn FnMut(&CombatantId, u32),
) -> Option<AttackResult> {
    let (Some(a), Some(t)) = (combat.combatants.get(attacker), combat.combatants.get(target))
    else {
        return None;
    };

    let mut result = resolve_attack(a, t, rng);
    let adjusted = result
        .attack_total
        .saturating_add(condition_adjustment(combat, &a.id, &t.id))
        .saturating_sub(penalty);
    result.attack_total = hook_attack_roll(combat, &a.id, t, adjusted);
    result.outcome = outcome_for(result.attack_total, t.armor_class);
    let damage = hook_damage_roll(combat, &a.id, &t.id, result.effective_damage());

    apply_damage(combat, target, damage, on_damage);
    apply_outcome_conditions(combat, attacker, target, result.outcome);
    Some(result)
}

/// Attacker condition penalties plus the target's lowered AC, as a
/// change to the attack total.
fn condition_adjustment(combat: &Combat, attacker: &CombatantId, target: &CombatantId) -> i32 {
    let attack = combat
        .conditions
        .get(attacker)
        .map_or(0, ActiveSet::attack_modifier);
    let ac = combat.conditions.get(target).map_or(0, ActiveSet::ac_modifier);
    attack.saturating_sub(ac)
}

// ---------------------------------------------------------------------------
// Firearms
// ---------------------------------------------------------------------------

fn resolve_reload(combat: &mut Combat, actor: &Actor, action: &QueuedAction) -> RoundEvent {
    let reloaded = combat
        .combatants
        .get_mut(actor.index)
        .and_then(|c| c.loadout.main_hand.as_mut())
        .and_then(|equipped| {
            equipped.magazine.as_mut()?.reload();
            Some(equipped.def.name.clone())
        });

    let narrative = match reloaded {
        Some(weapon) => format!("{} reloads {weapon}.", actor.name),
        None => format!("{} reloads.", actor.name),
    };

    combat.hooks.call(
        &combat.zone_id,
        ON_RELOAD,
        &[
            actor.id.as_str().into(),
            action.weapon_id.as_deref().unwrap_or_default().into(),
        ],
    );
    actor.event(ActionKind::Reload, narrative)
}

fn resolve_burst(
    combat: &mut Combat,
    actor: &Actor,
    action: &QueuedAction,
    rng: &mut dyn RandomSource,
    on_damage: &mut dyn FnMut(&CombatantId, u32),
) -> Vec<RoundEvent> {
    let target = action
        .target
        .as_deref()
        .and_then(|key| living_by_name_or_id(combat, key));
    let Some((target, target_name)) = target else {
        return vec![actor.event(
            ActionKind::FireBurst,
            format!("{} fires burst but target not found.", actor.name),
        )];
    };
    let weapon = primary_firearm(combat, actor.index, action.weapon_id.as_deref());

    let mut events = Vec::new();
    for _ in 0..BURST_SHOTS {
        let Some((result, damage)) =
            ranged_shot(combat, actor.index, target, weapon.as_deref(), rng, on_damage)
        else {
            break;
        };
        let narrative = ranged_narrative(&actor.name, &target_name, result.outcome, damage);
        events.push(actor.attack_event(ActionKind::FireBurst, result, narrative));
        if is_dead(combat, target) {
            break;
        }
    }
    events
}

fn resolve_automatic(
    combat: &mut Combat,
    actor: &Actor,
    action: &QueuedAction,
    rng: &mut dyn RandomSource,
    on_damage: &mut dyn FnMut(&CombatantId, u32),
) -> Vec<RoundEvent> {
    let enemies = living_enemies(combat, actor.index);
    if enemies.is_empty() {
        return vec![actor.event(
            ActionKind::FireAutomatic,
            format!("{} lays down suppressive fire.", actor.name),
        )];
    }
    let weapon = primary_firearm(combat, actor.index, action.weapon_id.as_deref());

    let mut events = Vec::new();
    for target in enemies.into_iter().take(AUTOMATIC_SHOTS) {
        let target_name = name_of(combat, target);
        let Some((result, damage)) =
            ranged_shot(combat, actor.index, target, weapon.as_deref(), rng, on_damage)
        else {
            continue;
        };
        let narrative = ranged_narrative(&actor.name, &target_name, result.outcome, damage);
        events.push(actor.attack_event(ActionKind::FireAutomatic, result, narrative));
    }
    events
}

/// One shot with `weapon`, or an unarmed swing when no firearm is in
/// hand. Returns the result and the damage actually dealt.
fn ranged_shot(
    combat: &mut Combat,
    attacker: usize,
    target: usize,
    weapon: Option<&WeaponDef>,
    rng: &mut dyn RandomSource,
    on_damage: &mut dyn FnMut(&CombatantId, u32),
) -> Option<(AttackResult, i32)> {
    let (Some(a), Some(t)) = (combat.combatants.get(attacker), combat.combatants.get(target))
    else {
        return None;
    };

    let mut result = match weapon {
        Some(weapon) => resolve_firearm_attack(a, t, weapon, 0, combat.dice.as_ref(), rng),
        None => resolve_attack(a, t, rng),
    };
    result.attack_total = hook_attack_roll(combat, &a.id, t, result.attack_total);
    result.outcome = outcome_for(result.attack_total, t.armor_class);
    let damage = hook_damage_roll(combat, &a.id, &t.id, result.effective_damage());

    apply_damage(combat, target, damage, on_damage);
    apply_dying_rule(combat, target);

    if weapon.is_some() {
        let magazine = combat
            .combatants
            .get_mut(attacker)
            .and_then(|c| c.loadout.magazine_mut());
        if let Some(Err(e)) = magazine.map(|m| m.consume(1)) {
            debug!(combatant = %result.attacker_id, error = %e, "Fired with an empty magazine");
        }
    }
    Some((result, damage))
}

/// The main-hand firearm, if it matches `weapon_id` (when one is given).
fn primary_firearm(combat: &Combat, actor: usize, weapon_id: Option<&str>) -> Option<Arc<WeaponDef>> {
    let equipped = combat.combatants.get(actor)?.loadout.main_hand.as_ref()?;
    if !equipped.def.is_firearm() {
        return None;
    }
    if weapon_id.is_some_and(|id| !id.is_empty() && id != equipped.def.id) {
        return None;
    }
    Some(Arc::clone(&equipped.def))
}

fn ranged_narrative(actor: &str, target: &str, outcome: Outcome, damage: i32) -> String {
    match outcome {
        Outcome::CriticalSuccess => {
            format!("{actor} scores a CRITICAL HIT on {target} for {damage} damage!")
        }
        Outcome::Success => format!("{actor} hits {target} for {damage} damage."),
        Outcome::Failure => format!("{actor} misses {target}."),
        Outcome::CriticalFailure => format!("{actor} critically fails against {target}."),
    }
}

// ---------------------------------------------------------------------------
// Explosives
// ---------------------------------------------------------------------------

fn resolve_throw(
    combat: &mut Combat,
    actor: &Actor,
    action: &QueuedAction,
    rng: &mut dyn RandomSource,
    on_damage: &mut dyn FnMut(&CombatantId, u32),
) -> Vec<RoundEvent> {
    let Some(inventory) = combat.inventory.clone() else {
        return vec![actor.event(
            ActionKind::Throw,
            format!("{} fumbles the throw.", actor.name),
        )];
    };
    let explosive = action
        .explosive_id
        .as_deref()
        .and_then(|id| inventory.explosive(id));
    let Some(explosive) = explosive else {
        return vec![actor.event(
            ActionKind::Throw,
            format!("{} reaches for an explosive but finds nothing.", actor.name),
        )];
    };

    combat.hooks.call(
        &combat.zone_id,
        ON_EXPLOSIVE_THROW,
        &[actor.id.as_str().into(), explosive.id.as_str().into()],
    );

    let enemies = living_enemies(combat, actor.index);
    let results = {
        let targets: Vec<&Combatant> = enemies
            .iter()
            .filter_map(|&i| combat.combatants.get(i))
            .collect();
        resolve_explosive(explosive, &targets, combat.dice.as_ref(), rng)
    };

    let mut events = Vec::new();
    for (&target, hit) in enemies.iter().zip(results) {
        let target_name = name_of(combat, target);
        apply_damage(combat, target, hit.base_damage, on_damage);
        apply_dying_rule(combat, target);
        events.push(actor.event(
            ActionKind::Throw,
            format!(
                "{} throws {} at {target_name} for {} damage (save {} vs DC {}).",
                actor.name, explosive.name, hit.base_damage, hit.save_total, explosive.save_dc
            ),
        ));
    }

    if events.is_empty() {
        events.push(actor.event(
            ActionKind::Throw,
            format!(
                "{} throws {} but no targets are in range.",
                actor.name, explosive.name
            ),
        ));
    }
    events
}

// ---------------------------------------------------------------------------
// Damage and conditions
// ---------------------------------------------------------------------------

fn apply_damage(
    combat: &mut Combat,
    target: usize,
    damage: i32,
    on_damage: &mut dyn FnMut(&CombatantId, u32),
) {
    let Ok(amount) = u32::try_from(damage) else {
        return;
    };
    if amount == 0 {
        return;
    }
    let Some(t) = combat.combatants.get_mut(target) else {
        return;
    };
    let hp = t.apply_damage(amount);
    debug!(room = %combat.room_id, target = %t.id, damage = amount, hp, "Damage applied");
    on_damage(&t.id, hp);
}

fn apply_outcome_conditions(combat: &mut Combat, attacker: usize, target: usize, outcome: Outcome) {
    match outcome {
        Outcome::CriticalFailure => {
            if let Some(id) = combat.combatants.get(attacker).map(|c| c.id.clone()) {
                apply_if_allowed(combat, &id, PRONE, 1, None);
            }
        }
        Outcome::CriticalSuccess => {
            if let Some(id) = combat.combatants.get(target).map(|c| c.id.clone()) {
                apply_if_allowed(combat, &id, FLAT_FOOTED, 1, Some(1));
            }
        }
        Outcome::Success | Outcome::Failure => {}
    }
    apply_dying_rule(combat, target);
}

/// A player at 0 HP who is not already dying starts dying at one stack
/// more than their wounds.
fn apply_dying_rule(combat: &mut Combat, target: usize) {
    let Some(t) = combat.combatants.get(target) else {
        return;
    };
    if !t.is_player() || t.dead || t.current_hp > 0 {
        return;
    }
    let id = t.id.clone();
    if combat.has_condition(id.as_str(), DYING) {
        return;
    }
    let wounded = combat
        .conditions
        .get(&id)
        .map_or(0, |set| set.stacks(WOUNDED));
    apply_if_allowed(combat, &id, DYING, wounded.saturating_add(1), None);
}

/// Apply a condition unless `on_condition_apply` vetoes it. Conditions
/// missing from the registry are skipped.
fn apply_if_allowed(
    combat: &mut Combat,
    id: &CombatantId,
    condition_id: &str,
    stacks: u32,
    duration: Option<u32>,
) {
    let vetoed = combat
        .hooks
        .call(
            &combat.zone_id,
            ON_CONDITION_APPLY,
            &[id.as_str().into(), condition_id.into(), stacks.into()],
        )
        .is_some_and(|v| v.is_false());
    if vetoed {
        debug!(combatant = %id, condition = condition_id, "Condition vetoed by hook");
        return;
    }
    if let Err(e) = combat.apply_condition(id.as_str(), condition_id, stacks, duration) {
        debug!(combatant = %id, condition = condition_id, error = %e, "Condition skipped");
    }
}

// ---------------------------------------------------------------------------
// Hooks
// ---------------------------------------------------------------------------

fn hook_attack_roll(combat: &Combat, attacker: &CombatantId, target: &Combatant, total: i32) -> i32 {
    combat
        .hooks
        .call(
            &combat.zone_id,
            ON_ATTACK_ROLL,
            &[
                attacker.as_str().into(),
                target.id.as_str().into(),
                total.into(),
                target.armor_class.into(),
            ],
        )
        .as_ref()
        .and_then(HookValue::as_int)
        .unwrap_or(total)
}

fn hook_damage_roll(combat: &Combat, attacker: &CombatantId, target: &CombatantId, damage: i32) -> i32 {
    if damage <= 0 {
        return damage;
    }
    combat
        .hooks
        .call(
            &combat.zone_id,
            ON_DAMAGE_ROLL,
            &[attacker.as_str().into(), target.as_str().into(), damage.into()],
        )
        .as_ref()
        .and_then(HookValue::as_int)
        .unwrap_or(damage)
}

// ---------------------------------------------------------------------------
// Targeting
// ---------------------------------------------------------------------------

/// First living combatant whose name is exactly `name`.
fn living_by_name(combat: &Combat, name: &str) -> Option<(usize, String)> {
    combat
        .combatants
        .iter()
        .position(|c| !c.is_dead() && c.name == name)
        .map(|i| (i, name.to_owned()))
}

/// First living combatant whose name or id matches `key`, ignoring case.
fn living_by_name_or_id(combat: &Combat, key: &str) -> Option<(usize, String)> {
    let key = key.to_lowercase();
    combat
        .combatants
        .iter()
        .enumerate()
        .find(|(_, c)| {
            !c.is_dead() && (c.name.to_lowercase() == key || c.id.as_str().to_lowercase() == key)
        })
        .map(|(i, c)| (i, c.name.clone()))
}

/// Living combatants on the other side from `actor`, in initiative order.
fn living_enemies(combat: &Combat, actor: usize) -> Vec<usize> {
    let Some(allegiance) = combat.combatants.get(actor).map(|c| c.allegiance) else {
        return Vec::new();
    };
    combat
        .combatants
        .iter()
        .enumerate()
        .filter(|(i, c)| *i != actor && !c.is_dead() && c.allegiance == allegiance.opposing())
        .map(|(i, _)| i)
        .collect()
}

fn name_of(combat: &Combat, index: usize) -> String {
    combat
        .combatants
        .get(index)
        .map(|c| c.name.clone())
        .unwrap_or_default()
}

fn is_dead(combat: &Combat, index: usize) -> bool {
    combat.combatants.get(index).is_none_or(Combatant::is_dead)
}
