//! Encounter state for one room.
//!
//! A [`Combat`] owns the initiative-ordered combatants, their action
//! queues and condition sets, the round counter and the turn cursor. It
//! has no internal locking: the host serialises every mutation of one
//! encounter (see `skirmish-core`'s engine for the per-room handles).
//!
//! # Round lifecycle
//!
//! 1. [`Combat::start_round`] bumps the round counter, ticks conditions,
//!    runs the dying recovery chain and hands every living combatant a
//!    fresh [`ActionQueue`].
//! 2. Combatants commit intent through [`Combat::queue_action`].
//! 3. [`Combat::resolve_round`] turns the committed actions into
//!    [`RoundEvent`]s.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use skirmish_content::condition::DYING;
use skirmish_content::{ConditionRegistry, InventoryRegistry};
use skirmish_dice::{DiceEvaluator, RandomSource, StandardDice};
use skirmish_types::{
    ConditionChange, ConditionEvent, CombatantId, EncounterId, RoomId, RoundEvent, ZoneId,
};
use tracing::{debug, info};

use crate::action::{ActionQueue, QueuedAction};
use crate::combatant::Combatant;
use crate::conditions::ActiveSet;
use crate::dying;
use crate::error::CombatError;
use crate::hooks::{NoHooks, ScriptHooks};
use crate::initiative::sort_by_initiative;
use crate::round;

/// How an encounter stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatOutcome {
    /// Both sides still have living members.
    Ongoing,
    /// Every NPC is dead.
    Victory,
    /// Every player is dead.
    Defeat,
}

// ---------------------------------------------------------------------------
// EncounterParams
// ---------------------------------------------------------------------------

/// Everything needed to open an encounter.
pub struct EncounterParams {
    /// The room the fight happens in.
    pub room_id: RoomId,
    /// Key used for scripting hook lookups.
    pub zone_id: ZoneId,
    /// Participants. Ordered by initiative when the encounter opens.
    pub combatants: Vec<Combatant>,
    /// Condition definitions.
    pub conditions: Arc<ConditionRegistry>,
    /// Weapon and explosive definitions. Throws fumble without it.
    pub inventory: Option<Arc<InventoryRegistry>>,
    /// Scripting hooks.
    pub hooks: Arc<dyn ScriptHooks>,
    /// Dice expression evaluator.
    pub dice: Arc<dyn DiceEvaluator>,
}

impl EncounterParams {
    /// Core conditions, no inventory, no hooks, standard dice. The zone
    /// defaults to the room id.
    pub fn new(room_id: impl Into<RoomId>, combatants: Vec<Combatant>) -> Self {
        let room_id = room_id.into();
        Self {
            zone_id: ZoneId::new(room_id.as_str()),
            room_id,
            combatants,
            conditions: Arc::new(ConditionRegistry::core()),
            inventory: None,
            hooks: Arc::new(NoHooks),
            dice: Arc::new(StandardDice),
        }
    }

    /// Set the hook zone.
    #[must_use]
    pub fn with_zone(mut self, zone_id: impl Into<ZoneId>) -> Self {
        self.zone_id = zone_id.into();
        self
    }

    /// Use `conditions` instead of the core set.
    #[must_use]
    pub fn with_conditions(mut self, conditions: Arc<ConditionRegistry>) -> Self {
        self.conditions = conditions;
        self
    }

    /// Make explosives available.
    #[must_use]
    pub fn with_inventory(mut self, inventory: Arc<InventoryRegistry>) -> Self {
        self.inventory = Some(inventory);
        self
    }

    /// Install scripting hooks.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Arc<dyn ScriptHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Use a custom dice evaluator.
    #[must_use]
    pub fn with_dice(mut self, dice: Arc<dyn DiceEvaluator>) -> Self {
        self.dice = dice;
        self
    }
}

impl core::fmt::Debug for EncounterParams {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EncounterParams")
            .field("room_id", &self.room_id)
            .field("zone_id", &self.zone_id)
            .field("combatants", &self.combatants.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Combat
// ---------------------------------------------------------------------------

/// One active encounter.
pub struct Combat {
    pub(crate) room_id: RoomId,
    pub(crate) encounter_id: EncounterId,
    pub(crate) zone_id: ZoneId,
    pub(crate) started_at: DateTime<Utc>,
    pub(crate) combatants: Vec<Combatant>,
    pub(crate) turn_index: usize,
    pub(crate) round: u32,
    pub(crate) over: bool,
    pub(crate) queues: BTreeMap<CombatantId, ActionQueue>,
    pub(crate) conditions: BTreeMap<CombatantId, ActiveSet>,
    pub(crate) condition_registry: Arc<ConditionRegistry>,
    pub(crate) inventory: Option<Arc<InventoryRegistry>>,
    pub(crate) hooks: Arc<dyn ScriptHooks>,
    pub(crate) dice: Arc<dyn DiceEvaluator>,
}

impl Combat {
    /// Open an encounter. Combatants are sorted by initiative, highest
    /// first, ties keeping their input order. No round is open yet.
    pub fn new(params: EncounterParams) -> Self {
        let EncounterParams {
            room_id,
            zone_id,
            mut combatants,
            conditions,
            inventory,
            hooks,
            dice,
        } = params;
        sort_by_initiative(&mut combatants);

        let sets = combatants
            .iter()
            .map(|c| (c.id.clone(), ActiveSet::new()))
            .collect();

        let combat = Self {
            room_id,
            encounter_id: EncounterId::new(),
            zone_id,
            started_at: Utc::now(),
            combatants,
            turn_index: 0,
            round: 0,
            over: false,
            queues: BTreeMap::new(),
            conditions: sets,
            condition_registry: conditions,
            inventory,
            hooks,
            dice,
        };
        info!(
            room = %combat.room_id,
            encounter = %combat.encounter_id,
            combatants = combat.combatants.len(),
            "Encounter opened"
        );
        combat
    }

    /// The room this encounter belongs to.
    pub const fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Unique id of this encounter.
    pub const fn encounter_id(&self) -> EncounterId {
        self.encounter_id
    }

    /// Scripting hook zone.
    pub const fn zone_id(&self) -> &ZoneId {
        &self.zone_id
    }

    /// When the encounter was opened.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Current round number. 0 before the first round starts.
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Whether the encounter has been resolved.
    pub const fn is_over(&self) -> bool {
        self.over
    }

    /// Flag the encounter as resolved.
    pub const fn mark_over(&mut self) {
        self.over = true;
    }

    // -- Queries ---------------------------------------------------------

    /// Every combatant in initiative order, dead ones included.
    pub fn combatants(&self) -> &[Combatant] {
        &self.combatants
    }

    /// Look up one combatant.
    pub fn combatant(&self, id: &str) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id.as_str() == id)
    }

    /// Living combatants in initiative order.
    pub fn living_combatants(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.iter().filter(|c| !c.is_dead())
    }

    /// Whether any NPC is still alive.
    pub fn has_living_npcs(&self) -> bool {
        self.living_combatants().any(|c| !c.is_player())
    }

    /// Whether any player is still alive.
    pub fn has_living_players(&self) -> bool {
        self.living_combatants().any(Combatant::is_player)
    }

    /// This round's queue for `id`. Dead combatants have none.
    pub fn action_queue(&self, id: &str) -> Option<&ActionQueue> {
        self.queues.get(id)
    }

    /// Active conditions on `id`.
    pub fn conditions(&self, id: &str) -> Option<&ActiveSet> {
        self.conditions.get(id)
    }

    /// Whether `id` has `condition_id` active.
    pub fn has_condition(&self, id: &str, condition_id: &str) -> bool {
        self.conditions(id).is_some_and(|set| set.has(condition_id))
    }

    /// Dying stacks on `id`, or 0.
    pub fn dying_stacks(&self, id: &str) -> u32 {
        self.conditions(id).map_or(0, |set| set.stacks(DYING))
    }

    /// Where the encounter stands. Decided as a defeat when both sides
    /// are wiped out at once.
    pub fn outcome(&self) -> CombatOutcome {
        if !self.has_living_players() {
            CombatOutcome::Defeat
        } else if !self.has_living_npcs() {
            CombatOutcome::Victory
        } else {
            CombatOutcome::Ongoing
        }
    }

    /// Whether every living combatant has finished committing actions.
    pub fn all_actions_submitted(&self) -> bool {
        self.living_combatants().all(|c| {
            self.queues
                .get(c.id.as_str())
                .is_some_and(ActionQueue::is_submitted)
        })
    }

    // -- Conditions ------------------------------------------------------

    /// Apply `stacks` of `condition_id` to `id`.
    pub fn apply_condition(
        &mut self,
        id: &str,
        condition_id: &str,
        stacks: u32,
        duration: Option<u32>,
    ) -> Result<(), CombatError> {
        let def = self
            .condition_registry
            .get(condition_id)
            .ok_or_else(|| CombatError::UnknownCondition(condition_id.to_owned()))?;
        let set = self
            .conditions
            .get_mut(id)
            .ok_or_else(|| CombatError::UnknownCombatant(CombatantId::new(id)))?;
        set.apply(def, stacks, duration);
        debug!(room = %self.room_id, combatant = id, condition = condition_id, stacks, "Condition applied");
        Ok(())
    }

    /// Remove `condition_id` from `id`. No-op when it is not active.
    pub fn remove_condition(&mut self, id: &str, condition_id: &str) -> Result<(), CombatError> {
        let set = self
            .conditions
            .get_mut(id)
            .ok_or_else(|| CombatError::UnknownCombatant(CombatantId::new(id)))?;
        set.remove(condition_id);
        Ok(())
    }

    // -- Round lifecycle -------------------------------------------------

    /// Open the next round.
    ///
    /// Ticks every living combatant's conditions, runs the dying recovery
    /// check, then gives every living combatant a fresh queue of
    /// `actions_per_round` minus their stunned stacks. Returns the
    /// condition changes in initiative order.
    pub fn start_round(
        &mut self,
        actions_per_round: u32,
        rng: &mut dyn RandomSource,
    ) -> Vec<ConditionEvent> {
        self.round = self.round.saturating_add(1);
        let mut events = Vec::new();

        for combatant in &mut self.combatants {
            if combatant.is_dead() {
                continue;
            }
            let set = self.conditions.entry(combatant.id.clone()).or_default();

            for expired in set.tick() {
                let condition_name = self
                    .condition_registry
                    .get(&expired)
                    .map_or_else(|| expired.clone(), |d| d.name.clone());
                events.push(ConditionEvent {
                    combatant_id: combatant.id.clone(),
                    combatant_name: combatant.name.clone(),
                    condition_id: expired,
                    condition_name,
                    stacks: 0,
                    change: ConditionChange::Removed,
                });
            }

            events.extend(dying::recovery_check(
                combatant,
                set,
                &self.condition_registry,
                rng,
            ));
        }

        self.queues.clear();
        for combatant in self.combatants.iter().filter(|c| !c.is_dead()) {
            let reduction = self
                .conditions
                .get(combatant.id.as_str())
                .map_or(0, ActiveSet::stunned_ap_reduction);
            let budget = actions_per_round.saturating_sub(reduction);
            self.queues.insert(
                combatant.id.clone(),
                ActionQueue::new(combatant.id.clone(), budget),
            );
        }

        info!(
            room = %self.room_id,
            round = self.round,
            condition_events = events.len(),
            "Round started"
        );
        events
    }

    /// Commit `action` for `id`.
    ///
    /// Fails without change when `id` has no queue this round, when an
    /// active condition restricts the action kind, or when the queue
    /// rejects it.
    pub fn queue_action(&mut self, id: &str, action: QueuedAction) -> Result<(), CombatError> {
        if !self.queues.contains_key(id) {
            return Err(CombatError::UnknownCombatant(CombatantId::new(id)));
        }
        if let Some(blocking) = self
            .conditions
            .get(id)
            .and_then(|set| set.restriction_for(action.kind))
        {
            return Err(CombatError::ActionRestricted {
                combatant: CombatantId::new(id),
                action: action.kind,
                condition: blocking.def.id.clone(),
            });
        }
        let queue = self
            .queues
            .get_mut(id)
            .ok_or_else(|| CombatError::UnknownCombatant(CombatantId::new(id)))?;
        let kind = action.kind;
        queue.enqueue(action)?;
        debug!(
            room = %self.room_id,
            combatant = id,
            action = %kind,
            remaining = queue.remaining_points(),
            "Action queued"
        );
        Ok(())
    }

    /// Resolve every committed action. See [`round::resolve_round`].
    pub fn resolve_round(
        &mut self,
        rng: &mut dyn RandomSource,
        on_damage: &mut dyn FnMut(&CombatantId, u32),
    ) -> Vec<RoundEvent> {
        round::resolve_round(self, rng, on_damage)
    }

    // -- Turn cursor -----------------------------------------------------

    /// The combatant whose turn it is, skipping the dead. `None` when
    /// everyone is dead.
    pub fn current_turn(&mut self) -> Option<&Combatant> {
        for _ in 0..self.combatants.len() {
            let living = self
                .combatants
                .get(self.turn_index)
                .is_some_and(|c| !c.is_dead());
            if living {
                return self.combatants.get(self.turn_index);
            }
            self.advance_turn();
        }
        None
    }

    /// Move the cursor to the next combatant, wrapping around.
    pub fn advance_turn(&mut self) {
        let len = self.combatants.len();
        self.turn_index = self
            .turn_index
            .saturating_add(1)
            .checked_rem(len)
            .unwrap_or(0);
    }
}

impl core::fmt::Debug for Combat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Combat")
            .field("room_id", &self.room_id)
            .field("encounter_id", &self.encounter_id)
            .field("zone_id", &self.zone_id)
            .field("round", &self.round)
            .field("over", &self.over)
            .field("combatants", &self.combatants)
            .finish_non_exhaustive()
    }
}
