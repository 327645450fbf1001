//! The round loop.
//!
//! [`EncounterDriver`] ties the registry, the round deadline and the
//! rules together. A round closes either when every living combatant has
//! submitted or when its deadline passes, whichever comes first; the
//! other trigger then finds the round already resolved and does nothing.
//!
//! Lock order is encounter, then randomness, then timers. Observer
//! callbacks run after every lock is released.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use skirmish_combat::{
    Combat, CombatOutcome, Combatant, EncounterParams, QueuedAction, roll_initiative,
};
use skirmish_content::Magazine;
use skirmish_dice::RandomSource;
use skirmish_types::{CombatantId, ConditionEvent, RoomId, RoundEvent};
use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::config::RoundConfig;
use crate::engine::{CombatHandle, Engine};
use crate::error::EngineError;
use crate::timer::RoundTimer;

// ---------------------------------------------------------------------------
// Observer
// ---------------------------------------------------------------------------

/// Receives everything that happens in the encounters a driver runs.
///
/// All methods default to doing nothing.
pub trait EncounterObserver: Send + Sync {
    /// A round opened; `events` are the condition changes from its start.
    fn on_round_started(&self, _room: &RoomId, _round: u32, _events: &[ConditionEvent]) {}

    /// A round resolved.
    fn on_round_resolved(&self, _room: &RoomId, _round: u32, _events: &[RoundEvent]) {}

    /// A combatant took damage and is now at `hp`.
    fn on_damage(&self, _room: &RoomId, _combatant: &CombatantId, _hp: u32) {}

    /// The encounter was decided and removed from the registry.
    fn on_encounter_ended(&self, _room: &RoomId, _outcome: CombatOutcome) {}
}

/// An observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl EncounterObserver for NoOpObserver {}

// ---------------------------------------------------------------------------
// Tactics
// ---------------------------------------------------------------------------

/// Action selection for combatants nobody is steering.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tactics {
    /// Also steer player combatants.
    pub control_players: bool,
}

impl Tactics {
    /// Steer NPCs only.
    pub const fn npcs_only() -> Self {
        Self {
            control_players: false,
        }
    }

    /// Steer everyone.
    pub const fn everyone() -> Self {
        Self {
            control_players: true,
        }
    }

    /// Whether this policy picks actions for `combatant`.
    pub const fn controls(self, combatant: &Combatant) -> bool {
        self.control_players || !combatant.is_player()
    }

    /// The action `actor` takes this round.
    ///
    /// Targets the first opponent in initiative order that is still on its
    /// feet. Firearm users reload an empty magazine before anything else.
    pub fn choose(combat: &Combat, actor: &Combatant) -> QueuedAction {
        if actor.current_hp == 0 {
            return QueuedAction::pass();
        }
        let Some(target) = first_standing_opponent(combat, actor) else {
            return QueuedAction::pass();
        };

        let firearm = actor
            .loadout
            .main_hand
            .as_ref()
            .filter(|equipped| equipped.def.is_firearm());
        if let Some(equipped) = firearm {
            if equipped.magazine.as_ref().is_some_and(Magazine::is_empty) {
                return QueuedAction::reload();
            }
            if equipped.def.supports_burst() {
                return QueuedAction::burst(target.id.as_str()).with_weapon(equipped.def.id.as_str());
            }
        }
        QueuedAction::strike(target.name.as_str())
    }

    /// Queue a full round for every living combatant this policy controls.
    ///
    /// A choice the queue rejects falls back to a single attack on the same
    /// opponent, named the way melee targeting expects. Every controlled
    /// queue is closed with a pass.
    pub fn queue_all(self, combat: &mut Combat) {
        let plans: Vec<(CombatantId, QueuedAction, Option<String>)> = combat
            .living_combatants()
            .filter(|c| self.controls(c))
            .map(|c| {
                let action = Self::choose(combat, c);
                let fallback = (c.current_hp > 0)
                    .then(|| first_standing_opponent(combat, c))
                    .flatten()
                    .map(|target| target.name.clone());
                (c.id.clone(), action, fallback)
            })
            .collect();

        for (id, action, fallback) in plans {
            if let Err(e) = combat.queue_action(id.as_str(), action) {
                debug!(combatant = %id, error = %e, "Planned action rejected");
                let retry = fallback.map(|target| {
                    combat.queue_action(id.as_str(), QueuedAction::attack(target))
                });
                if let Some(Err(e)) = retry {
                    debug!(combatant = %id, error = %e, "Fallback attack rejected");
                }
            }
            if let Err(e) = combat.queue_action(id.as_str(), QueuedAction::pass()) {
                debug!(combatant = %id, error = %e, "Pass rejected");
            }
        }
    }
}

/// First opponent of `actor` in initiative order with hit points left.
fn first_standing_opponent<'a>(combat: &'a Combat, actor: &Combatant) -> Option<&'a Combatant> {
    combat
        .living_combatants()
        .find(|c| c.allegiance != actor.allegiance && c.current_hp > 0)
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// What a resolution left behind once the encounter lock is released.
enum Aftermath {
    Ended(CombatOutcome),
    NextRound(u32, Vec<ConditionEvent>),
}

struct DriverInner {
    engine: Engine,
    timers: Mutex<HashMap<RoomId, RoundTimer>>,
    rng: Mutex<Box<dyn RandomSource>>,
    tactics: Tactics,
    observer: Arc<dyn EncounterObserver>,
    round: RoundConfig,
    runtime: Handle,
}

/// Runs encounters round by round. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct EncounterDriver {
    inner: Arc<DriverInner>,
}

impl EncounterDriver {
    /// A driver on the current tokio runtime.
    pub fn new(
        round: RoundConfig,
        rng: Box<dyn RandomSource>,
        tactics: Tactics,
        observer: Arc<dyn EncounterObserver>,
    ) -> Result<Self, EngineError> {
        let runtime = Handle::try_current().map_err(|e| EngineError::NoRuntime {
            reason: e.to_string(),
        })?;
        Ok(Self {
            inner: Arc::new(DriverInner {
                engine: Engine::new(),
                timers: Mutex::new(HashMap::new()),
                rng: Mutex::new(rng),
                tactics,
                observer,
                round,
                runtime,
            }),
        })
    }

    /// The registry of encounters this driver runs.
    pub fn engine(&self) -> &Engine {
        &self.inner.engine
    }

    /// Roll initiative, open the encounter and start round 1.
    pub fn begin(&self, mut params: EncounterParams) -> Result<CombatHandle, EngineError> {
        let inner = &self.inner;
        let room = params.room_id.clone();
        if inner.engine.get_combat(room.as_str()).is_some() {
            return Err(EngineError::AlreadyActive(room));
        }

        {
            let mut rng = inner.rng.lock().unwrap_or_else(PoisonError::into_inner);
            roll_initiative(&mut params.combatants, &mut **rng);
        }
        let handle = inner.engine.start_combat(params)?;

        let (round, events) = {
            let mut combat = handle.lock().unwrap_or_else(PoisonError::into_inner);
            let mut rng = inner.rng.lock().unwrap_or_else(PoisonError::into_inner);
            let events = combat.start_round(inner.round.actions_per_round, &mut **rng);
            inner.tactics.queue_all(&mut combat);
            (combat.round(), events)
        };

        self.arm(&room, round);
        info!(room = %room, "Encounter begun");
        inner.observer.on_round_started(&room, round, &events);
        Ok(handle)
    }

    /// Commit an action. Resolves the round at once when it was the last
    /// submission outstanding.
    pub fn submit(
        &self,
        room: &str,
        combatant: &str,
        action: QueuedAction,
    ) -> Result<(), EngineError> {
        let handle = self
            .inner
            .engine
            .get_combat(room)
            .ok_or_else(|| EngineError::NotFound(RoomId::new(room)))?;

        let ready = {
            let mut combat = handle.lock().unwrap_or_else(PoisonError::into_inner);
            combat.queue_action(combatant, action)?;
            combat.all_actions_submitted().then_some(combat.round())
        };

        if let Some(round) = ready {
            debug!(room, round, "All actions submitted");
            self.resolve(room, round);
        }
        Ok(())
    }

    /// Resolve `round` in `room` and move the encounter on.
    ///
    /// Does nothing when the encounter is gone, over, or already past
    /// `round`.
    pub fn resolve(&self, room: &str, round: u32) {
        let inner = &self.inner;
        let Some(handle) = inner.engine.get_combat(room) else {
            debug!(room, round, "Resolution for a finished encounter ignored");
            return;
        };

        let mut damage: Vec<(CombatantId, u32)> = Vec::new();
        let (events, aftermath) = {
            let mut combat = handle.lock().unwrap_or_else(PoisonError::into_inner);
            if combat.is_over() || combat.round() != round {
                debug!(room, round, current = combat.round(), "Stale resolution ignored");
                return;
            }
            let mut rng = inner.rng.lock().unwrap_or_else(PoisonError::into_inner);
            let events = combat.resolve_round(&mut **rng, &mut |id, hp| {
                damage.push((id.clone(), hp));
            });

            let aftermath = match combat.outcome() {
                CombatOutcome::Ongoing => {
                    let started = combat.start_round(inner.round.actions_per_round, &mut **rng);
                    match combat.outcome() {
                        CombatOutcome::Ongoing => {
                            inner.tactics.queue_all(&mut combat);
                            Aftermath::NextRound(combat.round(), started)
                        }
                        decided => {
                            combat.mark_over();
                            Aftermath::Ended(decided)
                        }
                    }
                }
                decided => {
                    combat.mark_over();
                    Aftermath::Ended(decided)
                }
            };
            (events, aftermath)
        };

        let room_id = RoomId::new(room);
        for (id, hp) in &damage {
            inner.observer.on_damage(&room_id, id, *hp);
        }
        inner.observer.on_round_resolved(&room_id, round, &events);

        match aftermath {
            Aftermath::Ended(outcome) => {
                self.disarm(room);
                inner.engine.end_combat(room);
                info!(room, round, outcome = ?outcome, "Encounter decided");
                inner.observer.on_encounter_ended(&room_id, outcome);
            }
            Aftermath::NextRound(next, started) => {
                self.arm(&room_id, next);
                inner.observer.on_round_started(&room_id, next, &started);
            }
        }
    }

    /// Stop the encounter in `room` without deciding it.
    ///
    /// Returns whether there was one.
    pub fn abort(&self, room: &str) -> bool {
        self.disarm(room);
        let Some(handle) = self.inner.engine.end_combat(room) else {
            return false;
        };
        handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .mark_over();
        info!(room, "Encounter aborted");
        true
    }

    /// Arm (or re-arm) the deadline for `round` in `room`.
    fn arm(&self, room: &RoomId, round: u32) {
        let weak: Weak<DriverInner> = Arc::downgrade(&self.inner);
        let target = room.clone();
        let on_fire = move || {
            if let Some(inner) = weak.upgrade() {
                debug!(room = %target, round, "Round deadline passed");
                EncounterDriver { inner }.resolve(target.as_str(), round);
            }
        };

        let mut timers = self
            .inner
            .timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let timer = timers
            .entry(room.clone())
            .or_insert_with(|| RoundTimer::with_runtime(self.inner.runtime.clone()));
        timer.reset(self.inner.round.duration(), on_fire);
    }

    fn disarm(&self, room: &str) {
        let removed = self
            .inner
            .timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(room);
        if let Some(timer) = removed {
            timer.stop();
        }
    }
}

impl core::fmt::Debug for EncounterDriver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EncounterDriver")
            .field("engine", &self.inner.engine)
            .field("tactics", &self.inner.tactics)
            .field("round", &self.inner.round)
            .finish_non_exhaustive()
    }
}
