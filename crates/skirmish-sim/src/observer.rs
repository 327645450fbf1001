//! Observer that forwards encounter activity to the simulator's main loop.

use skirmish_combat::CombatOutcome;
use skirmish_core::EncounterObserver;
use skirmish_types::{CombatantId, ConditionEvent, RoomId, RoundEvent};
use tokio::sync::mpsc;
use tracing::debug;

/// Something that happened in the simulated encounter.
#[derive(Debug, Clone)]
pub enum SimEvent {
    /// A round opened.
    RoundStarted {
        /// Round number.
        round: u32,
        /// Condition changes from the round start.
        events: Vec<ConditionEvent>,
    },
    /// A round resolved.
    RoundResolved {
        /// Round number.
        round: u32,
        /// What every combatant did.
        events: Vec<RoundEvent>,
    },
    /// A combatant took damage.
    Damage {
        /// Who was hit.
        combatant: CombatantId,
        /// Remaining hit points.
        hp: u32,
    },
    /// The encounter was decided.
    Ended(CombatOutcome),
}

/// Bridges driver callbacks onto an unbounded channel.
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<SimEvent>,
}

impl ChannelObserver {
    /// Create an observer sending to `tx`.
    pub const fn new(tx: mpsc::UnboundedSender<SimEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, event: SimEvent) {
        if self.tx.send(event).is_err() {
            debug!("Simulator loop gone, event dropped");
        }
    }
}

impl EncounterObserver for ChannelObserver {
    fn on_round_started(&self, _room: &RoomId, round: u32, events: &[ConditionEvent]) {
        self.send(SimEvent::RoundStarted {
            round,
            events: events.to_vec(),
        });
    }

    fn on_round_resolved(&self, _room: &RoomId, round: u32, events: &[RoundEvent]) {
        self.send(SimEvent::RoundResolved {
            round,
            events: events.to_vec(),
        });
    }

    fn on_damage(&self, _room: &RoomId, combatant: &CombatantId, hp: u32) {
        self.send(SimEvent::Damage {
            combatant: combatant.clone(),
            hp,
        });
    }

    fn on_encounter_ended(&self, _room: &RoomId, outcome: CombatOutcome) {
        self.send(SimEvent::Ended(outcome));
    }
}
