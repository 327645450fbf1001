//! The encounter registry.
//!
//! One [`Engine`] owns every active encounter, keyed by room. Lookups take
//! a shared read lock so many rooms can fetch their handles at once;
//! starting and ending encounters take the write lock. Each encounter sits
//! behind its own mutex, so rooms never contend on each other's rounds.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use skirmish_combat::{Combat, EncounterParams};
use skirmish_types::RoomId;
use tracing::info;

use crate::error::EngineError;

/// Shared handle to one room's encounter.
pub type CombatHandle = Arc<Mutex<Combat>>;

/// Registry of active encounters.
#[derive(Debug, Default)]
pub struct Engine {
    combats: RwLock<HashMap<RoomId, CombatHandle>>,
}

impl Engine {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an encounter for `params.room_id`.
    ///
    /// Fails with [`EngineError::AlreadyActive`] when the room is busy.
    pub fn start_combat(&self, params: EncounterParams) -> Result<CombatHandle, EngineError> {
        let mut combats = self
            .combats
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if combats.contains_key(&params.room_id) {
            return Err(EngineError::AlreadyActive(params.room_id));
        }
        let room_id = params.room_id.clone();
        let handle = Arc::new(Mutex::new(Combat::new(params)));
        combats.insert(room_id.clone(), Arc::clone(&handle));
        info!(room = %room_id, active = combats.len(), "Combat started");
        Ok(handle)
    }

    /// The encounter in `room`, if any.
    pub fn get_combat(&self, room: &str) -> Option<CombatHandle> {
        self.combats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(room)
            .cloned()
    }

    /// Remove and return the encounter in `room`.
    pub fn end_combat(&self, room: &str) -> Option<CombatHandle> {
        let removed = self
            .combats
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(room);
        if removed.is_some() {
            info!(room, "Combat ended");
        }
        removed
    }

    /// Rooms with an encounter in progress, sorted.
    pub fn active_rooms(&self) -> Vec<RoomId> {
        let mut rooms: Vec<RoomId> = self
            .combats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        rooms.sort();
        rooms
    }

    /// Number of active encounters.
    pub fn len(&self) -> usize {
        self.combats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no encounter is active.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use skirmish_combat::Combatant;
    use skirmish_types::Allegiance;

    use super::*;

    fn params(room: &str) -> EncounterParams {
        EncounterParams::new(
            room,
            vec![
                Combatant::new("p1", "Alice", Allegiance::Player, 20, 14).with_initiative(5),
                Combatant::new("g1", "Goblin", Allegiance::Npc, 8, 12).with_initiative(12),
            ],
        )
    }

    #[test]
    fn start_get_end() {
        let engine = Engine::new();
        assert!(engine.is_empty());

        let handle = engine.start_combat(params("room-1")).unwrap();
        let fetched = engine.get_combat("room-1").unwrap();
        assert!(Arc::ptr_eq(&handle, &fetched));

        let first = fetched.lock().unwrap().combatants().first().unwrap().id.clone();
        assert_eq!(first.as_str(), "g1");

        assert!(engine.end_combat("room-1").is_some());
        assert!(engine.get_combat("room-1").is_none());
        assert!(engine.end_combat("room-1").is_none());
    }

    #[test]
    fn duplicate_room_is_rejected() {
        let engine = Engine::new();
        engine.start_combat(params("room-1")).unwrap();
        let err = engine.start_combat(params("room-1")).unwrap_err();
        assert!(matches!(err, EngineError::AlreadyActive(room) if room.as_str() == "room-1"));
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn rooms_are_independent_across_threads() {
        let engine = Engine::new();
        std::thread::scope(|scope| {
            for i in 0..8 {
                let engine = &engine;
                scope.spawn(move || {
                    let room = format!("room-{i}");
                    engine.start_combat(params(&room)).unwrap();
                    assert!(engine.get_combat(&room).is_some());
                });
            }
        });
        assert_eq!(engine.len(), 8);
        let rooms = engine.active_rooms();
        assert_eq!(rooms.first().unwrap().as_str(), "room-0");
        assert_eq!(rooms.last().unwrap().as_str(), "room-7");
    }
}
