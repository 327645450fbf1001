//! Encounter orchestration for the Skirmish combat engine.
//!
//! Everything here is glue around the pure rules in `skirmish-combat`:
//! a registry that keeps one encounter per room, a deadline that closes a
//! round when players are slow to submit, the YAML configuration, and the
//! driver that runs the round loop.
//!
//! # Modules
//!
//! - [`engine`] -- Registry of active encounters, keyed by room
//! - [`timer`] -- Resettable one-shot round deadline
//! - [`driver`] -- The round loop, NPC tactics and the observer seam
//! - [`config`] -- Typed YAML configuration and content loading
//! - [`error`] -- Registry and driver errors

pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod timer;

pub use config::{ConfigError, LogFormat, RosterEntry, SkirmishConfig};
pub use driver::{EncounterDriver, EncounterObserver, NoOpObserver, Tactics};
pub use engine::{CombatHandle, Engine};
pub use error::EngineError;
pub use timer::RoundTimer;
