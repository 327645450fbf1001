//! Headless encounter simulator for the Skirmish combat engine.
//!
//! Runs one configured encounter with every combatant on autopilot and
//! logs the event stream until the fight is decided.
//!
//! # Startup Sequence
//!
//! 1. Load configuration (first argument, else `skirmish.yaml`, else defaults)
//! 2. Initialize structured logging (tracing)
//! 3. Load condition, weapon and explosive content
//! 4. Build the roster and the encounter
//! 5. Run rounds on the configured deadline until the outcome is decided
//!    or `round.max_rounds` is exceeded

mod observer;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use skirmish_combat::{CombatOutcome, EncounterParams};
use skirmish_core::config::LoggingConfig;
use skirmish_core::{EncounterDriver, LogFormat, SkirmishConfig, Tactics};
use skirmish_dice::{RandomSource, RngSource};
use skirmish_types::{ConditionEvent, RoundEvent};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::observer::{ChannelObserver, SimEvent};

const DEFAULT_CONFIG: &str = "skirmish.yaml";

/// Application entry point for the simulator.
///
/// # Errors
///
/// Returns an error if configuration or content cannot be loaded, or the
/// encounter cannot be started.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;
    config.validate()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        actions_per_round = config.round.actions_per_round,
        round_duration_ms = config.round.duration_ms,
        max_rounds = config.round.max_rounds,
        "skirmish-sim starting"
    );

    // 3. Load content.
    let conditions = Arc::new(config.content.load_conditions()?);
    let inventory = Arc::new(config.content.load_inventory()?);
    info!(conditions = conditions.len(), "Content loaded");

    // 4. Build the encounter.
    let sim = &config.simulation;
    let combatants = sim
        .combatants
        .iter()
        .map(|entry| entry.to_combatant(&inventory))
        .collect::<Result<Vec<_>, _>>()?;
    let mut params = EncounterParams::new(sim.room.as_str(), combatants)
        .with_conditions(conditions)
        .with_inventory(inventory);
    if let Some(zone) = &sim.zone {
        params = params.with_zone(zone.as_str());
    }

    let rng: Box<dyn RandomSource> = match sim.seed {
        Some(seed) => {
            info!(seed, "Using fixed seed");
            Box::new(RngSource::seeded(seed))
        }
        None => Box::new(RngSource::from_os_rng()),
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let driver = EncounterDriver::new(
        config.round,
        rng,
        Tactics::everyone(),
        Arc::new(ChannelObserver::new(tx)),
    )?;
    let handle = driver.begin(params)?;
    {
        let combat = handle
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        for c in combat.combatants() {
            info!(
                combatant = %c.id,
                name = c.name,
                allegiance = ?c.allegiance,
                hp = c.current_hp,
                initiative = c.initiative,
                "Combatant ready"
            );
        }
    }

    // 5. Run until decided.
    let max_rounds = config.round.max_rounds;
    let outcome = loop {
        let Some(event) = rx.recv().await else {
            break None;
        };
        match event {
            SimEvent::RoundStarted { round, events } => {
                if max_rounds > 0 && round > max_rounds {
                    warn!(max_rounds, "Round limit reached, stopping");
                    driver.abort(sim.room.as_str());
                    break None;
                }
                info!(round, "Round started");
                log_conditions(&events);
            }
            SimEvent::RoundResolved { round, events } => {
                log_round(round, &events);
            }
            SimEvent::Damage { combatant, hp } => {
                info!(combatant = %combatant, hp, "Damage taken");
            }
            SimEvent::Ended(outcome) => break Some(outcome),
        }
    };

    match outcome {
        Some(CombatOutcome::Victory) => info!("Encounter won"),
        Some(CombatOutcome::Defeat) => info!("Encounter lost"),
        Some(CombatOutcome::Ongoing) | None => info!("Encounter stopped undecided"),
    }
    Ok(())
}

/// Read the config named on the command line, or `skirmish.yaml` when it
/// exists, or fall back to defaults.
fn load_config() -> Result<SkirmishConfig, Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        return Ok(SkirmishConfig::from_file(&PathBuf::from(arg))?);
    }
    let default_path = Path::new(DEFAULT_CONFIG);
    if default_path.exists() {
        return Ok(SkirmishConfig::from_file(default_path)?);
    }
    let mut config = SkirmishConfig::default();
    config.content.apply_env_overrides();
    Ok(config)
}

fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    match logging.format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

fn log_conditions(events: &[ConditionEvent]) {
    for e in events {
        info!(
            combatant = %e.combatant_id,
            condition = e.condition_name,
            stacks = e.stacks,
            change = ?e.change,
            "Condition changed"
        );
    }
}

fn log_round(round: u32, events: &[RoundEvent]) {
    for e in events {
        match &e.attack {
            Some(attack) => info!(
                round,
                actor = %e.actor_id,
                action = %e.action,
                roll = attack.attack_roll,
                total = attack.attack_total,
                outcome = %attack.outcome,
                "{}",
                e.narrative
            ),
            None => info!(round, actor = %e.actor_id, action = %e.action, "{}", e.narrative),
        }
    }
}
