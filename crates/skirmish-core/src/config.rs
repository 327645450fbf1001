//! Configuration loading and typed config structures for Skirmish.
//!
//! The configuration lives in a YAML file (`skirmish.yaml` by default).
//! Every section is optional; missing fields fall back to the defaults
//! documented on each struct. Content directories can be redirected with
//! the `SKIRMISH_CONTENT_DIR` environment variable.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use skirmish_combat::Combatant;
use skirmish_content::{ConditionRegistry, ContentError, InventoryRegistry, Loadout};
use skirmish_types::Allegiance;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A content directory named by the config could not be loaded.
    #[error("failed to load content: {source}")]
    Content {
        /// The underlying content error.
        #[from]
        source: ContentError,
    },

    /// The configuration parsed but describes an unusable setup.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

// ---------------------------------------------------------------------------
// Top level
// ---------------------------------------------------------------------------

/// Top-level Skirmish configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SkirmishConfig {
    /// Round pacing.
    #[serde(default)]
    pub round: RoundConfig,

    /// Content directories.
    #[serde(default)]
    pub content: ContentConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// The encounter the simulator runs.
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl SkirmishConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.content.apply_env_overrides();
        Ok(config)
    }

    /// Reject settings the round loop cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.round.actions_per_round == 0 {
            return Err(ConfigError::Invalid {
                reason: "round.actions_per_round must be at least 1".to_owned(),
            });
        }
        if self.round.duration_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: "round.duration_ms must be at least 1".to_owned(),
            });
        }
        if self.simulation.combatants.len() < 2 {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "simulation.combatants needs at least 2 entries, found {}",
                    self.simulation.combatants.len()
                ),
            });
        }
        let mut seen = BTreeSet::new();
        for entry in &self.simulation.combatants {
            if !seen.insert(entry.id.as_str()) {
                return Err(ConfigError::Invalid {
                    reason: format!("duplicate combatant id {}", entry.id),
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Round
// ---------------------------------------------------------------------------

/// Round pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RoundConfig {
    /// Action points each combatant receives per round. Default 3.
    #[serde(default = "default_actions_per_round")]
    pub actions_per_round: u32,

    /// Time players have to submit before the round resolves anyway.
    /// Default 6000 ms.
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,

    /// Simulator safety cap on rounds; 0 means unlimited.
    #[serde(default)]
    pub max_rounds: u32,
}

impl RoundConfig {
    /// The round deadline as a [`Duration`].
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            actions_per_round: default_actions_per_round(),
            duration_ms: default_duration_ms(),
            max_rounds: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// Where condition, weapon and explosive definitions are read from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContentConfig {
    /// Directory of condition YAML files, layered over the built-ins.
    #[serde(default)]
    pub conditions_dir: Option<PathBuf>,

    /// Directory of weapon YAML files.
    #[serde(default)]
    pub weapons_dir: Option<PathBuf>,

    /// Directory of explosive YAML files.
    #[serde(default)]
    pub explosives_dir: Option<PathBuf>,
}

impl ContentConfig {
    /// Redirect every content directory under `SKIRMISH_CONTENT_DIR`.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(root) = std::env::var("SKIRMISH_CONTENT_DIR") {
            self.set_root(Path::new(&root));
        }
    }

    /// Point all three directories at the standard layout under `root`.
    pub fn set_root(&mut self, root: &Path) {
        self.conditions_dir = Some(root.join("conditions"));
        self.weapons_dir = Some(root.join("weapons"));
        self.explosives_dir = Some(root.join("explosives"));
    }

    /// The built-in conditions, overlaid with any from `conditions_dir`.
    ///
    /// A definition in the directory replaces the built-in with the same id.
    pub fn load_conditions(&self) -> Result<ConditionRegistry, ConfigError> {
        let mut registry = ConditionRegistry::core();
        if let Some(dir) = &self.conditions_dir {
            let loaded = ConditionRegistry::load_dir(dir)?;
            for def in loaded.all() {
                registry.register(def.clone());
            }
        }
        Ok(registry)
    }

    /// Weapons and explosives from the configured directories.
    pub fn load_inventory(&self) -> Result<InventoryRegistry, ConfigError> {
        Ok(InventoryRegistry::load_dirs(
            self.weapons_dir.as_deref(),
            self.explosives_dir.as_deref(),
        )?)
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`. Default `info`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format. Default `pretty`.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// The encounter the simulator runs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Fixed seed for reproducible runs. Random when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Scripting hook zone. Defaults to the room id.
    #[serde(default)]
    pub zone: Option<String>,

    /// Room the encounter takes place in. Default `arena`.
    #[serde(default = "default_room")]
    pub room: String,

    /// Everyone in the fight. Defaults to two players against two goblins.
    #[serde(default = "default_roster")]
    pub combatants: Vec<RosterEntry>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            zone: None,
            room: default_room(),
            combatants: default_roster(),
        }
    }
}

/// One combatant in the configured roster.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterEntry {
    /// Unique id within the encounter.
    pub id: String,
    /// Display name, also used for attack targeting.
    pub name: String,
    /// Side.
    pub allegiance: Allegiance,
    /// Maximum (and starting) hit points.
    pub hp: u32,
    /// Armor class.
    pub ac: i32,
    /// Level. Default 1.
    #[serde(default = "default_level")]
    pub level: u32,
    /// Strength modifier.
    #[serde(default)]
    pub str_mod: i32,
    /// Dexterity modifier.
    #[serde(default)]
    pub dex_mod: i32,
    /// Weapon id to equip in the main hand.
    #[serde(default)]
    pub weapon: Option<String>,
}

impl RosterEntry {
    /// Build the combatant, equipping its weapon from `inventory`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the weapon id is not registered.
    pub fn to_combatant(&self, inventory: &InventoryRegistry) -> Result<Combatant, ConfigError> {
        let mut combatant =
            Combatant::new(self.id.as_str(), self.name.as_str(), self.allegiance, self.hp, self.ac)
                .with_level(self.level)
                .with_modifiers(self.str_mod, self.dex_mod);
        if let Some(weapon_id) = &self.weapon {
            let def = inventory
                .weapon(weapon_id)
                .ok_or_else(|| ConfigError::Invalid {
                    reason: format!("combatant {} wields unknown weapon {weapon_id}", self.id),
                })?;
            combatant = combatant.with_loadout(Loadout::with_main_hand(Arc::clone(def))?);
        }
        Ok(combatant)
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_actions_per_round() -> u32 {
    3
}

const fn default_duration_ms() -> u64 {
    6000
}

const fn default_level() -> u32 {
    1
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_room() -> String {
    "arena".to_owned()
}

fn default_roster() -> Vec<RosterEntry> {
    let entry = |id: &str, name: &str, allegiance, hp, ac, str_mod| RosterEntry {
        id: id.to_owned(),
        name: name.to_owned(),
        allegiance,
        hp,
        ac,
        level: 1,
        str_mod,
        dex_mod: 1,
        weapon: None,
    };
    vec![
        entry("p1", "Aldric", Allegiance::Player, 20, 15, 3),
        entry("p2", "Mira", Allegiance::Player, 16, 14, 2),
        entry("g1", "Goblin Cutter", Allegiance::Npc, 8, 13, 1),
        entry("g2", "Goblin Sneak", Allegiance::Npc, 8, 13, 1),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SkirmishConfig::default();
        assert_eq!(config.round.actions_per_round, 3);
        assert_eq!(config.round.duration(), Duration::from_millis(6000));
        assert_eq!(config.round.max_rounds, 0);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.simulation.room, "arena");
        assert_eq!(config.simulation.combatants.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
round:
  actions_per_round: 2
  duration_ms: 1500
  max_rounds: 20

logging:
  level: debug
  format: json

simulation:
  seed: 7
  zone: sewers
  room: sewer-3
  combatants:
    - id: p1
      name: Vex
      allegiance: player
      hp: 18
      ac: 16
      level: 5
      dex_mod: 4
    - id: r1
      name: Rat King
      allegiance: npc
      hp: 30
      ac: 12
      str_mod: 2
";
        let config = SkirmishConfig::parse(yaml).unwrap();
        assert_eq!(config.round.actions_per_round, 2);
        assert_eq!(config.round.duration_ms, 1500);
        assert_eq!(config.round.max_rounds, 20);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.simulation.zone.as_deref(), Some("sewers"));

        let vex = config.simulation.combatants.first().unwrap();
        assert_eq!(vex.allegiance, Allegiance::Player);
        assert_eq!(vex.level, 5);
        assert_eq!(vex.str_mod, 0);
        assert_eq!(vex.dex_mod, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_partial_yaml_uses_defaults() {
        let config = SkirmishConfig::parse("round:\n  duration_ms: 250\n").unwrap();
        assert_eq!(config.round.duration_ms, 250);
        assert_eq!(config.round.actions_per_round, 3);
        assert_eq!(config.simulation.combatants.len(), 4);
    }

    #[test]
    fn parse_invalid_yaml_returns_error() {
        let result = SkirmishConfig::parse("round: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn validate_rejects_unusable_settings() {
        let mut config = SkirmishConfig::default();
        config.round.actions_per_round = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));

        let mut config = SkirmishConfig::default();
        config.round.duration_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));

        let mut config = SkirmishConfig::default();
        config.simulation.combatants.truncate(1);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn validate_rejects_duplicate_ids() {
        let mut config = SkirmishConfig::default();
        assert!(config.validate().is_ok());
        let twin = config.simulation.combatants.first().unwrap().clone();
        config.simulation.combatants.push(twin);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate combatant id p1"));
    }

    #[test]
    fn from_file_reads_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skirmish.yaml");
        std::fs::write(&path, "simulation:\n  room: pit\n").unwrap();
        let config = SkirmishConfig::from_file(&path).unwrap();
        assert_eq!(config.simulation.room, "pit");
    }

    #[test]
    fn from_file_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = SkirmishConfig::from_file(&dir.path().join("absent.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn set_root_points_at_standard_layout() {
        let mut content = ContentConfig::default();
        content.set_root(Path::new("/srv/skirmish"));
        assert_eq!(
            content.conditions_dir.as_deref(),
            Some(Path::new("/srv/skirmish/conditions"))
        );
        assert_eq!(
            content.weapons_dir.as_deref(),
            Some(Path::new("/srv/skirmish/weapons"))
        );
        assert_eq!(
            content.explosives_dir.as_deref(),
            Some(Path::new("/srv/skirmish/explosives"))
        );
    }

    #[test]
    fn conditions_dir_overlays_core() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("prone.yaml"),
            "id: prone\nname: Knocked Down\nduration_type: until_save\nac_penalty: 4\n",
        )
        .unwrap();
        let content = ContentConfig {
            conditions_dir: Some(dir.path().to_path_buf()),
            ..ContentConfig::default()
        };
        let registry = content.load_conditions().unwrap();
        assert_eq!(registry.len(), ConditionRegistry::core().len());
        assert_eq!(registry.get("prone").unwrap().name, "Knocked Down");
        assert!(registry.get("dying").is_some());
    }

    #[test]
    fn roster_entry_without_weapon_builds() {
        let config = SkirmishConfig::default();
        let inventory = InventoryRegistry::new();
        let entry = config.simulation.combatants.first().unwrap();
        let combatant = entry.to_combatant(&inventory).unwrap();
        assert_eq!(combatant.id.as_str(), "p1");
        assert_eq!(combatant.current_hp, 20);
        assert_eq!(combatant.str_mod, 3);
        assert!(combatant.loadout.main_hand.is_none());
    }

    #[test]
    fn roster_entry_with_unknown_weapon_fails() {
        let mut entry = SkirmishConfig::default()
            .simulation
            .combatants
            .first()
            .unwrap()
            .clone();
        entry.weapon = Some("railgun".to_owned());
        let result = entry.to_combatant(&InventoryRegistry::new());
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }
}
