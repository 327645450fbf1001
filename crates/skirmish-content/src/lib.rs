//! Content definitions for the Skirmish combat engine.
//!
//! Everything in this crate is read-only once loaded: condition
//! definitions, weapon and explosive definitions, and the registries that
//! index them. Loadouts and magazines are the exception, since they track
//! per-combatant ammunition during a fight.
//!
//! # Modules
//!
//! - [`condition`] -- Condition definitions, well-known ids, the condition registry
//! - [`weapon`] -- Weapon definitions and firing modes
//! - [`explosive`] -- Explosive definitions
//! - [`magazine`] -- Firearm ammunition
//! - [`loadout`] -- Equipped weapons
//! - [`registry`] -- Weapon and explosive registry
//! - [`loader`] -- YAML directory loader
//! - [`error`] -- Load and validation errors

pub mod condition;
pub mod error;
pub mod explosive;
pub mod loader;
pub mod loadout;
pub mod magazine;
pub mod registry;
pub mod weapon;

pub use condition::{ConditionDef, ConditionRegistry, DurationType};
pub use error::ContentError;
pub use explosive::{AreaType, ExplosiveDef, FuseType};
pub use loader::load_yaml_dir;
pub use loadout::{EquippedWeapon, Loadout};
pub use magazine::Magazine;
pub use registry::InventoryRegistry;
pub use weapon::{FiringMode, WeaponDef};
