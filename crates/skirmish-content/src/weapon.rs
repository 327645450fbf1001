//! Weapon definitions.

use serde::{Deserialize, Serialize};

use crate::error::ContentError;

/// How a ranged weapon can be fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FiringMode {
    /// One round per action.
    Single,
    /// A short burst per action.
    Burst,
    /// Sustained fire across several targets.
    Automatic,
}

/// Static properties of a weapon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponDef {
    /// Unique weapon id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Damage dice expression, e.g. `2d6`.
    pub damage_dice: String,
    /// Damage type label, e.g. `piercing`.
    pub damage_type: String,
    /// Range increment in feet. Zero means melee.
    #[serde(default)]
    pub range_increment: u32,
    /// Actions needed to reload. Zero for weapons without magazines.
    #[serde(default)]
    pub reload_actions: u32,
    /// Rounds per magazine. Required for firearms.
    #[serde(default)]
    pub magazine_capacity: u32,
    /// Supported firing modes. Any mode makes this a firearm.
    #[serde(default)]
    pub firing_modes: Vec<FiringMode>,
    /// Free-form trait tags.
    #[serde(default)]
    pub traits: Vec<String>,
}

impl WeaponDef {
    /// Whether this is a melee weapon.
    pub const fn is_melee(&self) -> bool {
        self.range_increment == 0
    }

    /// Whether this is a firearm.
    pub fn is_firearm(&self) -> bool {
        !self.firing_modes.is_empty()
    }

    /// Whether burst fire is supported.
    pub fn supports_burst(&self) -> bool {
        self.firing_modes.contains(&FiringMode::Burst)
    }

    /// Whether automatic fire is supported.
    pub fn supports_automatic(&self) -> bool {
        self.firing_modes.contains(&FiringMode::Automatic)
    }

    /// Check every field invariant, reporting all problems at once.
    pub fn validate(&self) -> Result<(), ContentError> {
        let mut problems = Vec::new();
        if self.id.is_empty() {
            problems.push("id must not be empty");
        }
        if self.name.is_empty() {
            problems.push("name must not be empty");
        }
        if self.damage_dice.is_empty() {
            problems.push("damage_dice must not be empty");
        }
        if self.damage_type.is_empty() {
            problems.push("damage_type must not be empty");
        }
        if self.is_firearm() && self.magazine_capacity == 0 {
            problems.push("firearm magazine_capacity must be > 0");
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ContentError::InvalidWeapon {
                id: self.id.clone(),
                problems: problems.join("; "),
            })
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn pistol() -> WeaponDef {
        WeaponDef {
            id: "pistol".to_owned(),
            name: "Service Pistol".to_owned(),
            damage_dice: "1d8".to_owned(),
            damage_type: "piercing".to_owned(),
            range_increment: 30,
            reload_actions: 1,
            magazine_capacity: 15,
            firing_modes: vec![FiringMode::Single, FiringMode::Burst],
            traits: Vec::new(),
        }
    }

    #[test]
    fn firearm_queries() {
        let weapon = pistol();
        assert!(weapon.is_firearm());
        assert!(!weapon.is_melee());
        assert!(weapon.supports_burst());
        assert!(!weapon.supports_automatic());
        assert!(weapon.validate().is_ok());
    }

    #[test]
    fn melee_weapon_has_no_modes() {
        let knife = WeaponDef {
            id: "knife".to_owned(),
            name: "Knife".to_owned(),
            damage_dice: "1d4".to_owned(),
            damage_type: "slashing".to_owned(),
            range_increment: 0,
            reload_actions: 0,
            magazine_capacity: 0,
            firing_modes: Vec::new(),
            traits: vec!["agile".to_owned()],
        };
        assert!(knife.is_melee());
        assert!(!knife.is_firearm());
        assert!(knife.validate().is_ok());
    }

    #[test]
    fn validate_collects_every_problem() {
        let mut weapon = pistol();
        weapon.name.clear();
        weapon.magazine_capacity = 0;
        let err = weapon.validate().err().map(|e| e.to_string()).unwrap_or_default();
        assert!(err.contains("name must not be empty"));
        assert!(err.contains("magazine_capacity"));
    }

    #[test]
    fn parses_from_yaml() {
        let yaml = "id: smg\nname: SMG\ndamage_dice: 1d6\ndamage_type: piercing\nrange_increment: 20\nmagazine_capacity: 30\nfiring_modes: [single, burst, automatic]\n";
        let weapon: Result<WeaponDef, _> = serde_yml::from_str(yaml);
        assert!(weapon.is_ok_and(|w| w.supports_automatic() && w.magazine_capacity == 30));
    }
}
