//! Explosive definitions.

use serde::{Deserialize, Serialize};

use crate::error::ContentError;

/// Area an explosive affects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaType {
    /// Everyone in the room.
    #[default]
    Room,
    /// Targets within a burst radius.
    Burst,
}

/// When an explosive detonates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuseType {
    /// On use.
    #[default]
    Immediate,
    /// After a delay.
    Delayed,
}

/// Static properties of a throwable explosive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplosiveDef {
    /// Unique explosive id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Damage dice expression, rolled once per detonation.
    pub damage_dice: String,
    /// Damage type label.
    pub damage_type: String,
    /// Area of effect.
    #[serde(default)]
    pub area_type: AreaType,
    /// Save used to resist, e.g. `reflex`.
    pub save_type: String,
    /// Difficulty class of the save.
    pub save_dc: i32,
    /// Detonation timing.
    #[serde(default)]
    pub fuse: FuseType,
    /// Free-form trait tags.
    #[serde(default)]
    pub traits: Vec<String>,
}

impl ExplosiveDef {
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
        if self.save_type.is_empty() {
            problems.push("save_type must not be empty");
        }
        if self.save_dc <= 0 {
            problems.push("save_dc must be > 0");
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ContentError::InvalidExplosive {
                id: self.id.clone(),
                problems: problems.join("; "),
            })
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn frag() -> ExplosiveDef {
        ExplosiveDef {
            id: "frag".to_owned(),
            name: "Frag Grenade".to_owned(),
            damage_dice: "2d6".to_owned(),
            damage_type: "piercing".to_owned(),
            area_type: AreaType::Room,
            save_type: "reflex".to_owned(),
            save_dc: 15,
            fuse: FuseType::Immediate,
            traits: Vec::new(),
        }
    }

    #[test]
    fn valid_explosive_passes() {
        assert!(frag().validate().is_ok());
    }

    #[test]
    fn zero_dc_is_rejected() {
        let mut grenade = frag();
        grenade.save_dc = 0;
        assert!(matches!(
            grenade.validate(),
            Err(ContentError::InvalidExplosive { .. })
        ));
    }

    #[test]
    fn yaml_defaults_area_and_fuse() {
        let yaml = "id: flash\nname: Flashbang\ndamage_dice: 1d4\ndamage_type: sonic\nsave_type: reflex\nsave_dc: 12\n";
        let parsed: Result<ExplosiveDef, _> = serde_yml::from_str(yaml);
        assert!(parsed.is_ok_and(|e| e.area_type == AreaType::Room && e.fuse == FuseType::Immediate));
    }
}
