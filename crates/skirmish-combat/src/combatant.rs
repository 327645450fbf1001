//! Combatants and the stat formulas that derive from them.

use skirmish_content::Loadout;
use skirmish_types::{Allegiance, CombatantId};

/// Standard ability modifier for a raw ability score: `(score - 10) / 2`,
/// truncating toward zero.
pub const fn ability_modifier(score: i32) -> i32 {
    score.saturating_sub(10) / 2
}

/// Proficiency bonus for a level: `2 + (level - 1) / 4`, minimum 2.
pub fn proficiency_bonus(level: u32) -> i32 {
    let steps = level.saturating_sub(1) / 4;
    2_i32.saturating_add(i32::try_from(steps).unwrap_or(i32::MAX))
}

/// One participant in an encounter.
///
/// Invariant: `current_hp <= max_hp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combatant {
    /// Stable identifier (player UID or NPC instance id).
    pub id: CombatantId,
    /// Display name, also used for melee targeting.
    pub name: String,
    /// Which side the combatant fights for.
    pub allegiance: Allegiance,
    /// Maximum hit points.
    pub max_hp: u32,
    /// Current hit points.
    pub current_hp: u32,
    /// Armor class.
    pub armor_class: i32,
    /// Character level (at least 1).
    pub level: u32,
    /// Strength modifier.
    pub str_mod: i32,
    /// Dexterity modifier.
    pub dex_mod: i32,
    /// Initiative score for this encounter.
    pub initiative: i32,
    /// Permanent death flag, set by the dying chain.
    pub dead: bool,
    /// Equipped weapons.
    pub loadout: Loadout,
}

impl Combatant {
    /// A level-1 combatant at full health with zero modifiers.
    pub fn new(
        id: impl Into<CombatantId>,
        name: impl Into<String>,
        allegiance: Allegiance,
        max_hp: u32,
        armor_class: i32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            allegiance,
            max_hp,
            current_hp: max_hp,
            armor_class,
            level: 1,
            str_mod: 0,
            dex_mod: 0,
            initiative: 0,
            dead: false,
            loadout: Loadout::new(),
        }
    }

    /// Set the level.
    #[must_use]
    pub const fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    /// Set strength and dexterity modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, str_mod: i32, dex_mod: i32) -> Self {
        self.str_mod = str_mod;
        self.dex_mod = dex_mod;
        self
    }

    /// Set the initiative score.
    #[must_use]
    pub const fn with_initiative(mut self, initiative: i32) -> Self {
        self.initiative = initiative;
        self
    }

    /// Set the equipment.
    #[must_use]
    pub fn with_loadout(mut self, loadout: Loadout) -> Self {
        self.loadout = loadout;
        self
    }

    /// Whether this is a player character.
    pub const fn is_player(&self) -> bool {
        matches!(self.allegiance, Allegiance::Player)
    }

    /// Whether the combatant is out of the fight for good.
    ///
    /// NPCs die at 0 HP. Players at 0 HP are dying, not dead, until the
    /// dying chain sets the death flag.
    pub const fn is_dead(&self) -> bool {
        match self.allegiance {
            Allegiance::Npc => self.current_hp == 0,
            Allegiance::Player => self.dead,
        }
    }

    /// Reduce HP by `amount`, flooring at zero. Returns the new HP.
    pub const fn apply_damage(&mut self, amount: u32) -> u32 {
        self.current_hp = self.current_hp.saturating_sub(amount);
        self.current_hp
    }

    /// Set HP, clamped to the maximum.
    pub fn set_hp(&mut self, hp: u32) {
        self.current_hp = hp.min(self.max_hp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ability_modifier_truncates() {
        assert_eq!(ability_modifier(10), 0);
        assert_eq!(ability_modifier(14), 2);
        assert_eq!(ability_modifier(15), 2);
        assert_eq!(ability_modifier(8), -1);
        assert_eq!(ability_modifier(7), -1);
    }

    #[test]
    fn proficiency_scales_every_four_levels() {
        assert_eq!(proficiency_bonus(0), 2);
        assert_eq!(proficiency_bonus(1), 2);
        assert_eq!(proficiency_bonus(4), 2);
        assert_eq!(proficiency_bonus(5), 3);
        assert_eq!(proficiency_bonus(9), 4);
    }

    #[test]
    fn npc_dies_at_zero_hp() {
        let mut goblin = Combatant::new("g1", "Goblin", Allegiance::Npc, 8, 12);
        assert_eq!(goblin.apply_damage(20), 0);
        assert!(goblin.is_dead());
    }

    #[test]
    fn player_at_zero_hp_is_not_dead() {
        let mut hero = Combatant::new("p1", "Alice", Allegiance::Player, 10, 14);
        hero.apply_damage(10);
        assert_eq!(hero.current_hp, 0);
        assert!(!hero.is_dead());
        hero.dead = true;
        assert!(hero.is_dead());
    }

    #[test]
    fn set_hp_clamps_to_max() {
        let mut hero = Combatant::new("p1", "Alice", Allegiance::Player, 10, 14);
        hero.set_hp(50);
        assert_eq!(hero.current_hp, 10);
    }
}
