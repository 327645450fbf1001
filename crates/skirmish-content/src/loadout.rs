//! What a combatant is carrying into a fight.

use std::sync::Arc;

use crate::error::ContentError;
use crate::magazine::Magazine;
use crate::weapon::WeaponDef;

/// A weapon in hand, with its magazine when it is a firearm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquippedWeapon {
    /// The shared weapon definition.
    pub def: Arc<WeaponDef>,
    /// The loaded magazine. Always present for firearms.
    pub magazine: Option<Magazine>,
}

impl EquippedWeapon {
    /// Equip `def`, loading a full magazine for firearms.
    pub fn new(def: Arc<WeaponDef>) -> Result<Self, ContentError> {
        def.validate()?;
        let magazine = if def.is_firearm() {
            Some(Magazine::new(def.id.clone(), def.magazine_capacity)?)
        } else {
            None
        };
        Ok(Self { def, magazine })
    }
}

/// A combatant's equipment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Loadout {
    /// The weapon in the main hand.
    pub main_hand: Option<EquippedWeapon>,
}

impl Loadout {
    /// An empty loadout.
    pub fn new() -> Self {
        Self::default()
    }

    /// A loadout holding `def` in the main hand.
    pub fn with_main_hand(def: Arc<WeaponDef>) -> Result<Self, ContentError> {
        let mut loadout = Self::new();
        loadout.equip(def)?;
        Ok(loadout)
    }

    /// Put `def` in the main hand, replacing whatever was there.
    pub fn equip(&mut self, def: Arc<WeaponDef>) -> Result<(), ContentError> {
        self.main_hand = Some(EquippedWeapon::new(def)?);
        Ok(())
    }

    /// Empty the main hand.
    pub fn unequip(&mut self) {
        self.main_hand = None;
    }

    /// The main-hand magazine, if a firearm is equipped.
    pub fn magazine(&self) -> Option<&Magazine> {
        self.main_hand.as_ref().and_then(|w| w.magazine.as_ref())
    }

    /// Mutable access to the main-hand magazine.
    pub fn magazine_mut(&mut self) -> Option<&mut Magazine> {
        self.main_hand.as_mut().and_then(|w| w.magazine.as_mut())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::weapon::tests::pistol;

    #[test]
    fn equipping_firearm_loads_full_magazine() {
        let loadout = Loadout::with_main_hand(Arc::new(pistol())).unwrap();
        let mag = loadout.magazine().unwrap();
        assert_eq!(mag.loaded(), 15);
        assert_eq!(mag.weapon_id(), "pistol");
    }

    #[test]
    fn melee_weapon_has_no_magazine() {
        let mut club = pistol();
        club.id = "club".to_owned();
        club.firing_modes.clear();
        club.range_increment = 0;
        let loadout = Loadout::with_main_hand(Arc::new(club)).unwrap();
        assert!(loadout.main_hand.is_some());
        assert!(loadout.magazine().is_none());
    }

    #[test]
    fn invalid_weapon_cannot_be_equipped() {
        let mut broken = pistol();
        broken.damage_dice.clear();
        let mut loadout = Loadout::new();
        assert!(loadout.equip(Arc::new(broken)).is_err());
        assert!(loadout.main_hand.is_none());
    }

    #[test]
    fn unequip_clears_hand() {
        let mut loadout = Loadout::with_main_hand(Arc::new(pistol())).unwrap();
        loadout.magazine_mut().unwrap().consume(2).unwrap();
        assert_eq!(loadout.magazine().unwrap().loaded(), 13);
        loadout.unequip();
        assert!(loadout.magazine().is_none());
    }
}
