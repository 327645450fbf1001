//! Registry of weapon and explosive definitions.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::error::ContentError;
use crate::explosive::ExplosiveDef;
use crate::loader::load_yaml_dir;
use crate::weapon::WeaponDef;

/// Every known weapon and explosive, keyed by id.
///
/// Definitions are shared behind [`Arc`] so loadouts can hold them without
/// copying.
#[derive(Debug, Clone, Default)]
pub struct InventoryRegistry {
    weapons: BTreeMap<String, Arc<WeaponDef>>,
    explosives: BTreeMap<String, Arc<ExplosiveDef>>,
}

impl InventoryRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a weapon. Ids must be unique.
    pub fn register_weapon(&mut self, def: WeaponDef) -> Result<(), ContentError> {
        if self.weapons.contains_key(&def.id) {
            return Err(ContentError::DuplicateWeapon(def.id));
        }
        self.weapons.insert(def.id.clone(), Arc::new(def));
        Ok(())
    }

    /// Add an explosive. Ids must be unique.
    pub fn register_explosive(&mut self, def: ExplosiveDef) -> Result<(), ContentError> {
        if self.explosives.contains_key(&def.id) {
            return Err(ContentError::DuplicateExplosive(def.id));
        }
        self.explosives.insert(def.id.clone(), Arc::new(def));
        Ok(())
    }

    /// Look up a weapon by id.
    pub fn weapon(&self, id: &str) -> Option<&Arc<WeaponDef>> {
        self.weapons.get(id)
    }

    /// Look up an explosive by id.
    pub fn explosive(&self, id: &str) -> Option<&Arc<ExplosiveDef>> {
        self.explosives.get(id)
    }

    /// Every weapon in id order.
    pub fn weapons(&self) -> impl Iterator<Item = &Arc<WeaponDef>> {
        self.weapons.values()
    }

    /// Every explosive in id order.
    pub fn explosives(&self) -> impl Iterator<Item = &Arc<ExplosiveDef>> {
        self.explosives.values()
    }

    /// Load and validate every definition in the given directories.
    ///
    /// Either directory may be omitted.
    pub fn load_dirs(
        weapons_dir: Option<&Path>,
        explosives_dir: Option<&Path>,
    ) -> Result<Self, ContentError> {
        let mut registry = Self::new();
        if let Some(dir) = weapons_dir {
            for (_, def) in load_yaml_dir::<WeaponDef>(dir)? {
                def.validate()?;
                registry.register_weapon(def)?;
            }
        }
        if let Some(dir) = explosives_dir {
            for (_, def) in load_yaml_dir::<ExplosiveDef>(dir)? {
                def.validate()?;
                registry.register_explosive(def)?;
            }
        }
        info!(
            weapons = registry.weapons.len(),
            explosives = registry.explosives.len(),
            "Loaded inventory definitions"
        );
        Ok(registry)
    }
}
