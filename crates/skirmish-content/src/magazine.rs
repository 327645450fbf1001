//! Firearm magazines.

use crate::error::ContentError;

/// Ammunition loaded in one firearm.
///
/// Invariant: `loaded <= capacity` and `capacity > 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Magazine {
    weapon_id: String,
    loaded: u32,
    capacity: u32,
}

impl Magazine {
    /// A full magazine for `weapon_id`.
    pub fn new(weapon_id: impl Into<String>, capacity: u32) -> Result<Self, ContentError> {
        let weapon_id = weapon_id.into();
        if capacity == 0 {
            return Err(ContentError::ZeroCapacity { weapon_id });
        }
        Ok(Self {
            weapon_id,
            loaded: capacity,
            capacity,
        })
    }

    /// The weapon this magazine feeds.
    pub fn weapon_id(&self) -> &str {
        &self.weapon_id
    }

    /// Rounds currently loaded.
    pub const fn loaded(&self) -> u32 {
        self.loaded
    }

    /// Maximum rounds.
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Whether no rounds remain.
    pub const fn is_empty(&self) -> bool {
        self.loaded == 0
    }

    /// Remove `n` rounds. Fails without change when fewer are loaded.
    pub const fn consume(&mut self, n: u32) -> Result<(), ContentError> {
        match self.loaded.checked_sub(n) {
            Some(remaining) => {
                self.loaded = remaining;
                Ok(())
            }
            None => Err(ContentError::InsufficientRounds {
                requested: n,
                loaded: self.loaded,
            }),
        }
    }

    /// Refill to capacity.
    pub const fn reload(&mut self) {
        self.loaded = self.capacity;
    }
}
