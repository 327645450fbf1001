//! Type-safe identifier wrappers.
//!
//! Combatants, rooms and zones are named by the host (player UIDs, NPC
//! instance IDs, room keys), so those identifiers wrap a [`String`]. Each
//! encounter additionally receives a time-ordered [`EncounterId`] for log
//! correlation across rounds.

use core::borrow::Borrow;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around a host-assigned [`String`] key.
macro_rules! define_key {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a host-assigned key.
            pub fn new(key: impl Into<String>) -> Self {
                Self(key.into())
            }

            /// Borrow the key as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Return the inner [`String`].
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(key: &str) -> Self {
                Self(key.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(key: String) -> Self {
                Self(key)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_key! {
    /// Unique identifier for a combatant (player UID or NPC instance ID).
    CombatantId
}

define_key! {
    /// Identifier of the room an encounter takes place in.
    RoomId
}

define_key! {
    /// Key selecting the scripting zone whose hooks apply to an encounter.
    ZoneId
}

/// Unique identifier for one encounter, assigned when it starts.
///
/// Uses UUID v7 (time-ordered) so encounters sort by creation time in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EncounterId(pub Uuid);

impl EncounterId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for EncounterId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for EncounterId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn keys_compare_by_content() {
        assert_eq!(CombatantId::new("p1"), CombatantId::from("p1"));
        assert_ne!(CombatantId::new("p1"), CombatantId::new("p2"));
    }

    #[test]
    fn keys_look_up_by_str() {
        let mut map = HashMap::new();
        map.insert(RoomId::new("tavern"), 7);
        assert_eq!(map.get("tavern"), Some(&7));
    }

    #[test]
    fn keys_serialize_transparently() {
        let id = CombatantId::new("npc-42");
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, "\"npc-42\"");
    }

    #[test]
    fn encounter_ids_are_unique() {
        let a = EncounterId::new();
        let b = EncounterId::new();
        assert_ne!(a, b);
        assert_ne!(a.into_inner(), Uuid::nil());
    }
}
