//! Error types for the skirmish-content crate.
//!
//! Load-time problems (unreadable directories, malformed YAML, invalid
//! definitions) are surfaced here. Missing content discovered during round
//! resolution is not an error at this layer; the combat engine degrades to
//! a narrative fallback instead.

use std::path::PathBuf;

/// Errors that can occur while loading or using content definitions.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// A content directory or file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The path that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A content file is not valid YAML for its definition type.
    #[error("failed to parse {path}: {source}")]
    Yaml {
        /// The file that failed to parse.
        path: PathBuf,
        /// The underlying YAML error.
        source: serde_yml::Error,
    },

    /// A weapon definition failed validation.
    #[error("invalid weapon {id:?}: {problems}")]
    InvalidWeapon {
        /// The weapon id (may be empty).
        id: String,
        /// Every problem found, joined with `; `.
        problems: String,
    },

    /// An explosive definition failed validation.
    #[error("invalid explosive {id:?}: {problems}")]
    InvalidExplosive {
        /// The explosive id (may be empty).
        id: String,
        /// Every problem found, joined with `; `.
        problems: String,
    },

    /// A weapon id was registered twice.
    #[error("weapon {0:?} already registered")]
    DuplicateWeapon(String),

    /// An explosive id was registered twice.
    #[error("explosive {0:?} already registered")]
    DuplicateExplosive(String),

    /// A magazine was created with zero capacity.
    #[error("magazine for {weapon_id:?} must have capacity > 0")]
    ZeroCapacity {
        /// The weapon the magazine belongs to.
        weapon_id: String,
    },

    /// More rounds were requested than the magazine holds.
    #[error("insufficient rounds: wanted {requested} but only {loaded} loaded")]
    InsufficientRounds {
        /// Rounds requested.
        requested: u32,
        /// Rounds currently loaded.
        loaded: u32,
    },
}
