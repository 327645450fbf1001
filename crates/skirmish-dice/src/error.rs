//! Error types for the skirmish-dice crate.

/// Errors that can occur while parsing a dice expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiceError {
    /// The expression was empty or only whitespace.
    #[error("dice: empty expression")]
    Empty,

    /// The expression has no `d` separating count from sides.
    #[error("dice: missing 'd' in expression {expression:?}")]
    MissingDie {
        /// The offending input.
        expression: String,
    },

    /// The die count is not a positive integer.
    #[error("dice: invalid die count in {expression:?}: must be >= 1")]
    InvalidCount {
        /// The offending input.
        expression: String,
    },

    /// The number of sides is not an integer of at least two.
    #[error("dice: invalid die sides in {expression:?}: must be >= 2")]
    InvalidSides {
        /// The offending input.
        expression: String,
    },

    /// The keep-highest suffix is malformed or out of range.
    #[error("dice: keep-highest value must be > 0 and < count {count} in {expression:?}")]
    InvalidKeep {
        /// The die count the keep value is checked against.
        count: u32,
        /// The offending input.
        expression: String,
    },

    /// The flat modifier is not a signed integer.
    #[error("dice: invalid modifier in {expression:?}")]
    InvalidModifier {
        /// The offending input.
        expression: String,
    },
}
