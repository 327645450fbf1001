//! Randomness and dice for the Skirmish combat engine.
//!
//! All dice in the engine are rolled against an injected [`RandomSource`],
//! which keeps resolution deterministic under test. Weapon and explosive
//! damage go through a [`DiceEvaluator`] so the expression grammar stays a
//! replaceable collaborator.
//!
//! # Modules
//!
//! - [`source`] -- The [`RandomSource`] trait, an `rand` adapter, fixed test sources
//! - [`expr`] -- Expression parsing (`2d6+3`, `4d6kh3`)
//! - [`roll`] -- Rolling, audit results, the [`DiceEvaluator`] capability
//! - [`error`] -- Parse errors

pub mod error;
pub mod expr;
pub mod roll;
pub mod source;

pub use error::DiceError;
pub use expr::Expression;
pub use roll::{DiceEvaluator, RollResult, StandardDice, roll, roll_expr};
pub use source::{FixedSource, RandomSource, RngSource, SequenceSource};
