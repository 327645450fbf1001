//! Dice expression parsing.
//!
//! Grammar (case-insensitive):
//!
//! ```text
//! [count] d <sides> [kh <keep>] [(+|-) <modifier>]
//! ```
//!
//! Examples: `d20`, `2d6`, `2d6+3`, `4d8-2`, `4d6kh3`, `4d6kh3+1`.

use core::str::FromStr;

use crate::error::DiceError;

/// A parsed dice expression ready to be rolled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    /// The input exactly as given.
    pub raw: String,
    /// Number of dice rolled (at least 1).
    pub count: u32,
    /// Faces per die (at least 2).
    pub sides: u32,
    /// Flat modifier added to the kept dice.
    pub modifier: i32,
    /// When set, only this many of the highest dice are kept.
    pub keep_highest: Option<u32>,
}

impl Expression {
    /// Parse `input` into an expression.
    pub fn parse(input: &str) -> Result<Self, DiceError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DiceError::Empty);
        }
        let raw = trimmed.to_owned();
        let lower = trimmed.to_ascii_lowercase();

        let Some((count_part, rest)) = lower.split_once('d') else {
            return Err(DiceError::MissingDie { expression: raw });
        };

        let count = if count_part.is_empty() {
            1
        } else {
            match count_part.parse::<u32>() {
                Ok(count) if count >= 1 => count,
                _ => return Err(DiceError::InvalidCount { expression: raw }),
            }
        };

        // The modifier is whatever follows the first sign.
        let (body, modifier) = match rest.find(['+', '-']) {
            Some(pos) => {
                let (body, modifier_part) = rest.split_at(pos);
                let Ok(modifier) = modifier_part.parse::<i32>() else {
                    return Err(DiceError::InvalidModifier { expression: raw });
                };
                (body, modifier)
            }
            None => (rest, 0),
        };

        let (sides_part, keep_part) = match body.split_once("kh") {
            Some((sides, keep)) => (sides, Some(keep)),
            None => (body, None),
        };

        let sides = match sides_part.parse::<u32>() {
            Ok(sides) if sides >= 2 => sides,
            _ => return Err(DiceError::InvalidSides { expression: raw }),
        };

        let keep_highest = match keep_part {
            None => None,
            Some(keep_part) => match keep_part.parse::<u32>() {
                Ok(keep) if keep > 0 && keep < count => Some(keep),
                _ => {
                    return Err(DiceError::InvalidKeep {
                        count,
                        expression: raw,
                    });
                }
            },
        };

        Ok(Self {
            raw,
            count,
            sides,
            modifier,
            keep_highest,
        })
    }
}

impl FromStr for Expression {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
