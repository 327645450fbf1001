//! Rolling parsed expressions.

use tracing::debug;

use crate::error::DiceError;
use crate::expr::Expression;
use crate::source::RandomSource;

/// The full audit trail of one evaluated expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollResult {
    /// The expression as written.
    pub expression: String,
    /// Kept die values. Keep-highest rolls list them highest first.
    pub dice: Vec<i32>,
    /// Flat modifier.
    pub modifier: i32,
}

impl RollResult {
    /// Sum of the kept dice plus the modifier.
    pub fn total(&self) -> i32 {
        self.dice
            .iter()
            .fold(self.modifier, |acc, die| acc.saturating_add(*die))
    }
}

impl core::fmt::Display for RollResult {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} -> {:?} {:+} = {}",
            self.expression,
            self.dice,
            self.modifier,
            self.total()
        )
    }
}

/// Roll `expression` against `rng`.
pub fn roll(expression: &Expression, rng: &mut dyn RandomSource) -> RollResult {
    let mut dice: Vec<i32> = (0..expression.count)
        .map(|_| rng.roll_die(expression.sides))
        .collect();

    if let Some(keep) = expression.keep_highest {
        dice.sort_unstable_by(|a, b| b.cmp(a));
        dice.truncate(usize::try_from(keep).unwrap_or(usize::MAX));
    }

    let result = RollResult {
        expression: expression.raw.clone(),
        dice,
        modifier: expression.modifier,
    };
    debug!(
        expression = %result.expression,
        dice = ?result.dice,
        modifier = result.modifier,
        total = result.total(),
        "dice roll"
    );
    result
}

/// Parse `expression` and roll it in one step.
pub fn roll_expr(expression: &str, rng: &mut dyn RandomSource) -> Result<RollResult, DiceError> {
    let parsed = Expression::parse(expression)?;
    Ok(roll(&parsed, rng))
}

// ---------------------------------------------------------------------------
// DiceEvaluator
// ---------------------------------------------------------------------------

/// Capability for evaluating damage expressions.
///
/// The combat engine only talks to this trait, so hosts can swap in an
/// evaluator with house rules (exploding dice, custom notation) without
/// touching resolution code.
pub trait DiceEvaluator: Send + Sync {
    /// Evaluate `expression` with dice drawn from `rng`.
    fn roll_expression(
        &self,
        expression: &str,
        rng: &mut dyn RandomSource,
    ) -> Result<RollResult, DiceError>;
}

/// Evaluator for the standard `NdS[khK][+M]` grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDice;

impl DiceEvaluator for StandardDice {
    fn roll_expression(
        &self,
        expression: &str,
        rng: &mut dyn RandomSource,
    ) -> Result<RollResult, DiceError> {
        roll_expr(expression, rng)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::source::{FixedSource, RngSource, SequenceSource};

    #[test]
    fn total_adds_modifier() {
        let mut src = SequenceSource::new(vec![3, 4]);
        let result = roll_expr("2d6+3", &mut src).unwrap();
        assert_eq!(result.dice, vec![4, 5]);
        assert_eq!(result.total(), 12);
    }

    #[test]
    fn display_shows_audit_trail() {
        let mut src = SequenceSource::new(vec![3, 4]);
        let result = roll_expr("2d6+3", &mut src).unwrap();
        assert_eq!(result.to_string(), "2d6+3 -> [4, 5] +3 = 12");
    }

    #[test]
    fn keep_highest_drops_lowest() {
        let mut src = SequenceSource::new(vec![0, 5, 2, 3]);
        let result = roll_expr("4d6kh3", &mut src).unwrap();
        assert_eq!(result.dice, vec![6, 4, 3]);
        assert_eq!(result.total(), 13);
    }

    #[test]
    fn negative_modifier_can_go_below_zero() {
        let mut src = FixedSource::new(0);
        let result = roll_expr("1d4-3", &mut src).unwrap();
        assert_eq!(result.total(), -2);
    }

    #[test]
    fn evaluator_reports_parse_errors() {
        let mut src = FixedSource::new(0);
        assert!(StandardDice.roll_expression("banana", &mut src).is_err());
    }

    proptest! {
        #[test]
        fn totals_stay_within_bounds(count in 1_u32..8, sides in 2_u32..20, modifier in -10_i32..10, seed in any::<u64>()) {
            let expr = Expression::parse(&format!("{count}d{sides}{modifier:+}")).unwrap();
            let mut rng = RngSource::seeded(seed);
            let result = roll(&expr, &mut rng);
            let count_i = i32::try_from(count).unwrap();
            let sides_i = i32::try_from(sides).unwrap();
            prop_assert_eq!(result.dice.len(), usize::try_from(count).unwrap());
            prop_assert!(result.total() >= count_i + modifier);
            prop_assert!(result.total() <= count_i * sides_i + modifier);
        }
    }
}
