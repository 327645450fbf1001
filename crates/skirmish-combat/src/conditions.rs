//! Active conditions on one combatant.
//!
//! An [`ActiveSet`] records which conditions currently apply, at how many
//! stacks, and how many rounds remain. It derives the net attack and AC
//! modifiers and the stunned action-point reduction that round start and
//! round resolution consume.
//!
//! # Stacking
//!
//! A definition with `max_stacks == 0` never stacks and is always stored
//! at one stack. Otherwise re-application adds stacks up to the cap and
//! keeps the longer of the two durations.
//!
//! # Durations
//!
//! `None` means no countdown (permanent and until-save conditions).
//! `None` orders below every `Some`, so taking the maximum on re-apply
//! never shortens a timed condition.

use std::collections::BTreeMap;

use skirmish_content::condition::STUNNED;
use skirmish_content::{ConditionDef, DurationType};
use skirmish_types::ActionKind;

/// One applied condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveCondition {
    /// The condition's definition.
    pub def: ConditionDef,
    /// Current stack count.
    pub stacks: u32,
    /// Rounds remaining, or `None` when the condition does not count down.
    pub duration: Option<u32>,
}

/// Every condition applied to one combatant, keyed by condition id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveSet {
    conditions: BTreeMap<String, ActiveCondition>,
}

impl ActiveSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `stacks` of `def` for `duration` rounds.
    pub fn apply(&mut self, def: &ConditionDef, stacks: u32, duration: Option<u32>) {
        if let Some(existing) = self.conditions.get_mut(&def.id) {
            existing.stacks = if def.is_stackable() {
                existing.stacks.saturating_add(stacks).min(def.max_stacks)
            } else {
                1
            };
            existing.duration = existing.duration.max(duration);
            return;
        }

        let stacks = if def.is_stackable() {
            stacks.clamp(1, def.max_stacks)
        } else {
            1
        };
        self.conditions.insert(
            def.id.clone(),
            ActiveCondition {
                def: def.clone(),
                stacks,
                duration,
            },
        );
    }

    /// Remove `id`. No-op when absent.
    pub fn remove(&mut self, id: &str) {
        self.conditions.remove(id);
    }

    /// Count down every timed `rounds` condition and drop the ones that
    /// reach zero. Returns the expired ids in id order.
    pub fn tick(&mut self) -> Vec<String> {
        let mut expired = Vec::new();
        for (id, active) in &mut self.conditions {
            if active.def.duration_type != DurationType::Rounds {
                continue;
            }
            let Some(remaining) = active.duration else {
                continue;
            };
            let remaining = remaining.saturating_sub(1);
            active.duration = Some(remaining);
            if remaining == 0 {
                expired.push(id.clone());
            }
        }
        for id in &expired {
            self.conditions.remove(id);
        }
        expired
    }

    /// Whether `id` is active.
    pub fn has(&self, id: &str) -> bool {
        self.conditions.contains_key(id)
    }

    /// Stack count of `id`, or 0.
    pub fn stacks(&self, id: &str) -> u32 {
        self.conditions.get(id).map_or(0, |c| c.stacks)
    }

    /// Look up one active condition.
    pub fn get(&self, id: &str) -> Option<&ActiveCondition> {
        self.conditions.get(id)
    }

    /// Every active condition in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ActiveCondition> {
        self.conditions.values()
    }

    /// Number of active conditions.
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Whether nothing is active.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Net attack modifier. Never positive.
    pub fn attack_modifier(&self) -> i32 {
        self.penalty_sum(|def| def.attack_penalty)
    }

    /// Net armor class modifier. Never positive.
    pub fn ac_modifier(&self) -> i32 {
        self.penalty_sum(|def| def.ac_penalty)
    }

    /// Action points lost next round: the stunned stack count.
    pub fn stunned_ap_reduction(&self) -> u32 {
        self.stacks(STUNNED)
    }

    /// The first active condition (in id order) that blocks `kind`.
    pub fn restriction_for(&self, kind: ActionKind) -> Option<&ActiveCondition> {
        self.conditions.values().find(|c| c.def.restricts(kind))
    }

    fn penalty_sum(&self, penalty: impl Fn(&ConditionDef) -> i32) -> i32 {
        self.conditions
            .values()
            .filter(|c| penalty(&c.def) > 0)
            .fold(0_i32, |total, c| {
                let stacks = i32::try_from(c.stacks).unwrap_or(i32::MAX);
                total.saturating_sub(penalty(&c.def).saturating_mul(stacks))
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;
    use skirmish_content::ConditionRegistry;
    use skirmish_content::condition::{DYING, FLAT_FOOTED, FRIGHTENED, PRONE, WOUNDED};

    use super::*;

    fn def(id: &str) -> ConditionDef {
        ConditionRegistry::core().get(id).cloned().unwrap()
    }

    #[test]
    fn unstackable_condition_stays_at_one() {
        let mut set = ActiveSet::new();
        set.apply(&def(PRONE), 3, None);
        assert_eq!(set.stacks(PRONE), 1);
        set.apply(&def(PRONE), 2, None);
        assert_eq!(set.stacks(PRONE), 1);
    }

    #[test]
    fn stacks_accumulate_up_to_cap() {
        let mut set = ActiveSet::new();
        set.apply(&def(FRIGHTENED), 2, Some(2));
        set.apply(&def(FRIGHTENED), 1, Some(1));
        assert_eq!(set.stacks(FRIGHTENED), 3);
        set.apply(&def(FRIGHTENED), 5, Some(1));
        assert_eq!(set.stacks(FRIGHTENED), 4);
    }

    #[test]
    fn new_entry_is_capped() {
        let mut set = ActiveSet::new();
        set.apply(&def(WOUNDED), 9, None);
        assert_eq!(set.stacks(WOUNDED), 3);
    }

    #[test]
    fn reapply_keeps_longer_duration() {
        let mut set = ActiveSet::new();
        set.apply(&def(FRIGHTENED), 1, Some(3));
        set.apply(&def(FRIGHTENED), 1, Some(1));
        assert_eq!(set.get(FRIGHTENED).unwrap().duration, Some(3));
        set.apply(&def(FRIGHTENED), 1, Some(5));
        assert_eq!(set.get(FRIGHTENED).unwrap().duration, Some(5));
    }

    #[test]
    fn tick_expires_timed_conditions_only() {
        let mut set = ActiveSet::new();
        set.apply(&def(FLAT_FOOTED), 1, Some(1));
        set.apply(&def(FRIGHTENED), 1, Some(2));
        set.apply(&def(PRONE), 1, None);
        set.apply(&def(DYING), 2, None);

        assert_eq!(set.tick(), vec![FLAT_FOOTED.to_owned()]);
        assert!(!set.has(FLAT_FOOTED));
        assert!(set.has(FRIGHTENED));

        assert_eq!(set.tick(), vec![FRIGHTENED.to_owned()]);
        assert!(set.has(PRONE));
        assert!(set.has(DYING));
        assert!(set.tick().is_empty());
    }

    #[test]
    fn timed_condition_without_countdown_never_expires() {
        let mut set = ActiveSet::new();
        set.apply(&def(FRIGHTENED), 1, None);
        for _ in 0..5 {
            assert!(set.tick().is_empty());
        }
        assert!(set.has(FRIGHTENED));
    }

    #[test]
    fn penalties_multiply_by_stacks() {
        let mut set = ActiveSet::new();
        set.apply(&def(FRIGHTENED), 2, Some(2));
        set.apply(&def(PRONE), 1, None);
        assert_eq!(set.attack_modifier(), -4);
        assert_eq!(set.ac_modifier(), -2);
        set.apply(&def(FLAT_FOOTED), 1, Some(1));
        assert_eq!(set.ac_modifier(), -4);
    }

    #[test]
    fn stunned_reduces_action_points() {
        let mut set = ActiveSet::new();
        assert_eq!(set.stunned_ap_reduction(), 0);
        set.apply(&def(STUNNED), 2, Some(1));
        assert_eq!(set.stunned_ap_reduction(), 2);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut set = ActiveSet::new();
        set.apply(&def(PRONE), 1, None);
        set.remove(PRONE);
        set.remove(PRONE);
        assert!(set.is_empty());
    }

    proptest! {
        #[test]
        fn stacks_never_exceed_cap(applications in prop::collection::vec(0_u32..6, 1..10)) {
            let frightened = def(FRIGHTENED);
            let mut set = ActiveSet::new();
            for stacks in applications {
                set.apply(&frightened, stacks, Some(1));
                prop_assert!(set.stacks(FRIGHTENED) <= frightened.max_stacks);
                prop_assert!(set.stacks(FRIGHTENED) >= 1);
                prop_assert!(set.attack_modifier() <= 0);
                prop_assert!(set.ac_modifier() <= 0);
            }
        }
    }
}
