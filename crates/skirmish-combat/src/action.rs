//! Per-round action economy.
//!
//! Every living combatant gets a fresh [`ActionQueue`] at round start with
//! a budget of action points. Committing an action debits its cost;
//! passing forfeits whatever is left. A queue with no points left (or a
//! pass in it) counts as submitted.
//!
//! # Invariants
//!
//! - `remaining` never underflows; a rejected action leaves the queue as
//!   it was.
//! - `max_points` is fixed for the life of the queue.

use skirmish_types::{ActionKind, CombatantId};

use crate::error::CombatError;

// ---------------------------------------------------------------------------
// QueuedAction
// ---------------------------------------------------------------------------

/// One committed intent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueuedAction {
    /// What the combatant intends to do.
    pub kind: ActionKind,
    /// Target name (or id, for ranged actions).
    pub target: Option<String>,
    /// Weapon to use, for reload and ranged actions.
    pub weapon_id: Option<String>,
    /// Explosive to throw.
    pub explosive_id: Option<String>,
}

impl QueuedAction {
    /// An action of `kind` with no parameters.
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// A single attack against `target`.
    pub fn attack(target: impl Into<String>) -> Self {
        Self::new(ActionKind::Attack).with_target(target)
    }

    /// Two attacks against `target`, the second at the multiple-attack penalty.
    pub fn strike(target: impl Into<String>) -> Self {
        Self::new(ActionKind::Strike).with_target(target)
    }

    /// Forfeit the rest of the round.
    pub fn pass() -> Self {
        Self::new(ActionKind::Pass)
    }

    /// Reload the equipped firearm.
    pub fn reload() -> Self {
        Self::new(ActionKind::Reload)
    }

    /// Burst fire at `target` (name or id).
    pub fn burst(target: impl Into<String>) -> Self {
        Self::new(ActionKind::FireBurst).with_target(target)
    }

    /// Automatic fire at every opponent.
    pub fn automatic() -> Self {
        Self::new(ActionKind::FireAutomatic)
    }

    /// Throw the explosive `explosive_id`.
    pub fn throw(explosive_id: impl Into<String>) -> Self {
        Self {
            explosive_id: Some(explosive_id.into()),
            ..Self::new(ActionKind::Throw)
        }
    }

    /// Set the target.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Set the weapon.
    #[must_use]
    pub fn with_weapon(mut self, weapon_id: impl Into<String>) -> Self {
        self.weapon_id = Some(weapon_id.into());
        self
    }
}

// ---------------------------------------------------------------------------
// ActionQueue
// ---------------------------------------------------------------------------

/// A combatant's action-point ledger for one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionQueue {
    combatant_id: CombatantId,
    max_points: u32,
    remaining: u32,
    actions: Vec<QueuedAction>,
}

impl ActionQueue {
    /// A fresh queue with `max_points` to spend.
    pub const fn new(combatant_id: CombatantId, max_points: u32) -> Self {
        Self {
            combatant_id,
            max_points,
            remaining: max_points,
            actions: Vec::new(),
        }
    }

    /// The combatant this queue belongs to.
    pub const fn combatant_id(&self) -> &CombatantId {
        &self.combatant_id
    }

    /// The round's full budget.
    pub const fn max_points(&self) -> u32 {
        self.max_points
    }

    /// Points not yet spent.
    pub const fn remaining_points(&self) -> u32 {
        self.remaining
    }

    /// Committed actions in submission order.
    pub fn actions(&self) -> &[QueuedAction] {
        &self.actions
    }

    /// Commit `action`, debiting its cost.
    ///
    /// A pass always succeeds and zeroes the remaining points. The unknown
    /// kind and unaffordable actions are rejected without change.
    pub fn enqueue(&mut self, action: QueuedAction) -> Result<(), CombatError> {
        match action.kind {
            ActionKind::Unknown => Err(CombatError::InvalidAction {
                combatant: self.combatant_id.clone(),
            }),
            ActionKind::Pass => {
                self.actions.push(action);
                self.remaining = 0;
                Ok(())
            }
            kind => {
                let needed = kind.cost();
                let Some(left) = self.remaining.checked_sub(needed) else {
                    return Err(CombatError::InsufficientPoints {
                        needed,
                        remaining: self.remaining,
                    });
                };
                self.actions.push(action);
                self.remaining = left;
                Ok(())
            }
        }
    }

    /// Whether the combatant can still commit something this round.
    pub fn has_points(&self) -> bool {
        self.remaining > 0 && !self.is_submitted()
    }

    /// Whether the combatant is done for the round.
    pub fn is_submitted(&self) -> bool {
        self.remaining == 0 || self.actions.iter().any(|a| a.kind == ActionKind::Pass)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn queue(points: u32) -> ActionQueue {
        ActionQueue::new(CombatantId::new("p1"), points)
    }

    #[test]
    fn new_queue_has_full_budget() {
        let q = queue(3);
        assert_eq!(q.max_points(), 3);
        assert_eq!(q.remaining_points(), 3);
        assert!(q.actions().is_empty());
        assert!(q.has_points());
        assert!(!q.is_submitted());
    }

    #[test]
    fn attack_debits_one_point() {
        let mut q = queue(3);
        q.enqueue(QueuedAction::attack("Goblin")).unwrap();
        assert_eq!(q.remaining_points(), 2);
        assert_eq!(q.actions().len(), 1);
    }

    #[test]
    fn strike_then_attack_exhausts_budget() {
        let mut q = queue(3);
        q.enqueue(QueuedAction::strike("Goblin")).unwrap();
        q.enqueue(QueuedAction::attack("Goblin")).unwrap();
        assert_eq!(q.remaining_points(), 0);
        assert!(q.is_submitted());
        assert!(!q.has_points());
    }

    #[test]
    fn unknown_kind_is_rejected_without_change() {
        let mut q = queue(3);
        let err = q.enqueue(QueuedAction::default()).unwrap_err();
        assert!(matches!(err, CombatError::InvalidAction { .. }));
        assert_eq!(q.remaining_points(), 3);
        assert!(q.actions().is_empty());
    }

    #[test]
    fn unaffordable_action_is_rejected_without_change() {
        let mut q = queue(2);
        q.enqueue(QueuedAction::attack("Goblin")).unwrap();
        let err = q.enqueue(QueuedAction::strike("Goblin")).unwrap_err();
        assert_eq!(
            err,
            CombatError::InsufficientPoints {
                needed: 2,
                remaining: 1
            }
        );
        assert_eq!(q.remaining_points(), 1);
        assert_eq!(q.actions().len(), 1);
    }

    #[test]
    fn pass_forfeits_remaining_points() {
        let mut q = queue(3);
        q.enqueue(QueuedAction::attack("Goblin")).unwrap();
        q.enqueue(QueuedAction::pass()).unwrap();
        assert_eq!(q.remaining_points(), 0);
        assert!(q.is_submitted());
        assert_eq!(q.actions().len(), 2);
    }

    #[test]
    fn pass_succeeds_on_empty_budget() {
        let mut q = queue(0);
        assert!(q.is_submitted());
        q.enqueue(QueuedAction::pass()).unwrap();
        assert_eq!(q.actions().len(), 1);
    }

    #[test]
    fn automatic_fire_needs_three_points() {
        let mut q = queue(2);
        assert!(q.enqueue(QueuedAction::automatic()).is_err());
        let mut q = queue(3);
        q.enqueue(QueuedAction::automatic()).unwrap();
        assert!(q.is_submitted());
    }

    fn any_action() -> impl Strategy<Value = QueuedAction> {
        prop_oneof![
            Just(QueuedAction::default()),
            Just(QueuedAction::attack("t")),
            Just(QueuedAction::strike("t")),
            Just(QueuedAction::pass()),
            Just(QueuedAction::reload()),
            Just(QueuedAction::burst("t")),
            Just(QueuedAction::automatic()),
            Just(QueuedAction::throw("frag")),
        ]
    }

    proptest! {
        #[test]
        fn failed_enqueue_never_changes_state(budget in 0_u32..6, actions in prop::collection::vec(any_action(), 0..12)) {
            let mut q = queue(budget);
            for action in actions {
                let before_len = q.actions().len();
                let before_remaining = q.remaining_points();
                let is_pass = action.kind == ActionKind::Pass;
                match q.enqueue(action) {
                    Ok(()) => {
                        prop_assert_eq!(q.actions().len(), before_len + 1);
                        if is_pass {
                            prop_assert_eq!(q.remaining_points(), 0);
                            prop_assert!(q.is_submitted());
                        }
                    }
                    Err(_) => {
                        prop_assert_eq!(q.actions().len(), before_len);
                        prop_assert_eq!(q.remaining_points(), before_remaining);
                    }
                }
                prop_assert!(q.remaining_points() <= budget);
            }
        }
    }
}
