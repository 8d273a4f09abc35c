//! Goal ledger: goals with a pomodoro target and a progress counter.

use crate::models::{validate_goal, Goal, ValidationError};
use crate::persistence::{self, KeyValueStore};
use std::rc::Rc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Owns the goal collection. Every mutation is followed by a full save.
///
/// Operations on an unknown id do nothing and return `false`.
pub struct GoalLedger {
    goals: Vec<Goal>,
    store: Rc<dyn KeyValueStore>,
}

impl GoalLedger {
    /// Loads the ledger from `store`.
    pub fn load(store: Rc<dyn KeyValueStore>) -> Self {
        let goals = persistence::load_goals(store.as_ref());
        debug!(count = goals.len(), "loaded goals");
        Self { goals, store }
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn get(&self, id: Uuid) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    /// Goals that can still be picked for a focus interval.
    pub fn selectable(&self) -> impl Iterator<Item = &Goal> {
        self.goals.iter().filter(|g| !g.is_pomodoros_met())
    }

    /// Adds a new goal and returns its id.
    pub fn create(&mut self, title: &str, target: u32) -> Result<Uuid, ValidationError> {
        let goal = Goal::new(title, target)?;
        let id = goal.id;
        info!(%id, title = %goal.title, target, "goal created");
        self.goals.push(goal);
        self.persist();
        Ok(id)
    }

    /// Credits one completed focus interval. Marks the goal completed when
    /// the target is reached.
    pub fn increment(&mut self, id: Uuid) -> bool {
        let updated = self.mutate(id, |goal| {
            goal.pomodoros_completed = goal.pomodoros_completed.saturating_add(1);
            if goal.is_pomodoros_met() {
                goal.is_completed = true;
            }
        });
        if updated {
            debug!(%id, "goal progress incremented");
        }
        updated
    }

    pub fn reset_progress(&mut self, id: Uuid) -> bool {
        self.mutate(id, |goal| {
            goal.pomodoros_completed = 0;
            goal.is_completed = false;
        })
    }

    /// Flips the completed flag without touching the counter.
    pub fn toggle_manual(&mut self, id: Uuid) -> bool {
        self.mutate(id, |goal| goal.is_completed = !goal.is_completed)
    }

    /// Checkmark behaviour of the goal list: unchecking a completed goal
    /// clears its progress, checking an open goal marks it done by hand.
    pub fn toggle_checkmark(&mut self, id: Uuid) -> bool {
        match self.get(id) {
            Some(goal) if goal.is_completed => self.reset_progress(id),
            Some(_) => self.toggle_manual(id),
            None => false,
        }
    }

    /// Edits title and target. Progress and the completed flag are kept as stored.
    pub fn update(&mut self, id: Uuid, title: &str, target: u32) -> Result<bool, ValidationError> {
        let title = validate_goal(title, target)?;
        Ok(self.mutate(id, |goal| {
            goal.title = title;
            goal.pomodoros_target = target;
        }))
    }

    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.goals.len();
        self.goals.retain(|g| g.id != id);
        if self.goals.len() == before {
            return false;
        }
        info!(%id, "goal deleted");
        self.persist();
        true
    }

    fn mutate(&mut self, id: Uuid, f: impl FnOnce(&mut Goal)) -> bool {
        let Some(goal) = self.goals.iter_mut().find(|g| g.id == id) else {
            return false;
        };
        f(goal);
        self.persist();
        true
    }

    fn persist(&self) {
        if let Err(e) = persistence::save_goals(self.store.as_ref(), &self.goals) {
            warn!(error = %e, "failed to save goals");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{save_goals, MemoryStore};

    fn empty_ledger() -> (GoalLedger, Rc<MemoryStore>) {
        let store = Rc::new(MemoryStore::new());
        save_goals(store.as_ref(), &[]).unwrap();
        let ledger = GoalLedger::load(store.clone());
        (ledger, store)
    }

    #[test]
    fn test_load_seeds_examples() {
        let ledger = GoalLedger::load(Rc::new(MemoryStore::new()));
        assert_eq!(ledger.goals().len(), 3);
    }

    #[test]
    fn test_create_appends_and_persists() {
        let (mut ledger, store) = empty_ledger();
        let id = ledger.create("  Algebra  ", 2).unwrap();

        let goal = ledger.get(id).unwrap();
        assert_eq!(goal.title, "Algebra");
        assert_eq!(goal.pomodoros_completed, 0);
        assert!(!goal.is_completed);

        let reloaded = GoalLedger::load(store);
        assert_eq!(reloaded.goals(), ledger.goals());
    }

    #[test]
    fn test_create_rejects_invalid_input() {
        let (mut ledger, _) = empty_ledger();
        assert_eq!(ledger.create(" \t", 2), Err(ValidationError::EmptyTitle));
        assert_eq!(ledger.create("Algebra", 0), Err(ValidationError::InvalidTarget(0)));
        assert!(ledger.goals().is_empty());
    }

    #[test]
    fn test_increment_completes_exactly_at_target() {
        let (mut ledger, _) = empty_ledger();
        let id = ledger.create("Essay", 3).unwrap();

        for n in 1..=5u32 {
            assert!(ledger.increment(id));
            let goal = ledger.get(id).unwrap();
            assert_eq!(goal.pomodoros_completed, n);
            assert_eq!(goal.is_pomodoros_met(), n >= 3);
            assert_eq!(goal.is_completed, n >= 3);
        }
    }

    #[test]
    fn test_increment_saturates_stored_counter() {
        let store = Rc::new(MemoryStore::new());
        let mut goal = Goal::new("Essay", 3).unwrap();
        goal.pomodoros_completed = u32::MAX;
        let id = goal.id;
        save_goals(store.as_ref(), &[goal]).unwrap();

        let mut ledger = GoalLedger::load(store);
        assert!(ledger.increment(id));
        let goal = ledger.get(id).unwrap();
        assert_eq!(goal.pomodoros_completed, u32::MAX);
        assert!(goal.is_completed);
    }

    #[test]
    fn test_unknown_id_is_a_no_op() {
        let (mut ledger, _) = empty_ledger();
        let id = ledger.create("Essay", 3).unwrap();
        let missing = Uuid::new_v4();
        let before = ledger.goals().to_vec();

        assert!(!ledger.increment(missing));
        assert!(!ledger.reset_progress(missing));
        assert!(!ledger.toggle_manual(missing));
        assert!(!ledger.toggle_checkmark(missing));
        assert_eq!(ledger.update(missing, "Other", 1), Ok(false));
        assert!(!ledger.delete(missing));

        assert_eq!(ledger.goals(), before.as_slice());
        assert!(ledger.get(id).is_some());
    }

    #[test]
    fn test_reset_progress_clears_everything() {
        let (mut ledger, _) = empty_ledger();
        let id = ledger.create("Essay", 1).unwrap();
        ledger.increment(id);
        ledger.increment(id);
        assert!(ledger.get(id).unwrap().is_completed);

        assert!(ledger.reset_progress(id));
        let goal = ledger.get(id).unwrap();
        assert_eq!(goal.pomodoros_completed, 0);
        assert!(!goal.is_completed);
    }

    #[test]
    fn test_toggle_manual_leaves_counter_alone() {
        let (mut ledger, _) = empty_ledger();
        let id = ledger.create("Essay", 4).unwrap();
        ledger.increment(id);

        assert!(ledger.toggle_manual(id));
        let goal = ledger.get(id).unwrap();
        assert!(goal.is_completed);
        assert_eq!(goal.pomodoros_completed, 1);

        ledger.toggle_manual(id);
        assert!(!ledger.get(id).unwrap().is_completed);
    }

    #[test]
    fn test_toggle_checkmark() {
        let (mut ledger, _) = empty_ledger();
        let id = ledger.create("Essay", 4).unwrap();
        ledger.increment(id);

        ledger.toggle_checkmark(id);
        let goal = ledger.get(id).unwrap();
        assert!(goal.is_completed);
        assert_eq!(goal.pomodoros_completed, 1);

        ledger.toggle_checkmark(id);
        let goal = ledger.get(id).unwrap();
        assert!(!goal.is_completed);
        assert_eq!(goal.pomodoros_completed, 0);
    }

    #[test]
    fn test_update_preserves_progress() {
        let (mut ledger, _) = empty_ledger();
        let id = ledger.create("Essay", 2).unwrap();
        ledger.increment(id);
        ledger.increment(id);

        assert_eq!(ledger.update(id, " Long essay ", 6), Ok(true));
        let goal = ledger.get(id).unwrap();
        assert_eq!(goal.title, "Long essay");
        assert_eq!(goal.pomodoros_target, 6);
        assert_eq!(goal.pomodoros_completed, 2);
        assert!(goal.is_completed);

        assert_eq!(ledger.update(id, "", 6), Err(ValidationError::EmptyTitle));
        assert_eq!(ledger.get(id).unwrap().title, "Long essay");
    }

    #[test]
    fn test_selectable_hides_met_goals() {
        let (mut ledger, _) = empty_ledger();
        let done = ledger.create("Done", 1).unwrap();
        let open = ledger.create("Open", 2).unwrap();
        ledger.increment(done);

        let ids: Vec<Uuid> = ledger.selectable().map(|g| g.id).collect();
        assert_eq!(ids, vec![open]);
    }

    #[test]
    fn test_delete_persists() {
        let (mut ledger, store) = empty_ledger();
        let id = ledger.create("Essay", 2).unwrap();
        assert!(ledger.delete(id));
        assert!(ledger.goals().is_empty());
        assert!(GoalLedger::load(store).goals().is_empty());
    }
}
