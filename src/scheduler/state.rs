//! Mutable search state shared by both strategies.
//!
//! [`SearchState`] bundles the partial schedule with the three memories that
//! must move in lock-step with it: per-period last use, weekly usage and
//! make-up dates. Every change goes through [`SearchState::apply`], which
//! returns an [`Undo`] record that restores the exact prior state.
//!
//! Backtracking wraps each trial in a [`Trial`] guard; dropping the guard
//! without committing rolls the assignment back, including on early return.

use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};
use std::ops::{Deref, DerefMut};

use crate::models::{week_of, Assignee, GroupId, PeriodMemory, Schedule, Slot};

/// Groups already taught in each week (keyed by the week's Monday).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct WeeklyUsage {
    by_week: HashMap<NaiveDate, BTreeSet<GroupId>>,
}

impl WeeklyUsage {
    pub(crate) fn contains(&self, week: NaiveDate, group: GroupId) -> bool {
        self.by_week.get(&week).is_some_and(|s| s.contains(&group))
    }

    /// Lessons (distinct groups) already placed in a week.
    pub(crate) fn lessons_in(&self, week: NaiveDate) -> usize {
        self.by_week.get(&week).map_or(0, BTreeSet::len)
    }

    fn insert(&mut self, week: NaiveDate, group: GroupId) {
        self.by_week.entry(week).or_default().insert(group);
    }

    fn remove(&mut self, week: NaiveDate, group: GroupId) {
        if let Some(set) = self.by_week.get_mut(&week) {
            set.remove(&group);
            if set.is_empty() {
                self.by_week.remove(&week);
            }
        }
    }
}

/// Dates that already hold their make-up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct MakeUpMemory {
    dates: BTreeSet<NaiveDate>,
}

impl MakeUpMemory {
    pub(crate) fn has_make_up(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    fn insert(&mut self, date: NaiveDate) -> bool {
        self.dates.insert(date)
    }

    fn remove(&mut self, date: NaiveDate) {
        self.dates.remove(&date);
    }
}

/// Everything needed to reverse one [`SearchState::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Undo {
    slot: Slot,
    assignee: Assignee,
    previous: Option<NaiveDate>,
}

/// Partial schedule plus the memories derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SearchState {
    pub(crate) memory: PeriodMemory,
    pub(crate) weekly: WeeklyUsage,
    pub(crate) make_ups: MakeUpMemory,
    pub(crate) schedule: Schedule,
}

impl SearchState {
    /// Fresh state over a copy of the seed memory.
    pub(crate) fn seeded(seed: &PeriodMemory) -> Self {
        Self {
            memory: seed.clone(),
            weekly: WeeklyUsage::default(),
            make_ups: MakeUpMemory::default(),
            schedule: Schedule::new(),
        }
    }

    /// Whether `assignee` may take `slot` under `spacing_days`.
    ///
    /// Groups: not yet used this week, and spaced from their last use of the
    /// period. Make-up: the date has none yet.
    pub(crate) fn admits(&self, slot: &Slot, assignee: Assignee, spacing_days: i64) -> bool {
        match assignee {
            Assignee::Group(g) => {
                !self.weekly.contains(slot.week(), g)
                    && self.memory.is_spaced(g, slot.period, slot.date, spacing_days)
            }
            Assignee::MakeUp => !self.make_ups.has_make_up(slot.date),
        }
    }

    /// Records an assignment and returns its undo record.
    pub(crate) fn apply(&mut self, slot: Slot, assignee: Assignee) -> Undo {
        let previous = match assignee {
            Assignee::Group(g) => {
                self.weekly.insert(slot.week(), g);
                self.memory.replace(g, slot.period, slot.date)
            }
            Assignee::MakeUp => {
                let fresh = self.make_ups.insert(slot.date);
                debug_assert!(fresh, "second make-up on {}", slot.date);
                None
            }
        };
        self.schedule.push(slot, assignee);
        Undo {
            slot,
            assignee,
            previous,
        }
    }

    /// Reverses the most recent un-reversed [`apply`](Self::apply).
    pub(crate) fn undo(&mut self, undo: Undo) {
        let popped = self.schedule.pop(undo.slot.date);
        debug_assert_eq!(popped, Some((undo.slot.period, undo.assignee)));

        match undo.assignee {
            Assignee::Group(g) => {
                self.weekly.remove(week_of(undo.slot.date), g);
                self.memory.restore(g, undo.slot.period, undo.previous);
            }
            Assignee::MakeUp => self.make_ups.remove(undo.slot.date),
        }
    }

    /// Applies an assignment under a rollback guard.
    pub(crate) fn trial(&mut self, slot: Slot, assignee: Assignee) -> Trial<'_> {
        let undo = self.apply(slot, assignee);
        Trial {
            state: self,
            undo: Some(undo),
        }
    }

    pub(crate) fn into_schedule(self) -> Schedule {
        self.schedule
    }
}

/// A tentative assignment that is rolled back on drop unless committed.
#[derive(Debug)]
pub(crate) struct Trial<'s> {
    state: &'s mut SearchState,
    undo: Option<Undo>,
}

impl Trial<'_> {
    /// Keeps the assignment.
    pub(crate) fn commit(mut self) {
        self.undo = None;
    }
}

impl Deref for Trial<'_> {
    type Target = SearchState;

    fn deref(&self) -> &SearchState {
        self.state
    }
}

impl DerefMut for Trial<'_> {
    fn deref_mut(&mut self) -> &mut SearchState {
        self.state
    }
}

impl Drop for Trial<'_> {
    fn drop(&mut self) {
        if let Some(undo) = self.undo.take() {
            self.state.undo(undo);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CycleDay, Period};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
    }

    fn slot(d: u32, p: u8) -> Slot {
        Slot {
            date: date(d),
            period: Period::new(p),
            cycle: CycleDay::One,
        }
    }

    fn g(i: usize) -> Assignee {
        Assignee::Group(GroupId::new(i))
    }

    fn seeded_state() -> SearchState {
        let mut seed = PeriodMemory::new();
        seed.observe(GroupId::new(0), Period::new(1), date(1) - chrono::Days::new(40));
        SearchState::seeded(&seed)
    }

    #[test]
    fn test_admits_weekly_uniqueness() {
        let mut state = seeded_state();
        state.apply(slot(2, 1), g(1));
        assert!(!state.admits(&slot(4, 3), g(1), 28));
        // next week is fine
        assert!(state.admits(&slot(9, 3), g(1), 28));
    }

    #[test]
    fn test_admits_spacing() {
        let mut state = seeded_state();
        state.apply(slot(2, 1), g(1));
        // 21 days later, same period, different week
        assert!(!state.admits(&slot(23, 1), g(1), 28));
        assert!(state.admits(&slot(23, 1), g(1), 21));
        assert!(state.admits(&slot(30, 1), g(1), 28));
    }

    #[test]
    fn test_admits_one_make_up_per_day() {
        let mut state = seeded_state();
        assert!(state.admits(&slot(2, 1), Assignee::MakeUp, 28));
        state.apply(slot(2, 1), Assignee::MakeUp);
        assert!(!state.admits(&slot(2, 3), Assignee::MakeUp, 28));
        assert!(state.admits(&slot(3, 2), Assignee::MakeUp, 28));
    }

    #[test]
    fn test_apply_undo_is_exact() {
        let mut state = seeded_state();
        state.apply(slot(2, 1), g(3));
        let before = state.clone();

        for assignee in [g(0), g(4), Assignee::MakeUp] {
            let undo = state.apply(slot(2, 3), assignee);
            assert_ne!(state, before);
            state.undo(undo);
            assert_eq!(state, before);
        }

        // new day entry is removed again
        let undo = state.apply(slot(3, 2), g(5));
        assert!(state.schedule.day(date(3)).is_some());
        state.undo(undo);
        assert!(state.schedule.day(date(3)).is_none());
        assert_eq!(state, before);
    }

    #[test]
    fn test_trial_rolls_back_on_drop() {
        let mut state = seeded_state();
        let before = state.clone();
        {
            let mut trial = state.trial(slot(2, 1), g(0));
            let _inner = trial.trial(slot(2, 3), Assignee::MakeUp);
        }
        assert_eq!(state, before);
    }

    #[test]
    fn test_trial_commit_keeps() {
        let mut state = seeded_state();
        let trial = state.trial(slot(2, 1), g(0));
        trial.commit();
        assert_eq!(state.schedule.slot_count(), 1);
        assert_eq!(state.memory.last_used(GroupId::new(0), Period::new(1)), Some(date(2)));
        assert_eq!(state.weekly.lessons_in(week_of(date(2))), 1);
    }
}
