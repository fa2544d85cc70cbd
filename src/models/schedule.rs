//! Schedule (solution) model.
//!
//! A schedule is an ordered list of [`DayEntry`] records, one per school day
//! that received at least one assignment. Each entry keeps its assignments in
//! slot order. An empty schedule is how solvers report "no feasible
//! schedule".

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Assignee, CycleDay, GroupId, Period, Roster, Slot};

/// All assignments of one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayEntry {
    pub date: NaiveDate,
    pub cycle: CycleDay,
    /// (period, assignee) pairs in slot order.
    pub assignments: Vec<(Period, Assignee)>,
}

impl DayEntry {
    pub fn new(date: NaiveDate, cycle: CycleDay) -> Self {
        Self {
            date,
            cycle,
            assignments: Vec::new(),
        }
    }

    /// Assignee of a period on this date.
    pub fn assignee_at(&self, period: Period) -> Option<Assignee> {
        self.assignments
            .iter()
            .find(|(p, _)| *p == period)
            .map(|&(_, a)| a)
    }

    /// Number of make-up placements on this date.
    pub fn make_up_count(&self) -> usize {
        self.assignments
            .iter()
            .filter(|(_, a)| a.is_make_up())
            .count()
    }

    /// Whether two make-ups sit next to each other in period order.
    pub fn has_adjacent_make_ups(&self) -> bool {
        self.assignments
            .windows(2)
            .any(|w| w[0].1.is_make_up() && w[1].1.is_make_up())
    }
}

/// A complete (or empty) rotation schedule.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_rotation::models::{Assignee, CycleDay, DayEntry, Period, Schedule};
///
/// let mut day = DayEntry::new(NaiveDate::from_ymd_opt(2024, 9, 2).unwrap(), CycleDay::One);
/// day.assignments.push((Period::new(1), Assignee::MakeUp));
/// let schedule = Schedule::from_days(vec![day]);
/// assert_eq!(schedule.slot_count(), 1);
/// assert_eq!(schedule.make_up_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Day entries in ascending date order.
    pub days: Vec<DayEntry>,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a schedule from day entries, sorting them by date.
    pub fn from_days(mut days: Vec<DayEntry>) -> Self {
        days.sort_by_key(|d| d.date);
        Self { days }
    }

    /// Whether no slot was assigned (the infeasible result).
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Entry for a date.
    pub fn day(&self, date: NaiveDate) -> Option<&DayEntry> {
        self.days
            .binary_search_by_key(&date, |d| d.date)
            .ok()
            .map(|i| &self.days[i])
    }

    /// Flat (date, period, assignee) view in schedule order.
    pub fn entries(&self) -> impl Iterator<Item = (NaiveDate, Period, Assignee)> + '_ {
        self.days
            .iter()
            .flat_map(|d| d.assignments.iter().map(move |&(p, a)| (d.date, p, a)))
    }

    /// Number of assigned slots.
    pub fn slot_count(&self) -> usize {
        self.days.iter().map(|d| d.assignments.len()).sum()
    }

    /// Number of real-group lessons.
    pub fn lesson_count(&self) -> usize {
        self.entries().filter(|(_, _, a)| !a.is_make_up()).count()
    }

    /// Number of make-up placements.
    pub fn make_up_count(&self) -> usize {
        self.days.iter().map(DayEntry::make_up_count).sum()
    }

    /// Every (date, period) a group was placed on, in date order.
    pub fn placements_of(&self, group: GroupId) -> Vec<(NaiveDate, Period)> {
        self.entries()
            .filter(|&(_, _, a)| a.group() == Some(group))
            .map(|(d, p, _)| (d, p))
            .collect()
    }

    /// Rows of (date, cycle number, period, label) for display or export.
    pub fn labelled_rows<'a>(
        &'a self,
        roster: &'a Roster,
        make_up_label: &'a str,
    ) -> impl Iterator<Item = (NaiveDate, u8, Period, &'a str)> + 'a {
        self.days.iter().flat_map(move |d| {
            d.assignments
                .iter()
                .map(move |&(p, a)| (d.date, d.cycle.number(), p, roster.label(a, make_up_label)))
        })
    }

    /// Appends an assignment, creating the day entry on first use.
    ///
    /// Unseen dates are inserted at their sorted position.
    pub(crate) fn push(&mut self, slot: Slot, assignee: Assignee) {
        let index = match self.days.binary_search_by_key(&slot.date, |d| d.date) {
            Ok(i) => i,
            Err(i) => {
                self.days.insert(i, DayEntry::new(slot.date, slot.cycle));
                i
            }
        };
        self.days[index].assignments.push((slot.period, assignee));
    }

    /// Removes the last assignment of a date, dropping the entry if it empties.
    pub(crate) fn pop(&mut self, date: NaiveDate) -> Option<(Period, Assignee)> {
        let index = self.days.binary_search_by_key(&date, |d| d.date).ok()?;
        let popped = self.days[index].assignments.pop();
        if self.days[index].assignments.is_empty() {
            self.days.remove(index);
        }
        popped
    }
}
