//! Per-group, per-period assignment memory.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::{GroupId, Period};

/// Most recent date each group was assigned to each period.
///
/// Seeded from history, then updated (and rolled back) during search.
/// Ordered storage keeps equality checks and iteration deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeriodMemory {
    last: BTreeMap<(GroupId, Period), NaiveDate>,
}

impl PeriodMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last date `group` had `period`, if any.
    #[inline]
    pub fn last_used(&self, group: GroupId, period: Period) -> Option<NaiveDate> {
        self.last.get(&(group, period)).copied()
    }

    /// Whole days between the last use and `date`. `None` if never used.
    pub fn days_since(&self, group: GroupId, period: Period, date: NaiveDate) -> Option<i64> {
        self.last_used(group, period)
            .map(|last| date.signed_duration_since(last).num_days())
    }

    /// Whether `group` may take `period` on `date` under a spacing threshold.
    ///
    /// Never-used pairs always qualify.
    #[inline]
    pub fn is_spaced(&self, group: GroupId, period: Period, date: NaiveDate, days: i64) -> bool {
        self.days_since(group, period, date)
            .map_or(true, |since| since >= days)
    }

    /// Records a historical use, keeping the later date on conflict.
    pub fn observe(&mut self, group: GroupId, period: Period, date: NaiveDate) {
        self.last
            .entry((group, period))
            .and_modify(|last| *last = (*last).max(date))
            .or_insert(date);
    }

    /// Overwrites the last use and returns the previous value.
    pub fn replace(
        &mut self,
        group: GroupId,
        period: Period,
        date: NaiveDate,
    ) -> Option<NaiveDate> {
        self.last.insert((group, period), date)
    }

    /// Puts back a value returned by [`replace`](Self::replace).
    pub fn restore(&mut self, group: GroupId, period: Period, previous: Option<NaiveDate>) {
        match previous {
            Some(date) => {
                self.last.insert((group, period), date);
            }
            None => {
                self.last.remove(&(group, period));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.last.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_empty()
    }

    /// All entries in (group, period) order.
    pub fn iter(&self) -> impl Iterator<Item = (GroupId, Period, NaiveDate)> + '_ {
        self.last.iter().map(|(&(g, p), &d)| (g, p, d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_observe_keeps_latest() {
        let g = GroupId::new(0);
        let p = Period::new(1);
        let mut mem = PeriodMemory::new();
        mem.observe(g, p, date(2024, 5, 10));
        mem.observe(g, p, date(2024, 5, 3));
        assert_eq!(mem.last_used(g, p), Some(date(2024, 5, 10)));
        mem.observe(g, p, date(2024, 5, 17));
        assert_eq!(mem.last_used(g, p), Some(date(2024, 5, 17)));
        assert_eq!(mem.len(), 1);
    }

    #[test]
    fn test_spacing() {
        let g = GroupId::new(3);
        let p = Period::new(2);
        let mut mem = PeriodMemory::new();
        assert!(mem.is_spaced(g, p, date(2024, 9, 2), 28));

        mem.observe(g, p, date(2024, 8, 5));
        assert_eq!(mem.days_since(g, p, date(2024, 9, 2)), Some(28));
        assert!(mem.is_spaced(g, p, date(2024, 9, 2), 28));
        assert!(!mem.is_spaced(g, p, date(2024, 9, 1), 28));
        assert!(mem.is_spaced(g, p, date(2024, 9, 1), 21));
    }

    #[test]
    fn test_replace_and_restore() {
        let g = GroupId::new(1);
        let p = Period::new(4);
        let mut mem = PeriodMemory::new();
        mem.observe(g, p, date(2024, 1, 1));
        let before = mem.clone();

        let prev = mem.replace(g, p, date(2024, 2, 1));
        assert_eq!(prev, Some(date(2024, 1, 1)));
        mem.restore(g, p, prev);
        assert_eq!(mem, before);

        let other = Period::new(5);
        let prev = mem.replace(g, other, date(2024, 2, 1));
        assert_eq!(prev, None);
        mem.restore(g, other, prev);
        assert_eq!(mem, before);
    }
}
