//! Rotation quality metrics.
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Lessons | Slots given to a real group |
//! | Make-ups | Slots given to the make-up placeholder |
//! | Lessons per group | Fairness of the rotation |
//! | Min period gap | Smallest day gap between two uses of one period by one group |

use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::models::{week_of, GroupId, Period, Roster, Schedule};

/// Summary statistics of a schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationKpi {
    /// School days with at least one assignment.
    pub school_days: usize,
    /// Distinct weeks touched.
    pub weeks: usize,
    pub lesson_count: usize,
    pub make_up_count: usize,
    /// Lessons per group, in roster order.
    pub lessons_by_group: Vec<(String, usize)>,
    /// Smallest same-group, same-period gap in days (`None` if no repeats).
    pub min_period_gap_days: Option<i64>,
}

impl RotationKpi {
    /// Computes metrics for a schedule built over `roster`.
    pub fn calculate(schedule: &Schedule, roster: &Roster) -> Self {
        let mut counts = vec![0usize; roster.len()];
        let mut last: HashMap<(GroupId, Period), NaiveDate> = HashMap::new();
        let mut min_gap: Option<i64> = None;
        let mut weeks = BTreeSet::new();

        for (date, period, assignee) in schedule.entries() {
            weeks.insert(week_of(date));
            let Some(group) = assignee.group() else {
                continue;
            };
            counts[group.index()] += 1;
            if let Some(prev) = last.insert((group, period), date) {
                let gap = (date - prev).num_days();
                min_gap = Some(min_gap.map_or(gap, |m| m.min(gap)));
            }
        }

        let lessons_by_group = roster
            .names()
            .iter()
            .cloned()
            .zip(counts)
            .collect();

        Self {
            school_days: schedule.days.len(),
            weeks: weeks.len(),
            lesson_count: schedule.lesson_count(),
            make_up_count: schedule.make_up_count(),
            lessons_by_group,
            min_period_gap_days: min_gap,
        }
    }

    /// Spread between the most and least scheduled group.
    pub fn lesson_spread(&self) -> usize {
        let max = self.lessons_by_group.iter().map(|(_, n)| *n).max().unwrap_or(0);
        let min = self.lessons_by_group.iter().map(|(_, n)| *n).min().unwrap_or(0);
        max - min
    }

    /// Share of slots that are make-ups (0.0..1.0).
    pub fn make_up_rate(&self) -> f64 {
        let total = self.lesson_count + self.make_up_count;
        if total == 0 {
            0.0
        } else {
            self.make_up_count as f64 / total as f64
        }
    }
}

impl fmt::Display for RotationKpi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} lessons, {} make-ups over {} days / {} weeks, spread {}",
            self.lesson_count,
            self.make_up_count,
            self.school_days,
            self.weeks,
            self.lesson_spread()
        )?;
        if let Some(gap) = self.min_period_gap_days {
            write!(f, ", min period gap {gap}d")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Assignee, CycleDay, DayEntry};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
    }

    fn g(i: usize) -> Assignee {
        Assignee::Group(GroupId::new(i))
    }

    fn sample() -> Schedule {
        let mut mon = DayEntry::new(date(2), CycleDay::One);
        mon.assignments = vec![(Period::new(1), g(0)), (Period::new(3), Assignee::MakeUp)];
        let mut next_mon = DayEntry::new(date(9), CycleDay::Two);
        next_mon.assignments = vec![(Period::new(2), g(1))];
        let mut later = DayEntry::new(date(30), CycleDay::One);
        later.assignments = vec![(Period::new(1), g(0)), (Period::new(3), g(1))];
        Schedule::from_days(vec![later, mon, next_mon])
    }

    #[test]
    fn test_kpi_counts() {
        let kpi = RotationKpi::calculate(&sample(), &Roster::letters());
        assert_eq!(kpi.school_days, 3);
        assert_eq!(kpi.weeks, 3);
        assert_eq!(kpi.lesson_count, 4);
        assert_eq!(kpi.make_up_count, 1);
        assert_eq!(kpi.lessons_by_group[0], ("A".to_string(), 2));
        assert_eq!(kpi.lessons_by_group[1], ("B".to_string(), 2));
        assert_eq!(kpi.lessons_by_group[2], ("C".to_string(), 0));
        assert_eq!(kpi.lesson_spread(), 2);
        assert!((kpi.make_up_rate() - 0.2).abs() < 1e-10);
    }

    #[test]
    fn test_min_period_gap() {
        let kpi = RotationKpi::calculate(&sample(), &Roster::letters());
        // A in period 1 on 2nd and 30th
        assert_eq!(kpi.min_period_gap_days, Some(28));
    }

    #[test]
    fn test_kpi_empty() {
        let kpi = RotationKpi::calculate(&Schedule::new(), &Roster::letters());
        assert_eq!(kpi.lesson_count, 0);
        assert_eq!(kpi.min_period_gap_days, None);
        assert_eq!(kpi.make_up_rate(), 0.0);
        assert_eq!(kpi.to_string(), "0 lessons, 0 make-ups over 0 days / 0 weeks, spread 0");
    }
}
