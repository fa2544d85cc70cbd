//! School calendar and slot generation.
//!
//! Turns a horizon (start date, starting cycle day, number of weeks,
//! excluded dates) into the ordered list of assignable [`Slot`]s.
//!
//! # Day Model
//! Only weekdays that are not excluded are school days. School days alternate
//! between cycle day 1 and cycle day 2; skipped days (weekends, holidays) do
//! not advance the cycle. Each cycle day has its own fixed set of periods,
//! given by a [`PeriodTable`].
//!
//! # Weeks
//! A week is identified by the date of its Monday (see [`week_of`]).

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, RotationError};

/// Alternating day type that selects the active period set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CycleDay {
    /// Cycle day 1 (odd).
    One,
    /// Cycle day 2 (even).
    Two,
}

impl CycleDay {
    /// The cycle day that follows this one.
    #[inline]
    pub fn next(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    /// `1` or `2`.
    #[inline]
    pub fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

impl TryFrom<u8> for CycleDay {
    type Error = RotationError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(RotationError::InvalidCycle(other)),
        }
    }
}

impl From<CycleDay> for u8 {
    fn from(cycle: CycleDay) -> Self {
        cycle.number()
    }
}

/// A class period label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Period(u8);

impl Period {
    pub const fn new(number: u8) -> Self {
        Self(number)
    }

    #[inline]
    pub fn number(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parses `"3"`, `"P3"`, `"p3"` or `"Period 3"`.
impl FromStr for Period {
    type Err = RotationError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        let digits = lower
            .strip_prefix("period")
            .or_else(|| lower.strip_prefix('p'))
            .unwrap_or(lower.as_str())
            .trim();
        digits
            .parse::<u8>()
            .map(Period)
            .map_err(|_| RotationError::InvalidPeriod(trimmed.to_string()))
    }
}

/// Fixed period sets for each cycle day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTable {
    /// Periods taught on cycle day 1, in teaching order.
    pub day_one: Vec<Period>,
    /// Periods taught on cycle day 2, in teaching order.
    pub day_two: Vec<Period>,
}

impl PeriodTable {
    pub fn new(day_one: Vec<Period>, day_two: Vec<Period>) -> Self {
        Self { day_one, day_two }
    }

    /// Periods active on the given cycle day.
    pub fn periods_for(&self, cycle: CycleDay) -> &[Period] {
        match cycle {
            CycleDay::One => &self.day_one,
            CycleDay::Two => &self.day_two,
        }
    }

    /// Fails if either cycle day has no periods.
    pub fn ensure_non_empty(&self) -> Result<()> {
        for cycle in [CycleDay::One, CycleDay::Two] {
            if self.periods_for(cycle).is_empty() {
                return Err(RotationError::EmptyPeriodSet(cycle.number()));
            }
        }
        Ok(())
    }
}

/// Four periods on cycle day 1 (1, 3, 5, 7), five on cycle day 2 (2, 4, 6, 8, 9).
impl Default for PeriodTable {
    fn default() -> Self {
        Self {
            day_one: [1, 3, 5, 7].into_iter().map(Period).collect(),
            day_two: [2, 4, 6, 8, 9].into_iter().map(Period).collect(),
        }
    }
}

/// One assignable (date, period) position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub date: NaiveDate,
    pub period: Period,
    pub cycle: CycleDay,
}

impl Slot {
    /// Monday of the slot's week.
    #[inline]
    pub fn week(&self) -> NaiveDate {
        week_of(self.date)
    }
}

/// Monday of the week containing `date`.
pub fn week_of(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as u64;
    date - Days::new(offset)
}

/// Whether `date` falls Monday through Friday.
#[inline]
pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Walks school days, pairing each with its cycle day.
///
/// Unbounded unless built with an end date (exclusive).
#[derive(Debug, Clone)]
pub struct SchoolDays<'a> {
    next: Option<NaiveDate>,
    cycle: CycleDay,
    excluded: &'a BTreeSet<NaiveDate>,
    end: Option<NaiveDate>,
}

impl<'a> SchoolDays<'a> {
    pub fn new(start: NaiveDate, cycle: CycleDay, excluded: &'a BTreeSet<NaiveDate>) -> Self {
        Self {
            next: Some(start),
            cycle,
            excluded,
            end: None,
        }
    }

    /// Stops before `end`.
    pub fn until(mut self, end: NaiveDate) -> Self {
        self.end = Some(end);
        self
    }
}

impl Iterator for SchoolDays<'_> {
    type Item = (NaiveDate, CycleDay);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let date = self.next?;
            if self.end.is_some_and(|end| date >= end) {
                self.next = None;
                return None;
            }
            self.next = date.succ_opt();

            if !is_weekday(date) || self.excluded.contains(&date) {
                continue;
            }

            let cycle = self.cycle;
            self.cycle = cycle.next();
            return Some((date, cycle));
        }
    }
}

/// The planning horizon.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_rotation::models::{CalendarSpec, CycleDay, PeriodTable};
///
/// // Saturday start: the first slot lands on Monday.
/// let start = NaiveDate::from_ymd_opt(2024, 9, 7).unwrap();
/// let spec = CalendarSpec::new(start, CycleDay::One, 1);
/// let slots = spec.slots(&PeriodTable::default()).unwrap();
/// assert_eq!(slots[0].date, NaiveDate::from_ymd_opt(2024, 9, 9).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSpec {
    /// First calendar day considered.
    pub start: NaiveDate,
    /// Cycle day of the first school day.
    pub start_cycle: CycleDay,
    /// Horizon length in weeks (`weeks * 7` calendar days).
    pub weeks: u32,
    /// Dates with no classes (holidays, closures).
    #[serde(default)]
    pub excluded: BTreeSet<NaiveDate>,
}

impl CalendarSpec {
    pub fn new(start: NaiveDate, start_cycle: CycleDay, weeks: u32) -> Self {
        Self {
            start,
            start_cycle,
            weeks,
            excluded: BTreeSet::new(),
        }
    }

    /// Excludes one date.
    pub fn with_excluded(mut self, date: NaiveDate) -> Self {
        self.excluded.insert(date);
        self
    }

    /// Excludes several dates.
    pub fn with_excluded_dates(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.excluded.extend(dates);
        self
    }

    /// First calendar day after the horizon.
    pub fn end(&self) -> Result<NaiveDate> {
        self.start
            .checked_add_days(Days::new(u64::from(self.weeks) * 7))
            .ok_or(RotationError::HorizonOverflow(self.weeks))
    }

    /// Whether `date` is a weekday that is not excluded.
    pub fn is_school_day(&self, date: NaiveDate) -> bool {
        is_weekday(date) && !self.excluded.contains(&date)
    }

    /// School days of the horizon with their cycle day.
    pub fn school_days(&self) -> Result<SchoolDays<'_>> {
        let end = self.end()?;
        Ok(SchoolDays::new(self.start, self.start_cycle, &self.excluded).until(end))
    }

    /// Enumerates every slot of the horizon in (date, period) order.
    pub fn slots(&self, periods: &PeriodTable) -> Result<Vec<Slot>> {
        if self.weeks == 0 {
            return Err(RotationError::EmptyHorizon);
        }
        periods.ensure_non_empty()?;

        let slots = self
            .school_days()?
            .flat_map(|(date, cycle)| {
                periods.periods_for(cycle).iter().map(move |&period| Slot {
                    date,
                    period,
                    cycle,
                })
            })
            .collect();
        Ok(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_cycle_day() {
        assert_eq!(CycleDay::One.next(), CycleDay::Two);
        assert_eq!(CycleDay::Two.next(), CycleDay::One);
        assert_eq!(CycleDay::try_from(2).unwrap(), CycleDay::Two);
        assert_eq!(CycleDay::try_from(3), Err(RotationError::InvalidCycle(3)));
    }

    #[test]
    fn test_period_parse() {
        assert_eq!("3".parse::<Period>().unwrap(), Period::new(3));
        assert_eq!(" P4 ".parse::<Period>().unwrap(), Period::new(4));
        assert_eq!("p7".parse::<Period>().unwrap(), Period::new(7));
        assert_eq!("Period 9".parse::<Period>().unwrap(), Period::new(9));
        assert!("P?".parse::<Period>().is_err());
        assert!("".parse::<Period>().is_err());
    }

    #[test]
    fn test_week_of() {
        // 2024-09-04 is a Wednesday
        assert_eq!(week_of(date(2024, 9, 4)), date(2024, 9, 2));
        assert_eq!(week_of(date(2024, 9, 2)), date(2024, 9, 2));
        assert_eq!(week_of(date(2024, 9, 8)), date(2024, 9, 2)); // Sunday
    }

    #[test]
    fn test_monday_start_one_week() {
        let spec = CalendarSpec::new(date(2024, 9, 2), CycleDay::One, 1);
        let table = PeriodTable::default();
        let slots = spec.slots(&table).unwrap();

        // Mon(1) Tue(2) Wed(1) Thu(2) Fri(1): 4+5+4+5+4
        assert_eq!(slots.len(), 22);
        let first_day: Vec<Period> = slots
            .iter()
            .filter(|s| s.date == date(2024, 9, 2))
            .map(|s| s.period)
            .collect();
        assert_eq!(first_day, table.day_one);
        assert!(slots.iter().all(|s| is_weekday(s.date)));
    }

    #[test]
    fn test_slots_ordered() {
        let spec = CalendarSpec::new(date(2024, 9, 2), CycleDay::Two, 3);
        let slots = spec.slots(&PeriodTable::default()).unwrap();
        for pair in slots.windows(2) {
            assert!(pair[0].date <= pair[1].date);
            if pair[0].date == pair[1].date {
                assert!(pair[0].period < pair[1].period);
            }
        }
        assert_eq!(slots[0].cycle, CycleDay::Two);
        assert_eq!(slots[0].period, Period::new(2));
    }

    #[test]
    fn test_saturday_start_moves_to_monday() {
        let spec = CalendarSpec::new(date(2024, 9, 7), CycleDay::One, 1);
        let slots = spec.slots(&PeriodTable::default()).unwrap();
        assert_eq!(slots[0].date, date(2024, 9, 9));
        assert_eq!(slots[0].cycle, CycleDay::One);
        // Sat..Fri covers Mon-Fri of the following week
        assert_eq!(slots.last().unwrap().date, date(2024, 9, 13));
    }

    #[test]
    fn test_excluded_dates_do_not_advance_cycle() {
        let spec = CalendarSpec::new(date(2024, 9, 2), CycleDay::One, 1)
            .with_excluded(date(2024, 9, 3));
        let days: Vec<(NaiveDate, CycleDay)> = spec.school_days().unwrap().collect();
        assert_eq!(
            days,
            vec![
                (date(2024, 9, 2), CycleDay::One),
                (date(2024, 9, 4), CycleDay::Two),
                (date(2024, 9, 5), CycleDay::One),
                (date(2024, 9, 6), CycleDay::Two),
            ]
        );
        let slots = spec.slots(&PeriodTable::default()).unwrap();
        assert!(slots.iter().all(|s| s.date != date(2024, 9, 3)));
    }

    #[test]
    fn test_cycle_continues_across_weekend() {
        let spec = CalendarSpec::new(date(2024, 9, 2), CycleDay::One, 2);
        let days: Vec<(NaiveDate, CycleDay)> = spec.school_days().unwrap().collect();
        assert_eq!(days.len(), 10);
        // Friday is day 1, so the next Monday is day 2
        assert_eq!(days[4], (date(2024, 9, 6), CycleDay::One));
        assert_eq!(days[5], (date(2024, 9, 9), CycleDay::Two));
    }

    #[test]
    fn test_empty_horizon() {
        let spec = CalendarSpec::new(date(2024, 9, 2), CycleDay::One, 0);
        assert_eq!(
            spec.slots(&PeriodTable::default()),
            Err(RotationError::EmptyHorizon)
        );
    }

    #[test]
    fn test_horizon_overflow() {
        let spec = CalendarSpec::new(date(2024, 9, 2), CycleDay::One, u32::MAX);
        assert_eq!(spec.end(), Err(RotationError::HorizonOverflow(u32::MAX)));
        assert_eq!(
            spec.slots(&PeriodTable::default()),
            Err(RotationError::HorizonOverflow(u32::MAX))
        );
        let spec = CalendarSpec::new(date(2024, 9, 2), CycleDay::One, 2);
        assert_eq!(spec.end(), Ok(date(2024, 9, 16)));
    }

    #[test]
    fn test_empty_period_set() {
        let spec = CalendarSpec::new(date(2024, 9, 2), CycleDay::One, 1);
        let table = PeriodTable::new(vec![Period::new(1)], vec![]);
        assert_eq!(spec.slots(&table), Err(RotationError::EmptyPeriodSet(2)));
    }

    #[test]
    fn test_unbounded_school_days() {
        let excluded = BTreeSet::new();
        let days: Vec<_> = SchoolDays::new(date(2024, 9, 6), CycleDay::Two, &excluded)
            .take(3)
            .collect();
        assert_eq!(
            days,
            vec![
                (date(2024, 9, 6), CycleDay::Two),
                (date(2024, 9, 9), CycleDay::One),
                (date(2024, 9, 10), CycleDay::Two),
            ]
        );
    }
}
