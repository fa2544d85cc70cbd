//! Schedule validation.
//!
//! Audits a finished schedule against the rotation invariants. Detects:
//! - Assignments on weekends or on dates with no generated slots
//! - Same-group, same-period repeats closer than the spacing threshold
//!   (history seed dates count as earlier uses)
//! - A group taught twice in one week
//! - More than one make-up on a date, or adjacent make-ups
//! - Slots left unassigned, assigned twice, or invented
//!
//! Make-ups are exempt from the spacing and weekly checks.

use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

use crate::models::{is_weekday, week_of, Assignee, GroupId, Period, Roster};
use crate::models::{PeriodMemory, Schedule};
use crate::scheduler::Problem;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A day entry falls on a weekend or a date without slots.
    NonSchoolDay,
    /// A group repeats a period within the spacing threshold.
    SpacingViolation,
    /// A group appears twice in one week.
    WeeklyDuplicate,
    /// Two make-ups on one date, or adjacent make-ups.
    MakeUpCluster,
    /// A generated slot has no assignment.
    MissingSlot,
    /// An assignment for a slot that was not generated, or a second one.
    UnexpectedSlot,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a schedule for `problem` under `spacing_days`.
///
/// # Returns
/// `Ok(())` if every invariant holds, `Err(errors)` with all detected issues.
pub fn validate_schedule(
    schedule: &Schedule,
    problem: &Problem<'_>,
    spacing_days: i64,
) -> ValidationResult {
    let mut errors = Vec::new();

    check_days(schedule, problem, &mut errors);
    check_coverage(schedule, problem, &mut errors);
    check_spacing(schedule, problem.seed, problem.roster, spacing_days, &mut errors);
    check_weekly(schedule, problem.roster, &mut errors);
    check_make_ups(schedule, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_days(schedule: &Schedule, problem: &Problem<'_>, errors: &mut Vec<ValidationError>) {
    let slot_dates: HashSet<NaiveDate> = problem.slots.iter().map(|s| s.date).collect();
    for day in &schedule.days {
        if !is_weekday(day.date) || !slot_dates.contains(&day.date) {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonSchoolDay,
                format!("Assignments on non-school day {}", day.date),
            ));
        }
    }
}

fn check_coverage(schedule: &Schedule, problem: &Problem<'_>, errors: &mut Vec<ValidationError>) {
    let mut pending: HashMap<(NaiveDate, Period), usize> = HashMap::new();
    for slot in problem.slots {
        *pending.entry((slot.date, slot.period)).or_insert(0) += 1;
    }

    for (date, period, _) in schedule.entries() {
        match pending.get_mut(&(date, period)) {
            Some(n) if *n > 0 => *n -= 1,
            _ => errors.push(ValidationError::new(
                ValidationErrorKind::UnexpectedSlot,
                format!("Unexpected assignment on {date} period {period}"),
            )),
        }
    }

    let mut missing: Vec<_> = pending
        .into_iter()
        .filter(|&(_, n)| n > 0)
        .map(|(key, _)| key)
        .collect();
    missing.sort();
    for (date, period) in missing {
        errors.push(ValidationError::new(
            ValidationErrorKind::MissingSlot,
            format!("No assignment on {date} period {period}"),
        ));
    }
}

fn check_spacing(
    schedule: &Schedule,
    seed: &PeriodMemory,
    roster: &Roster,
    spacing_days: i64,
    errors: &mut Vec<ValidationError>,
) {
    let mut last: HashMap<(GroupId, Period), NaiveDate> =
        seed.iter().map(|(g, p, d)| ((g, p), d)).collect();

    for (date, period, assignee) in schedule.entries() {
        let Assignee::Group(group) = assignee else {
            continue;
        };
        if let Some(prev) = last.insert((group, period), date) {
            let gap = (date - prev).num_days();
            if gap < spacing_days {
                errors.push(ValidationError::new(
                    ValidationErrorKind::SpacingViolation,
                    format!(
                        "Group '{}' has period {period} on {prev} and {date} ({gap} days apart)",
                        roster.name(group)
                    ),
                ));
            }
        }
    }
}

fn check_weekly(schedule: &Schedule, roster: &Roster, errors: &mut Vec<ValidationError>) {
    let mut seen: HashSet<(NaiveDate, GroupId)> = HashSet::new();
    for (date, _, assignee) in schedule.entries() {
        if let Some(group) = assignee.group() {
            let week = week_of(date);
            if !seen.insert((week, group)) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::WeeklyDuplicate,
                    format!(
                        "Group '{}' appears twice in the week of {week}",
                        roster.name(group)
                    ),
                ));
            }
        }
    }
}

fn check_make_ups(schedule: &Schedule, errors: &mut Vec<ValidationError>) {
    for day in &schedule.days {
        let count = day.make_up_count();
        if count > 1 {
            errors.push(ValidationError::new(
                ValidationErrorKind::MakeUpCluster,
                format!("{count} make-ups on {}", day.date),
            ));
        }
        if day.has_adjacent_make_ups() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MakeUpCluster,
                format!("Adjacent make-ups on {}", day.date),
            ));
        }
    }
}
