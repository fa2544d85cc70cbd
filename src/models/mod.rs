//! Rotation domain models.
//!
//! Provides the core data types for a lesson rotation: the calendar and its
//! slots, the group roster, per-period memory, and the resulting schedule.
//!
//! # Vocabulary
//!
//! | Type | Meaning |
//! |------|---------|
//! | [`Slot`] | One (date, period) position that needs exactly one assignee |
//! | [`GroupId`] / [`Roster`] | The 22 recurring lesson groups |
//! | [`Assignee`] | A group or the make-up placeholder |
//! | [`PeriodMemory`] | Last date each group had each period |
//! | [`Schedule`] / [`DayEntry`] | The solver output |

mod calendar;
mod group;
mod memory;
mod schedule;

pub use calendar::{
    is_weekday, week_of, CalendarSpec, CycleDay, Period, PeriodTable, SchoolDays, Slot,
};
pub use group::{Assignee, GroupId, Roster, ROSTER_SIZE};
pub use memory::PeriodMemory;
pub use schedule::{DayEntry, Schedule};
