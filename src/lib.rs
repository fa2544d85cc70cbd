//! Lesson rotation planning.
//!
//! Assigns a fixed roster of 22 lesson groups to the teaching periods of an
//! A/B (two-day) cycle timetable, so that each group is seen at most once per
//! week and does not repeat the same period too soon. Slots that cannot be
//! filled go to a make-up placeholder.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `CalendarSpec`, `Slot`, `Period`, `Roster`,
//!   `Assignee`, `PeriodMemory`, `Schedule`
//! - **`history`**: Ingestion of past assignments into seed memory
//! - **`scheduler`**: Backtracking and rotating-pool strategies, planning entry
//!   point, KPIs
//! - **`config`**: Thresholds, quotas and policies (`RotationConfig`)
//! - **`validation`**: Post-hoc audit of a finished schedule
//! - **`error`**: Input errors (`RotationError`)
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use u_rotation::models::{CalendarSpec, CycleDay};
//! use u_rotation::scheduler::{RotatingPoolSolver, RotationRequest};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
//! let plan = RotationRequest::new(CalendarSpec::new(start, CycleDay::One, 4))
//!     .plan(&RotatingPoolSolver::new())
//!     .unwrap();
//! assert_eq!(plan.solution.schedule.slot_count(), plan.slots.len());
//! ```

pub mod config;
pub mod error;
pub mod history;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use error::{Result, RotationError};
