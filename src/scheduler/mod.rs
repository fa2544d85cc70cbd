//! Rotation solvers and planning entry point.
//!
//! Two interchangeable [`AssignmentStrategy`] implementations fill every slot
//! of a [`Problem`] with a group or a make-up:
//!
//! - [`BacktrackingSolver`]: exhaustive depth-first search with a
//!   least-recently-used candidate order. Tries the strict spacing threshold
//!   first and the relaxed one second; returns an empty schedule if both fail.
//! - [`RotatingPoolSolver`]: one forward pass over rotating roster pools with a
//!   three-tier fallback. Never backtracks.
//!
//! [`RotationRequest`] ties the pieces together: it resolves the roster and
//! seed memory from history, generates slots, and runs a strategy.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use u_rotation::models::{CalendarSpec, CycleDay};
//! use u_rotation::scheduler::{BacktrackingSolver, RotationRequest};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
//! let request = RotationRequest::new(CalendarSpec::new(start, CycleDay::One, 2));
//! let plan = request.plan(&BacktrackingSolver::new()).unwrap();
//!
//! assert!(plan.solution.is_feasible());
//! assert_eq!(plan.solution.schedule.slot_count(), plan.slots.len());
//! assert_eq!(plan.solution.spacing_days, Some(28));
//! ```

mod backtracking;
mod kpi;
mod rotating;
mod state;

pub use backtracking::BacktrackingSolver;
pub use kpi::RotationKpi;
pub use rotating::{PoolRotation, RotatingPoolSolver, POOL_COUNT};

use log::info;
use serde::Serialize;
use std::fmt::Debug;

use crate::config::RotationConfig;
use crate::error::Result;
use crate::history::{History, HistoryIngester, Seed};
use crate::models::{CalendarSpec, PeriodMemory, Roster, Schedule, Slot};

/// Everything a strategy needs. Immutable during solving.
#[derive(Debug, Clone, Copy)]
pub struct Problem<'a> {
    /// Slots in (date, period) order.
    pub slots: &'a [Slot],
    pub roster: &'a Roster,
    /// History-derived memory. Read-only; each pass works on a copy.
    pub seed: &'a PeriodMemory,
    pub config: &'a RotationConfig,
}

/// Result of one strategy run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Solution {
    /// Complete schedule, or empty when no feasible schedule was found.
    pub schedule: Schedule,
    /// Spacing the schedule is guaranteed to meet: the threshold of the pass
    /// that succeeded, or a smaller gap the rotating pool had to commit.
    pub spacing_days: Option<i64>,
    /// Search nodes visited across all passes.
    pub steps: u64,
}

impl Solution {
    /// The "no feasible schedule" result.
    pub fn infeasible(steps: u64) -> Self {
        Self {
            schedule: Schedule::new(),
            spacing_days: None,
            steps,
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.spacing_days.is_some()
    }
}

/// A slot-filling strategy.
///
/// Implementations must return either a schedule covering every slot of the
/// problem, or [`Solution::infeasible`]. They never return a partial schedule.
pub trait AssignmentStrategy: Debug {
    /// Strategy name (for logs).
    fn name(&self) -> &'static str;

    /// Fills every slot of `problem`.
    fn solve(&self, problem: &Problem<'_>) -> Solution;
}

/// Inputs for planning one horizon.
#[derive(Debug, Clone)]
pub struct RotationRequest {
    pub calendar: CalendarSpec,
    /// Already-known roster. Defaults to letters `A`..`V` without history.
    pub roster: Option<Roster>,
    pub history: Option<History>,
    pub config: RotationConfig,
}

/// A solved horizon.
#[derive(Debug, Clone)]
pub struct Plan {
    pub roster: Roster,
    pub slots: Vec<Slot>,
    pub seed: PeriodMemory,
    pub solution: Solution,
}

impl Plan {
    /// Summary metrics of the solution.
    pub fn kpi(&self) -> RotationKpi {
        RotationKpi::calculate(&self.solution.schedule, &self.roster)
    }

    /// Borrowed problem view, e.g. for validation.
    pub fn problem<'a>(&'a self, config: &'a RotationConfig) -> Problem<'a> {
        Problem {
            slots: &self.slots,
            roster: &self.roster,
            seed: &self.seed,
            config,
        }
    }
}

impl RotationRequest {
    pub fn new(calendar: CalendarSpec) -> Self {
        Self {
            calendar,
            roster: None,
            history: None,
            config: RotationConfig::default(),
        }
    }

    pub fn with_roster(mut self, roster: Roster) -> Self {
        self.roster = Some(roster);
        self
    }

    pub fn with_history(mut self, history: History) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_config(mut self, config: RotationConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolves roster and seed memory.
    ///
    /// Fails if a group is named like the make-up label.
    pub fn seed(&self) -> Result<Seed> {
        let ingester = HistoryIngester::new(&self.config);
        let seed = match &self.history {
            Some(history) => ingester.ingest(history, self.roster.as_ref())?,
            None => Seed::empty(self.roster.clone().unwrap_or_default()),
        };
        ingester.check_roster(&seed.roster)?;
        Ok(seed)
    }

    /// Seeds, generates slots and runs `strategy`.
    pub fn plan(&self, strategy: &dyn AssignmentStrategy) -> Result<Plan> {
        let Seed { roster, memory } = self.seed()?;
        let slots = self.calendar.slots(&self.config.periods)?;

        info!(
            "planning {} slots over {} weeks from {} with {}",
            slots.len(),
            self.calendar.weeks,
            self.calendar.start,
            strategy.name()
        );

        let solution = strategy.solve(&Problem {
            slots: &slots,
            roster: &roster,
            seed: &memory,
            config: &self.config,
        });

        let plan = Plan {
            roster,
            slots,
            seed: memory,
            solution,
        };
        if plan.solution.is_feasible() {
            info!("{} finished: {}", strategy.name(), plan.kpi());
        } else {
            info!("{} found no feasible schedule", strategy.name());
        }
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MercyPolicy;
    use crate::error::RotationError;
    use crate::history::HistoryRecord;
    use crate::models::{Assignee, CycleDay, Period};
    use crate::validation::validate_schedule;
    use chrono::{Days, NaiveDate};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()
    }

    /// Checks a plan against the spacing its solution reports.
    fn assert_valid(plan: &Plan, config: &RotationConfig) {
        let spacing = plan.solution.spacing_days.expect("feasible");
        assert_eq!(
            validate_schedule(&plan.solution.schedule, &plan.problem(config), spacing),
            Ok(())
        );
    }

    fn strategies() -> Vec<Box<dyn AssignmentStrategy>> {
        vec![
            Box::new(BacktrackingSolver::new()),
            Box::new(RotatingPoolSolver::new()),
        ]
    }

    #[test]
    fn test_sixteen_week_horizon_is_clean() {
        init_logger();
        let request = RotationRequest::new(CalendarSpec::new(monday(), CycleDay::One, 16));

        for strategy in strategies() {
            let plan = request.plan(strategy.as_ref()).unwrap();
            let spacing = plan.solution.spacing_days.expect("feasible");
            assert_eq!(spacing, 28, "{}", strategy.name());

            assert_valid(&plan, &request.config);

            let first = &plan.solution.schedule.days[0];
            assert_eq!(first.date, monday());
            let periods: Vec<Period> = first.assignments.iter().map(|&(p, _)| p).collect();
            assert_eq!(periods, request.config.periods.day_one);
        }
    }

    #[test]
    fn test_saturday_start() {
        let saturday = NaiveDate::from_ymd_opt(2024, 9, 7).unwrap();
        let request = RotationRequest::new(CalendarSpec::new(saturday, CycleDay::One, 2));
        let plan = request.plan(&BacktrackingSolver::new()).unwrap();
        assert_eq!(
            plan.solution.schedule.days[0].date,
            NaiveDate::from_ymd_opt(2024, 9, 9).unwrap()
        );
    }

    #[test]
    fn test_history_blocks_recent_group() {
        // X had period 1 fifteen days before the first period-1 slot.
        let first = monday();
        let mut records: Vec<HistoryRecord> = Roster::letters()
            .names()
            .iter()
            .map(|g| HistoryRecord::new(first - Days::new(60), "9", g.clone()))
            .collect();
        records.push(HistoryRecord::new(first - Days::new(15), "1", "A"));

        let request = RotationRequest::new(CalendarSpec::new(first, CycleDay::One, 4))
            .with_history(History::Records(records));

        for strategy in strategies() {
            let plan = request.plan(strategy.as_ref()).unwrap();
            assert_valid(&plan, &request.config);
            let a = plan.roster.id_of("A").unwrap();
            let first_day = &plan.solution.schedule.days[0];
            assert_ne!(
                first_day.assignee_at(Period::new(1)),
                Some(Assignee::Group(a)),
                "{}",
                strategy.name()
            );
            for (date, period) in plan.solution.schedule.placements_of(a) {
                if period == Period::new(1) {
                    assert!(date >= first + Days::new(13), "{}", strategy.name());
                }
            }
        }
    }

    #[test]
    fn test_explicit_roster_without_history() {
        let names: Vec<String> = (1..=22).map(|i| format!("Section {i}")).collect();
        let roster = Roster::new(names).unwrap();
        let request = RotationRequest::new(CalendarSpec::new(monday(), CycleDay::Two, 1))
            .with_roster(roster.clone());
        let plan = request.plan(&RotatingPoolSolver::new()).unwrap();
        assert_eq!(plan.roster, roster);
        assert_eq!(plan.solution.schedule.slot_count(), plan.slots.len());
    }

    #[test]
    fn test_roster_mismatch_is_an_error() {
        let records = vec![HistoryRecord::new(monday() - Days::new(3), "1", "A")];
        let request = RotationRequest::new(CalendarSpec::new(monday(), CycleDay::One, 1))
            .with_history(History::Records(records));
        assert!(request.plan(&BacktrackingSolver::new()).is_err());
    }

    #[test]
    fn test_every_policy_validates_at_reported_spacing() {
        // every group had period 1 ten days before the start
        let records: Vec<HistoryRecord> = Roster::letters()
            .names()
            .iter()
            .map(|g| HistoryRecord::new(monday() - Days::new(10), "1", g.clone()))
            .collect();

        for mercy in [MercyPolicy::RequireThreshold, MercyPolicy::AcceptLongestIdle] {
            let request = RotationRequest::new(CalendarSpec::new(monday(), CycleDay::One, 8))
                .with_history(History::Records(records.clone()))
                .with_config(RotationConfig::default().with_mercy(mercy));
            for strategy in strategies() {
                let plan = request.plan(strategy.as_ref()).unwrap();
                assert_eq!(plan.solution.schedule.slot_count(), plan.slots.len());
                assert_valid(&plan, &request.config);
            }
        }
    }

    #[test]
    fn test_make_up_label_cannot_name_a_group() {
        let mut names: Vec<String> = Roster::letters().names().to_vec();
        names[21] = "mu".into();
        let roster = Roster::new(names).unwrap();
        let request = RotationRequest::new(CalendarSpec::new(monday(), CycleDay::One, 1))
            .with_roster(roster);
        assert_eq!(
            request.plan(&BacktrackingSolver::new()).unwrap_err(),
            RotationError::ReservedGroupName("mu".into())
        );
    }
}
