//! Exhaustive backtracking solver.
//!
//! # Algorithm
//!
//! Depth-first over the slot list. For slot `i`:
//! 1. Order candidates: every group by last use of this period, ascending
//!    (never-used first, ties in roster order), then make-up last.
//! 2. For each admissible candidate, apply it under a [`Trial`] guard and
//!    recurse into slot `i + 1`.
//! 3. The first complete assignment wins; a failed subtree rolls its trial
//!    back and the next candidate is tried.
//!
//! The whole search runs at the strict spacing threshold first. If it fails,
//! a fresh state is seeded from the same immutable memory and the search runs
//! once more at the relaxed threshold. If that fails too the result is empty.
//!
//! # Complexity
//! Exponential in the worst case (branching ≤ 23, depth = slot count). The
//! least-recently-used order makes dead ends rare in practice; a per-pass node
//! budget (`RotationConfig::step_limit`) bounds pathological inputs.
//!
//! [`Trial`]: super::state::Trial

use log::{debug, info};

use super::state::SearchState;
use super::{AssignmentStrategy, Problem, Solution};
use crate::models::{Assignee, Slot};

/// The node budget of a pass ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BudgetExhausted;

/// Node counter for one pass.
#[derive(Debug)]
struct Budget {
    used: u64,
    limit: Option<u64>,
}

impl Budget {
    fn new(limit: Option<u64>) -> Self {
        Self { used: 0, limit }
    }

    fn spend(&mut self) -> Result<(), BudgetExhausted> {
        self.used += 1;
        match self.limit {
            Some(limit) if self.used > limit => Err(BudgetExhausted),
            _ => Ok(()),
        }
    }
}

/// Depth-first search with strict-then-relaxed spacing.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_rotation::config::RotationConfig;
/// use u_rotation::models::{CalendarSpec, CycleDay, PeriodMemory, Roster};
/// use u_rotation::scheduler::{AssignmentStrategy, BacktrackingSolver, Problem};
///
/// let config = RotationConfig::default();
/// let start = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
/// let slots = CalendarSpec::new(start, CycleDay::One, 1).slots(&config.periods).unwrap();
/// let roster = Roster::default();
/// let seed = PeriodMemory::new();
///
/// let problem = Problem { slots: &slots, roster: &roster, seed: &seed, config: &config };
/// let solution = BacktrackingSolver::new().solve(&problem);
/// assert_eq!(solution.schedule.slot_count(), 22);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BacktrackingSolver;

impl BacktrackingSolver {
    pub fn new() -> Self {
        Self
    }

    /// Candidates for a slot in trial order.
    fn candidates(problem: &Problem<'_>, state: &SearchState, slot: &Slot) -> Vec<Assignee> {
        let mut groups: Vec<_> = problem.roster.ids().collect();
        groups.sort_by_key(|&g| state.memory.last_used(g, slot.period));

        let mut candidates: Vec<Assignee> = groups.into_iter().map(Assignee::Group).collect();
        candidates.push(Assignee::MakeUp);
        candidates
    }

    /// Fills slots `index..` or reports that no completion exists.
    fn search(
        problem: &Problem<'_>,
        index: usize,
        state: &mut SearchState,
        spacing_days: i64,
        budget: &mut Budget,
    ) -> Result<bool, BudgetExhausted> {
        let Some(slot) = problem.slots.get(index) else {
            return Ok(true);
        };
        budget.spend()?;

        for candidate in Self::candidates(problem, state, slot) {
            if !state.admits(slot, candidate, spacing_days) {
                continue;
            }
            let mut trial = state.trial(*slot, candidate);
            if Self::search(problem, index + 1, &mut trial, spacing_days, budget)? {
                trial.commit();
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// One full pass at a fixed threshold, on a freshly seeded state.
    fn run_pass(
        problem: &Problem<'_>,
        spacing_days: i64,
        steps: &mut u64,
    ) -> Option<SearchState> {
        let mut state = SearchState::seeded(problem.seed);
        let mut budget = Budget::new(problem.config.step_limit);
        let outcome = Self::search(problem, 0, &mut state, spacing_days, &mut budget);
        *steps += budget.used;

        match outcome {
            Ok(true) => {
                debug!(
                    "{spacing_days}-day pass succeeded after {} nodes",
                    budget.used
                );
                Some(state)
            }
            Ok(false) => {
                debug!(
                    "{spacing_days}-day pass exhausted after {} nodes",
                    budget.used
                );
                None
            }
            Err(BudgetExhausted) => {
                debug!(
                    "{spacing_days}-day pass hit the node limit of {:?}",
                    budget.limit
                );
                None
            }
        }
    }
}

impl AssignmentStrategy for BacktrackingSolver {
    fn name(&self) -> &'static str {
        "backtracking"
    }

    fn solve(&self, problem: &Problem<'_>) -> Solution {
        let strict = problem.config.strict_spacing_days;
        let relaxed = problem.config.relaxed_spacing_days;
        let mut thresholds = vec![strict];
        if relaxed != strict {
            thresholds.push(relaxed);
        }

        let mut steps = 0;
        for spacing_days in thresholds {
            if let Some(state) = Self::run_pass(problem, spacing_days, &mut steps) {
                if spacing_days != strict {
                    info!("strict {strict}-day spacing infeasible, relaxed to {spacing_days} days");
                }
                return Solution {
                    schedule: state.into_schedule(),
                    spacing_days: Some(spacing_days),
                    steps,
                };
            }
        }

        info!("no schedule satisfies even {relaxed}-day spacing");
        Solution::infeasible(steps)
    }
}
