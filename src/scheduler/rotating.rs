//! Rotating-pool greedy solver.
//!
//! # Algorithm
//!
//! The roster is split once into [`POOL_COUNT`] pools (sizes differ by at most
//! one, larger pools first: 5, 5, 4, 4, 4 for 22 groups). The *active pool*
//! is the concatenation of all pools. Each committed group leaves the active
//! pool; when it runs dry the pools rotate as a whole by one position, each
//! pool's members rotate by one, and the active pool is rebuilt.
//!
//! Slots are visited once, in order. A slot gets a make-up if its week already
//! holds `weekly_quota` lessons; otherwise the first hit of:
//!
//! 1. **Pool**: first active-pool group not used this week whose last use of
//!    the period is at least the strict threshold ago.
//! 2. **Roster**: same test over the whole roster.
//! 3. **Mercy**: the eligible group idle longest in this period, subject to
//!    [`MercyPolicy`].
//!
//! No candidate means make-up, as long as the date holds none yet. If it
//! already has its make-up, the slot goes to a group instead: a regular tier
//! pick when the make-up was forced by the quota, else the eligible group
//! idle longest in this period, spaced or not. Only a date with no eligible
//! group left makes the pass infeasible. The pass never backtracks.
//!
//! # Reported spacing
//! [`Solution::spacing_days`] is the strict threshold unless a commit landed
//! closer to an earlier use of the same period (mercy under
//! [`MercyPolicy::AcceptLongestIdle`], or a make-up overflow). Then it is the
//! smallest such gap, so the schedule always validates at the reported value.
//!
//! # Complexity
//! O(n * g) for n slots and g groups.

use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::state::SearchState;
use super::{AssignmentStrategy, Problem, Solution};
use crate::config::{MercyPolicy, PoolOrder};
use crate::models::{Assignee, GroupId, Slot};

/// Number of roster pools.
pub const POOL_COUNT: usize = 5;

/// Which tier produced a pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Pool,
    Roster,
    Mercy,
    /// The date already holds its make-up.
    Overflow,
}

/// Fixed pools plus the active pool they feed.
///
/// # Example
///
/// ```
/// use u_rotation::models::Roster;
/// use u_rotation::scheduler::PoolRotation;
///
/// let rotation = PoolRotation::new(Roster::default().ids().collect());
/// let sizes: Vec<usize> = rotation.pools().iter().map(Vec::len).collect();
/// assert_eq!(sizes, vec![5, 5, 4, 4, 4]);
/// assert_eq!(rotation.active().len(), 22);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolRotation {
    pools: Vec<Vec<GroupId>>,
    active: Vec<GroupId>,
}

impl PoolRotation {
    /// Partitions `order` into [`POOL_COUNT`] consecutive pools.
    pub fn new(order: Vec<GroupId>) -> Self {
        let base = order.len() / POOL_COUNT;
        let extra = order.len() % POOL_COUNT;

        let mut rest = order.as_slice();
        let mut pools = Vec::with_capacity(POOL_COUNT);
        for i in 0..POOL_COUNT {
            let size = base + usize::from(i < extra);
            let (pool, tail) = rest.split_at(size);
            pools.push(pool.to_vec());
            rest = tail;
        }

        let active = pools.concat();
        Self { pools, active }
    }

    pub fn pools(&self) -> &[Vec<GroupId>] {
        &self.pools
    }

    /// Groups not yet taken since the last refresh, in scan order.
    pub fn active(&self) -> &[GroupId] {
        &self.active
    }

    pub fn is_exhausted(&self) -> bool {
        self.active.is_empty()
    }

    /// Rotates pool order and pool members by one, then rebuilds the active pool.
    pub fn refresh(&mut self) {
        self.pools.rotate_left(1);
        for pool in self.pools.iter_mut().filter(|p| !p.is_empty()) {
            pool.rotate_left(1);
        }
        self.active = self.pools.concat();
    }

    /// Removes a group from the active pool. Returns whether it was there.
    pub fn take(&mut self, group: GroupId) -> bool {
        match self.active.iter().position(|&g| g == group) {
            Some(i) => {
                self.active.remove(i);
                true
            }
            None => false,
        }
    }
}

/// Single-pass greedy solver over rotating pools.
#[derive(Debug, Clone, Default)]
pub struct RotatingPoolSolver;

impl RotatingPoolSolver {
    pub fn new() -> Self {
        Self
    }

    fn initial_order(problem: &Problem<'_>) -> Vec<GroupId> {
        let mut order: Vec<GroupId> = problem.roster.ids().collect();
        if let PoolOrder::Shuffled { seed } = problem.config.pool_order {
            let mut rng = StdRng::seed_from_u64(seed);
            order.shuffle(&mut rng);
        }
        order
    }

    fn pick(
        problem: &Problem<'_>,
        state: &SearchState,
        rotation: &PoolRotation,
        slot: &Slot,
    ) -> Option<(GroupId, Tier)> {
        let week = slot.week();
        let strict = problem.config.strict_spacing_days;
        let eligible = |g: GroupId| !state.weekly.contains(week, g);
        let spaced = |g: GroupId| state.memory.is_spaced(g, slot.period, slot.date, strict);

        if let Some(g) = rotation
            .active()
            .iter()
            .copied()
            .find(|&g| eligible(g) && spaced(g))
        {
            return Some((g, Tier::Pool));
        }

        if let Some(g) = problem.roster.ids().find(|&g| eligible(g) && spaced(g)) {
            return Some((g, Tier::Roster));
        }

        let longest = Self::longest_idle(problem, state, slot)?;

        match problem.config.mercy {
            MercyPolicy::AcceptLongestIdle => Some((longest, Tier::Mercy)),
            MercyPolicy::RequireThreshold => spaced(longest).then_some((longest, Tier::Mercy)),
        }
    }

    /// The group not yet used this week that has gone longest without `slot.period`.
    fn longest_idle(problem: &Problem<'_>, state: &SearchState, slot: &Slot) -> Option<GroupId> {
        let week = slot.week();
        problem
            .roster
            .ids()
            .filter(|&g| !state.weekly.contains(week, g))
            .min_by_key(|&g| state.memory.last_used(g, slot.period))
    }

    /// Group for a slot whose date already holds a make-up.
    fn overflow(
        problem: &Problem<'_>,
        state: &SearchState,
        rotation: &PoolRotation,
        slot: &Slot,
        quota_met: bool,
    ) -> Option<(GroupId, Tier)> {
        let regular = if quota_met {
            Self::pick(problem, state, rotation, slot)
        } else {
            None
        };
        regular.or_else(|| Self::longest_idle(problem, state, slot).map(|g| (g, Tier::Overflow)))
    }
}

impl AssignmentStrategy for RotatingPoolSolver {
    fn name(&self) -> &'static str {
        "rotating-pool"
    }

    fn solve(&self, problem: &Problem<'_>) -> Solution {
        let config = problem.config;
        let strict = config.strict_spacing_days;
        let mut rotation = PoolRotation::new(Self::initial_order(problem));
        let mut state = SearchState::seeded(problem.seed);
        let mut tally = [0u64; 4];
        let mut make_ups = 0;
        let mut min_gap: Option<i64> = None;

        for (index, slot) in problem.slots.iter().enumerate() {
            if rotation.is_exhausted() {
                rotation.refresh();
                trace!("pools refreshed before {} period {}", slot.date, slot.period);
            }

            let quota_met = state.weekly.lessons_in(slot.week()) >= config.weekly_quota;
            let pick = if quota_met {
                None
            } else {
                Self::pick(problem, &state, &rotation, slot)
            };

            let pick = match pick {
                Some(pick) => pick,
                None if state.admits(slot, Assignee::MakeUp, strict) => {
                    make_ups += 1;
                    state.apply(*slot, Assignee::MakeUp);
                    continue;
                }
                None => match Self::overflow(problem, &state, &rotation, slot, quota_met) {
                    Some(pick) => pick,
                    None => {
                        info!(
                            "rotating pool: no group left for {} period {} beside its make-up",
                            slot.date, slot.period
                        );
                        return Solution::infeasible(index as u64 + 1);
                    }
                },
            };

            let (group, tier) = pick;
            tally[tier as usize] += 1;
            if let Some(gap) = state.memory.days_since(group, slot.period, slot.date) {
                if gap < strict {
                    min_gap = Some(min_gap.map_or(gap, |m| m.min(gap)));
                }
            }
            state.apply(*slot, Assignee::Group(group));
            rotation.take(group);
        }

        let [from_pool, from_roster, mercy, overflow] = tally;
        debug!(
            "rotating pool: {from_pool} pool picks, {from_roster} roster picks, \
             {mercy} mercy picks, {overflow} overflow picks, {make_ups} make-ups"
        );
        if let Some(gap) = min_gap {
            info!("rotating pool: closest repeat is {gap} days, under the {strict}-day threshold");
        }

        Solution {
            schedule: state.into_schedule(),
            spacing_days: Some(min_gap.map_or(strict, |gap| gap.min(strict))),
            steps: problem.slots.len() as u64,
        }
    }
}
