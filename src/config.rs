//! Rotation configuration.
//!
//! Every field has a default, so a partial JSON document is enough:
//!
//! ```
//! use u_rotation::config::{MercyPolicy, RotationConfig};
//!
//! let config: RotationConfig =
//!     serde_json::from_str(r#"{ "mercy": "AcceptLongestIdle" }"#).unwrap();
//! assert_eq!(config.mercy, MercyPolicy::AcceptLongestIdle);
//! assert_eq!(config.strict_spacing_days, 28);
//! ```

use serde::{Deserialize, Serialize};

use crate::models::{PeriodTable, ROSTER_SIZE};

/// Preferred minimum gap between two uses of a period by one group.
pub const STRICT_SPACING_DAYS: i64 = 28;
/// Fallback gap used when the preferred one is unsatisfiable.
pub const RELAXED_SPACING_DAYS: i64 = 21;

/// What the rotating-pool solver does with its last-resort pick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MercyPolicy {
    /// The longest-idle pick must still meet the strict spacing, else make-up.
    #[default]
    RequireThreshold,
    /// Commit the longest-idle pick even under the threshold.
    AcceptLongestIdle,
}

/// How the rotating-pool solver orders the roster before partitioning it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolOrder {
    /// Roster order.
    #[default]
    Roster,
    /// A reproducible shuffle of the roster.
    Shuffled { seed: u64 },
}

/// Tunables shared by slot generation, history ingestion and both solvers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Period sets per cycle day.
    pub periods: PeriodTable,
    /// First-pass spacing threshold (days).
    pub strict_spacing_days: i64,
    /// Second-pass spacing threshold (days), backtracking only.
    pub relaxed_spacing_days: i64,
    /// Lessons per week before the rotating pool falls back to make-up.
    pub weekly_quota: usize,
    /// Rotating-pool last-resort policy.
    pub mercy: MercyPolicy,
    /// Rotating-pool roster ordering.
    pub pool_order: PoolOrder,
    /// Maximum search nodes per backtracking pass. `None` = unbounded.
    pub step_limit: Option<u64>,
    /// Label that marks a make-up in history data.
    pub make_up_label: String,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            periods: PeriodTable::default(),
            strict_spacing_days: STRICT_SPACING_DAYS,
            relaxed_spacing_days: RELAXED_SPACING_DAYS,
            weekly_quota: ROSTER_SIZE,
            mercy: MercyPolicy::default(),
            pool_order: PoolOrder::default(),
            step_limit: Some(1_000_000),
            make_up_label: "MU".to_string(),
        }
    }
}

impl RotationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_periods(mut self, periods: PeriodTable) -> Self {
        self.periods = periods;
        self
    }

    pub fn with_spacing(mut self, strict_days: i64, relaxed_days: i64) -> Self {
        self.strict_spacing_days = strict_days;
        self.relaxed_spacing_days = relaxed_days;
        self
    }

    pub fn with_weekly_quota(mut self, quota: usize) -> Self {
        self.weekly_quota = quota;
        self
    }

    pub fn with_mercy(mut self, mercy: MercyPolicy) -> Self {
        self.mercy = mercy;
        self
    }

    pub fn with_pool_order(mut self, order: PoolOrder) -> Self {
        self.pool_order = order;
        self
    }

    pub fn with_step_limit(mut self, limit: Option<u64>) -> Self {
        self.step_limit = limit;
        self
    }

    pub fn with_make_up_label(mut self, label: impl Into<String>) -> Self {
        self.make_up_label = label.into();
        self
    }

    /// Whether a history label denotes a make-up (case-insensitive).
    pub fn is_make_up_label(&self, label: &str) -> bool {
        label.trim().eq_ignore_ascii_case(self.make_up_label.trim())
    }
}
