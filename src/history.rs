//! History ingestion.
//!
//! Converts prior assignments into seed [`PeriodMemory`] so that a new
//! horizon continues the spacing of the previous one.
//!
//! # Shapes
//!
//! - [`History::Records`]: flat `(date, period, group)` records. The roster is
//!   either supplied by the caller or inferred from the records.
//! - [`History::Compact`]: a roster, a start date and cycle day, and one group
//!   label per slot. Labels are attributed to slots by re-walking the school
//!   calendar exactly as slot generation does.
//!
//! # Robustness
//! Records with an unparseable period or an unknown group are skipped with a
//! warning; they never abort ingestion. Make-up labels are ignored.
//!
//! # Roster Inference
//! Inference requires exactly [`ROSTER_SIZE`] distinct non-make-up groups and
//! fails with [`RotationError::RosterMismatch`] otherwise. There is no
//! fallback to the default roster.

use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::config::RotationConfig;
use crate::error::{Result, RotationError};
use crate::models::{CycleDay, Period, PeriodMemory, Roster, SchoolDays, ROSTER_SIZE};

/// One prior assignment, as delivered by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub date: NaiveDate,
    /// Raw period label, e.g. `"3"` or `"P3"`.
    pub period: String,
    /// Group name or the make-up label.
    pub group: String,
}

impl HistoryRecord {
    pub fn new(date: NaiveDate, period: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            date,
            period: period.into(),
            group: group.into(),
        }
    }
}

/// A prior schedule given as one label per slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactHistory {
    /// The 22 group names of the prior schedule.
    pub roster: Vec<String>,
    /// First calendar day of the prior schedule.
    pub start: NaiveDate,
    /// Cycle day of its first school day.
    pub start_cycle: CycleDay,
    /// Dates the prior schedule skipped.
    #[serde(default)]
    pub excluded: BTreeSet<NaiveDate>,
    /// Group (or make-up) label per slot, in slot order. Blank = unknown.
    pub sequence: Vec<String>,
}

impl CompactHistory {
    pub fn new(roster: Vec<String>, start: NaiveDate, start_cycle: CycleDay) -> Self {
        Self {
            roster,
            start,
            start_cycle,
            excluded: BTreeSet::new(),
            sequence: Vec::new(),
        }
    }

    pub fn with_excluded_dates(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.excluded.extend(dates);
        self
    }

    pub fn with_sequence<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sequence = labels.into_iter().map(Into::into).collect();
        self
    }
}

/// Prior assignments in either supported shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum History {
    Records(Vec<HistoryRecord>),
    Compact(CompactHistory),
}

/// Roster and seed memory derived from history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed {
    pub roster: Roster,
    pub memory: PeriodMemory,
}

impl Seed {
    /// A seed with no prior assignments.
    pub fn empty(roster: Roster) -> Self {
        Self {
            roster,
            memory: PeriodMemory::new(),
        }
    }
}

/// Turns [`History`] into a [`Seed`].
#[derive(Debug, Clone, Copy)]
pub struct HistoryIngester<'a> {
    config: &'a RotationConfig,
}

impl<'a> HistoryIngester<'a> {
    pub fn new(config: &'a RotationConfig) -> Self {
        Self { config }
    }

    /// Ingests history against an optional already-known roster.
    ///
    /// - Records + known roster: seed against it.
    /// - Records alone: infer the roster first.
    /// - Compact: use its own roster, which must equal `known` if both exist.
    pub fn ingest(&self, history: &History, known: Option<&Roster>) -> Result<Seed> {
        match history {
            History::Records(records) => {
                let roster = match known {
                    Some(roster) => roster.clone(),
                    None => self.infer_roster(records)?,
                };
                let memory = self.seed_records(records, &roster);
                Ok(Seed { roster, memory })
            }
            History::Compact(compact) => {
                let roster = Roster::new(compact.roster.iter().cloned())?;
                if known.is_some_and(|k| *k != roster) {
                    return Err(RotationError::RosterConflict);
                }
                let records = self.expand(compact)?;
                let memory = self.seed_records(&records, &roster);
                Ok(Seed { roster, memory })
            }
        }
    }

    /// Fails if a roster name would read back as a make-up.
    pub fn check_roster(&self, roster: &Roster) -> Result<()> {
        match roster.names().iter().find(|n| self.config.is_make_up_label(n)) {
            Some(name) => Err(RotationError::ReservedGroupName(name.clone())),
            None => Ok(()),
        }
    }

    /// Infers the roster from record group names, ordered by name.
    pub fn infer_roster(&self, records: &[HistoryRecord]) -> Result<Roster> {
        let names: BTreeSet<&str> = records
            .iter()
            .map(|r| r.group.trim())
            .filter(|g| !g.is_empty() && !self.config.is_make_up_label(g))
            .collect();

        if names.len() != ROSTER_SIZE {
            return Err(RotationError::RosterMismatch {
                expected: ROSTER_SIZE,
                found: names.len(),
            });
        }
        Roster::new(names)
    }

    /// Builds period memory from records, keeping the latest date per pair.
    pub fn seed_records(&self, records: &[HistoryRecord], roster: &Roster) -> PeriodMemory {
        let mut memory = PeriodMemory::new();
        let mut skipped = 0usize;

        for record in records {
            if self.config.is_make_up_label(&record.group) || record.group.trim().is_empty() {
                continue;
            }
            let period = match record.period.parse::<Period>() {
                Ok(p) => p,
                Err(e) => {
                    warn!("skipping history record on {}: {e}", record.date);
                    skipped += 1;
                    continue;
                }
            };
            let Some(group) = roster.id_of(&record.group) else {
                warn!(
                    "skipping history record on {}: unknown group {:?}",
                    record.date, record.group
                );
                skipped += 1;
                continue;
            };
            memory.observe(group, period, record.date);
        }

        debug!(
            "seeded {} period memories from {} history records ({} skipped)",
            memory.len(),
            records.len(),
            skipped
        );
        memory
    }

    /// Attributes each label of a compact history to its slot.
    ///
    /// Blank and make-up labels consume a slot but produce no record.
    pub fn expand(&self, compact: &CompactHistory) -> Result<Vec<HistoryRecord>> {
        let periods = &self.config.periods;
        periods.ensure_non_empty()?;

        let mut labels = compact.sequence.iter();
        let mut records = Vec::with_capacity(compact.sequence.len());

        'days: for (date, cycle) in
            SchoolDays::new(compact.start, compact.start_cycle, &compact.excluded)
        {
            for period in periods.periods_for(cycle) {
                let Some(label) = labels.next() else {
                    break 'days;
                };
                let label = label.trim();
                if label.is_empty() || self.config.is_make_up_label(label) {
                    continue;
                }
                records.push(HistoryRecord::new(date, period.to_string(), label));
            }
        }

        Ok(records)
    }
}
