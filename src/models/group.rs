//! Lesson groups and the roster.
//!
//! A roster is a fixed list of exactly [`ROSTER_SIZE`] distinct group names.
//! Groups are referred to by [`GroupId`], an index into the roster, so the
//! solvers never compare strings. The make-up placeholder is not a group: it
//! is the [`Assignee::MakeUp`] variant and never appears in a roster.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Result, RotationError};

/// Number of groups in every roster.
pub const ROSTER_SIZE: usize = 22;

/// Index of a group within its [`Roster`].
///
/// Always below [`ROSTER_SIZE`]; deserialization rejects anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct GroupId(u8);

impl GroupId {
    pub(crate) fn new(index: usize) -> Self {
        debug_assert!(index < ROSTER_SIZE);
        Self(index as u8)
    }

    /// Position in the roster.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for GroupId {
    type Error = RotationError;

    fn try_from(index: u8) -> Result<Self> {
        if usize::from(index) < ROSTER_SIZE {
            Ok(Self(index))
        } else {
            Err(RotationError::GroupOutOfRange(index))
        }
    }
}

impl From<GroupId> for u8 {
    fn from(id: GroupId) -> Self {
        id.0
    }
}

/// What a slot receives: a real group or the make-up placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Assignee {
    /// A roster group.
    Group(GroupId),
    /// Make-up placeholder. Exempt from spacing and weekly rules.
    MakeUp,
}

impl Assignee {
    /// The group, if this is not a make-up.
    #[inline]
    pub fn group(self) -> Option<GroupId> {
        match self {
            Self::Group(id) => Some(id),
            Self::MakeUp => None,
        }
    }

    #[inline]
    pub fn is_make_up(self) -> bool {
        matches!(self, Self::MakeUp)
    }
}

/// An ordered roster of exactly [`ROSTER_SIZE`] distinct group names.
///
/// Roster order matters: both solvers use it to break ties.
///
/// # Example
///
/// ```
/// use u_rotation::models::{Roster, ROSTER_SIZE};
///
/// let roster = Roster::default();
/// assert_eq!(roster.len(), ROSTER_SIZE);
/// assert_eq!(roster.names()[0], "A");
/// assert_eq!(roster.names()[21], "V");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Roster {
    names: Vec<String>,
}

impl Roster {
    /// Builds a roster, checking size, blank names and duplicates.
    ///
    /// Names are trimmed.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names
            .into_iter()
            .map(|n| n.into().trim().to_string())
            .collect();

        if let Some(blank) = names.iter().find(|n| n.is_empty()) {
            return Err(RotationError::InvalidGroupName(blank.clone()));
        }

        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(RotationError::DuplicateGroup(name.clone()));
            }
        }

        if names.len() != ROSTER_SIZE {
            return Err(RotationError::RosterMismatch {
                expected: ROSTER_SIZE,
                found: names.len(),
            });
        }

        Ok(Self { names })
    }

    /// The default roster: letters `A` through `V`.
    pub fn letters() -> Self {
        let names = (b'A'..).take(ROSTER_SIZE).map(|c| (c as char).to_string()).collect();
        Self { names }
    }

    /// Number of groups (always [`ROSTER_SIZE`]).
    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Group names in roster order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// All group IDs in roster order.
    pub fn ids(&self) -> impl Iterator<Item = GroupId> + '_ {
        (0..self.names.len()).map(GroupId::new)
    }

    /// Name of a group.
    pub fn name(&self, id: GroupId) -> &str {
        &self.names[id.index()]
    }

    /// Looks up a group by (trimmed) name.
    pub fn id_of(&self, name: &str) -> Option<GroupId> {
        let name = name.trim();
        self.names.iter().position(|n| n == name).map(GroupId::new)
    }

    /// Display label for an assignee.
    pub fn label<'a>(&'a self, assignee: Assignee, make_up_label: &'a str) -> &'a str {
        match assignee {
            Assignee::Group(id) => self.name(id),
            Assignee::MakeUp => make_up_label,
        }
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::letters()
    }
}

impl TryFrom<Vec<String>> for Roster {
    type Error = RotationError;

    fn try_from(names: Vec<String>) -> Result<Self> {
        Self::new(names)
    }
}

impl From<Roster> for Vec<String> {
    fn from(roster: Roster) -> Self {
        roster.names
    }
}
