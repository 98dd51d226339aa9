//! Hierarchical account identifiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::{EngineError, EngineResult};

/// Hierarchical account identifier with up to three colon-delimited
/// segments: `Type:Account:Subaccount`.
///
/// Missing segments are empty. Accounts order and hash over the normalized
/// 3-tuple, which is what ledger indexing and sorting rely on; roll-up
/// aggregation across the parent/child relation is not performed by this
/// crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Account {
    segments: [String; 3],
}

impl Account {
    /// Create an account from its three segments
    pub fn new(
        kind: impl Into<String>,
        name: impl Into<String>,
        subaccount: impl Into<String>,
    ) -> Self {
        Self {
            segments: [kind.into(), name.into(), subaccount.into()],
        }
    }

    /// Parse a colon-delimited identifier.
    ///
    /// Fewer than three segments normalize to empty trailing segments; more
    /// than three are rejected.
    pub fn parse(identifier: &str) -> EngineResult<Self> {
        if identifier.is_empty() {
            return Ok(Self::default());
        }
        let parts: Vec<&str> = identifier.split(':').collect();
        if parts.len() > 3 {
            return Err(EngineError::Validation(format!(
                "Account '{}' has more than three segments",
                identifier
            )));
        }
        let mut segments: [String; 3] = Default::default();
        for (segment, part) in segments.iter_mut().zip(parts) {
            *segment = part.trim().to_string();
        }
        Ok(Self { segments })
    }

    /// The normalized segments as a 3-tuple
    pub fn segments(&self) -> [&str; 3] {
        [&self.segments[0], &self.segments[1], &self.segments[2]]
    }

    /// Number of segments up to and including the last non-empty one
    pub fn depth(&self) -> usize {
        self.segments
            .iter()
            .rposition(|segment| !segment.is_empty())
            .map_or(0, |index| index + 1)
    }

    /// Whether every segment is empty
    pub fn is_empty(&self) -> bool {
        self.depth() == 0
    }

    /// The account one level up, if any.
    ///
    /// `Assets:Checking:Joint` yields `Assets:Checking`; a single-segment
    /// account has no parent.
    pub fn parent(&self) -> Option<Account> {
        let depth = self.depth();
        if depth <= 1 {
            return None;
        }
        let mut parent = self.clone();
        parent.segments[depth - 1].clear();
        Some(parent)
    }

    /// Whether `other` sits strictly below this account in the hierarchy
    pub fn is_parent_of(&self, other: &Account) -> bool {
        let depth = self.depth();
        depth < other.depth()
            && self.segments[..depth]
                .iter()
                .zip(&other.segments[..depth])
                .all(|(mine, theirs)| mine == theirs)
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments[..self.depth()].join(":"))
    }
}

impl FromStr for Account {
    type Err = EngineError;

    fn from_str(identifier: &str) -> EngineResult<Self> {
        Self::parse(identifier)
    }
}

impl Serialize for Account {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Account {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let identifier = String::deserialize(deserializer)?;
        Account::parse(&identifier).map_err(serde::de::Error::custom)
    }
}
