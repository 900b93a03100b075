//! Hierarchy levels
//!
//! Provides [`Level`], the five ordinal hierarchy columns of a cost record.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// One of the five hierarchy columns, ordered from root (`L1`) to leaf (`L5`)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Root of the hierarchy (e.g. the whole organisation)
    #[serde(alias = "level1")]
    L1,
    /// Region
    #[serde(alias = "level2")]
    L2,
    /// Country
    #[serde(alias = "level3")]
    L3,
    /// Division
    #[serde(alias = "level4")]
    L4,
    /// Service
    #[serde(alias = "level5")]
    L5,
}

impl Level {
    /// All levels in hierarchy order
    pub const ALL: [Level; 5] = [Level::L1, Level::L2, Level::L3, Level::L4, Level::L5];

    /// Levels that accept a filter selection
    pub const FILTERABLE: [Level; 4] = [Level::L2, Level::L3, Level::L4, Level::L5];

    /// 1-based level index
    #[inline]
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::L1 => 1,
            Self::L2 => 2,
            Self::L3 => 3,
            Self::L4 => 4,
            Self::L5 => 5,
        }
    }

    /// Level from its 1-based index
    #[inline]
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(Self::L1),
            2 => Some(Self::L2),
            3 => Some(Self::L3),
            4 => Some(Self::L4),
            5 => Some(Self::L5),
            _ => None,
        }
    }

    /// CSV column header for this level
    #[inline]
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::L1 => "Level1",
            Self::L2 => "Level2",
            Self::L3 => "Level3",
            Self::L4 => "Level4",
            Self::L5 => "Level5",
        }
    }

    /// The next level down, if any
    #[inline]
    #[must_use]
    pub const fn child(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    /// Adjacent (parent, child) pairs in hierarchy order
    #[must_use]
    pub fn adjacent_pairs() -> [(Level, Level); 4] {
        [
            (Level::L1, Level::L2),
            (Level::L2, Level::L3),
            (Level::L3, Level::L4),
            (Level::L4, Level::L5),
        ]
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "level{}", self.index())
    }
}

impl FromStr for Level {
    type Err = LevelParseError;

    /// Accepts `level2`, `Level2`, `L2` and bare `2`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        let digits = lower
            .strip_prefix("level")
            .or_else(|| lower.strip_prefix('l'))
            .unwrap_or(&lower);

        digits
            .parse::<u8>()
            .ok()
            .and_then(Self::from_index)
            .ok_or_else(|| LevelParseError(trimmed.to_string()))
    }
}

/// Unrecognised level name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown hierarchy level: '{0}'")]
pub struct LevelParseError(pub String);
