use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// The contest sources this service knows how to read.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Platform {
    Codeforces,
    LeetCode,
    CodeChef,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Codeforces, Platform::LeetCode, Platform::CodeChef];

    /// Lowercase identifier used in query paths.
    pub fn id(&self) -> &'static str {
        match self {
            Platform::Codeforces => "codeforces",
            Platform::LeetCode => "leetcode",
            Platform::CodeChef => "codechef",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Codeforces => "Codeforces",
            Platform::LeetCode => "LeetCode",
            Platform::CodeChef => "CodeChef",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Platform::ALL
            .into_iter()
            .find(|platform| platform.id() == lower)
            .ok_or_else(|| QueryError::UnknownSource(s.to_string()))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Contest {
    pub name: String,
    pub platform: Platform,
    pub start_time: DateTime<Utc>,
    pub duration_seconds: u64,
    pub url: String,
}

pub fn sort_by_start(contests: &mut [Contest]) {
    contests.sort_by_key(|contest| contest.start_time);
}
