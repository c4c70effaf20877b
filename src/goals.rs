//! Goal code extraction
//!
//! Goal codes are a letter `A`-`D` followed by a digit `1`-`9`, e.g. `B2`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

static GOAL_CODE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-D])([1-9])").unwrap());

/// A goal code, ordered by letter and then by numeric value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GoalCode {
    pub letter: char,
    pub number: u32,
}

impl fmt::Display for GoalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter, self.number)
    }
}

impl Serialize for GoalCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Distinct goal codes in `text`, sorted
pub fn goal_codes(text: &str) -> Vec<GoalCode> {
    GOAL_CODE_PATTERN
        .captures_iter(text)
        .filter_map(|caps| {
            let letter = caps[1].chars().next()?;
            let number = caps[2].parse().ok()?;
            Some(GoalCode { letter, number })
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Same as [`goal_codes`], rendered as strings like `"A1"`
pub fn extract_goal_codes(text: &str) -> Vec<String> {
    goal_codes(text).iter().map(GoalCode::to_string).collect()
}
