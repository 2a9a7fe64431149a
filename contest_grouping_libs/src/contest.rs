use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

const GYM_PREFIX: &str = "gym-";

static NUMERIC_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());
static GYM_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?i)gym-(\d+)$").unwrap());
static CONTEST_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)/contest/(\d+)").unwrap());
static PROBLEMSET_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)/problemset/problem/(\d+)").unwrap());
static GYM_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)/gym/(\d+)").unwrap());

/// Opaque key identifying a contest.
///
/// Plain contests use their numeric id (`"1234"`), gym contests are prefixed (`"gym-100001"`).
/// Gym contests never appear in the bulk contest list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "RawContestId")]
pub struct ContestId(String);

/// Contest ids arrive as strings or, from some callers, as bare numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawContestId {
    Text(String),
    Number(i64),
}

impl From<RawContestId> for ContestId {
    fn from(raw: RawContestId) -> Self {
        match raw {
            RawContestId::Text(id) => ContestId::from(id),
            RawContestId::Number(id) => ContestId::from(id),
        }
    }
}

impl From<ContestId> for String {
    fn from(id: ContestId) -> Self {
        id.0
    }
}

impl ContestId {
    /// Wrap an id as given. Gym ids are brought to the lowercase `gym-<digits>` form.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        match GYM_ID.captures(id.trim()) {
            Some(captures) => ContestId::gym(&captures[1]),
            None => ContestId(id),
        }
    }

    pub fn gym(gym_id: impl fmt::Display) -> Self {
        ContestId(format!("{}{}", GYM_PREFIX, gym_id))
    }

    /// Parse a contest id from user input: a bare id, a `gym-` id, or a link to a contest,
    /// problemset problem or gym page.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        if NUMERIC_ID.is_match(input) {
            return Some(ContestId::new(input));
        }
        if let Some(captures) = GYM_ID.captures(input) {
            return Some(ContestId::gym(&captures[1]));
        }
        if let Some(captures) = CONTEST_URL.captures(input) {
            return Some(ContestId::new(&captures[1]));
        }
        if let Some(captures) = PROBLEMSET_URL.captures(input) {
            return Some(ContestId::new(&captures[1]));
        }
        GYM_URL
            .captures(input)
            .map(|captures| ContestId::gym(&captures[1]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn is_gym(&self) -> bool {
        self.0.starts_with(GYM_PREFIX)
    }

    pub fn gym_id(&self) -> Option<&str> {
        self.0.strip_prefix(GYM_PREFIX)
    }

    /// Whether the id has one of the two shapes the upstream knows about.
    pub fn is_well_formed(&self) -> bool {
        NUMERIC_ID.is_match(&self.0) || GYM_ID.is_match(&self.0)
    }
}

impl fmt::Display for ContestId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ContestId {
    fn from(id: &str) -> Self {
        ContestId::new(id)
    }
}

impl From<String> for ContestId {
    fn from(id: String) -> Self {
        ContestId::new(id)
    }
}

impl From<i64> for ContestId {
    fn from(id: i64) -> Self {
        ContestId(id.to_string())
    }
}
