pub mod list;
pub mod metadata;

use crate::{
    classify::ContestTiming,
    codeforces::client::{ContestSummary, LookupError},
};
use serde::{Deserialize, Serialize};

pub use list::{ContestListCache, ContestListEntry, ContestListSnapshot};
pub use metadata::ContestMetadataCache;

/// One entry of the per-contest cache.
///
/// A record without `start_time` is a negative entry. It ages out like any other record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestRecord {
    pub contest_name: Option<String>,
    pub start_time: Option<i64>,
    pub duration_seconds: Option<i64>,
    #[serde(default)]
    pub fetched_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<LookupError>,
}

impl ContestRecord {
    pub fn resolved(summary: ContestSummary, fetched_at: i64) -> Self {
        ContestRecord {
            contest_name: Some(summary.contest_name),
            start_time: summary.start_time,
            duration_seconds: summary.duration_seconds,
            fetched_at,
            error: None,
        }
    }

    pub fn negative(error: LookupError, fetched_at: i64) -> Self {
        ContestRecord {
            contest_name: None,
            start_time: None,
            duration_seconds: None,
            fetched_at,
            error: Some(error),
        }
    }

    pub fn is_fresh(&self, now: i64, ttl_millis: i64) -> bool {
        now - self.fetched_at <= ttl_millis
    }

    pub fn timing(&self) -> ContestTiming {
        ContestTiming {
            start_time: self.start_time,
            duration_seconds: self.duration_seconds,
        }
    }

    /// The record itself, or the error it remembers for a failed lookup.
    pub fn into_result(self) -> Result<ContestRecord, LookupError> {
        match self.error.clone() {
            Some(error) => Err(error),
            None => Ok(self),
        }
    }
}
