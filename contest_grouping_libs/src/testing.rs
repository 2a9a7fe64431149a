use crate::{
    clock::Clock,
    codeforces::{
        client::{CodeforcesError, ContestApi, ContestSummary, LookupError},
        model::{Contest, Submission},
    },
    contest::ContestId,
};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicI64, AtomicUsize, Ordering},
        Mutex,
    },
};

pub const HOUR_MILLIS: i64 = 3600 * 1000;

pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(now: i64) -> Self {
        ManualClock {
            now: AtomicI64::new(now),
        }
    }

    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

pub fn summary(name: &str, start_time: i64, duration_seconds: i64) -> ContestSummary {
    ContestSummary {
        contest_name: name.to_string(),
        start_time: Some(start_time),
        duration_seconds: Some(duration_seconds),
    }
}

pub fn contest(id: i64, name: &str, start_time: i64, duration_seconds: i64) -> Contest {
    Contest {
        id: Some(id),
        name: Some(name.to_string()),
        kind: Some(String::from("CF")),
        phase: Some(String::from("FINISHED")),
        start_time_seconds: Some(start_time),
        duration_seconds: Some(duration_seconds),
    }
}

/// In-process stand-in for the Codeforces API that counts every call.
///
/// Unknown contests answer `NotFound(None)`, an unset contest list fails.
#[derive(Default)]
pub struct FakeContestApi {
    contests: Mutex<HashMap<ContestId, Result<ContestSummary, LookupError>>>,
    contest_list: Mutex<Option<Vec<Contest>>>,
    submissions: Mutex<Vec<Submission>>,
    pub contest_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
}

impl FakeContestApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_contest(
        &self,
        contest_id: impl Into<ContestId>,
        result: Result<ContestSummary, LookupError>,
    ) {
        self.contests
            .lock()
            .unwrap()
            .insert(contest_id.into(), result);
    }

    pub fn set_contest_list(&self, contests: Option<Vec<Contest>>) {
        *self.contest_list.lock().unwrap() = contests;
    }

    pub fn set_submissions(&self, submissions: Vec<Submission>) {
        *self.submissions.lock().unwrap() = submissions;
    }

    pub fn contest_calls(&self) -> usize {
        self.contest_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContestApi for FakeContestApi {
    async fn fetch_contest(&self, contest_id: &ContestId) -> Result<ContestSummary, LookupError> {
        if contest_id.is_empty() {
            return Err(LookupError::NoContestId);
        }
        self.contest_calls.fetch_add(1, Ordering::SeqCst);
        self.contests
            .lock()
            .unwrap()
            .get(contest_id)
            .cloned()
            .unwrap_or(Err(LookupError::NotFound(None)))
    }

    async fn fetch_contest_list(&self) -> Result<Vec<Contest>, CodeforcesError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.contest_list
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| CodeforcesError::ApiError(String::from("contest list unavailable")))
    }

    async fn fetch_user_status(&self, _handle: &str) -> Result<Vec<Submission>, CodeforcesError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.submissions.lock().unwrap().clone())
    }
}
