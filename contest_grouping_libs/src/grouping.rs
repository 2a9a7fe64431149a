use crate::{
    cache::ContestListEntry,
    classify::{classify, ContestTiming, Label, SubmissionClassificationInput},
    codeforces::model::Submission,
    contest::ContestId,
};
use chrono::{Local, TimeZone, Utc};
use itertools::Itertools;
use serde::Serialize;
use std::fmt::Display;

/// A run of consecutive submissions shown under one contest header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionGroup {
    pub key: String,
    pub contest_id: Option<ContestId>,
    pub contest_name: String,
    pub label: Label,
    pub window: Option<String>,
    pub submission_ids: Vec<i64>,
}

pub fn classification_input(submission: &Submission) -> SubmissionClassificationInput {
    SubmissionClassificationInput {
        contest_id: submission.problem_contest_id().map(ContestId::from),
        timestamp: submission.creation_time_seconds,
        participant_type: submission.participant_type().cloned(),
    }
}

/// `c_<contest id>` for contest submissions, `p_<UTC day>` for the rest.
pub fn group_key(contest_id: Option<&ContestId>, timestamp: Option<i64>) -> String {
    if let Some(contest_id) = contest_id.filter(|id| !id.is_empty()) {
        return format!("c_{}", contest_id);
    }

    match timestamp.and_then(|timestamp| Utc.timestamp_opt(timestamp, 0).single()) {
        Some(datetime) => format!("p_{}", datetime.format("%Y-%m-%d")),
        None => String::from("p_unknown"),
    }
}

/// Split submissions into runs of consecutive entries sharing a group key. Order is kept.
pub fn partition(submissions: &[Submission]) -> Vec<(String, Vec<&Submission>)> {
    let groups = submissions.iter().group_by(|submission| {
        let input = classification_input(submission);
        group_key(input.contest(), input.timestamp)
    });

    let mut partitioned = Vec::new();
    for (key, group) in &groups {
        partitioned.push((key, group.collect()));
    }
    partitioned
}

/// Header name for a contest nobody could resolve.
pub fn fallback_name(contest_id: Option<&ContestId>) -> String {
    match contest_id {
        Some(contest_id) if contest_id.is_empty() => String::from("Practice"),
        Some(contest_id) => match contest_id.gym_id() {
            Some(gym_id) => format!("Gym {}", gym_id),
            None => format!("Contest {}", contest_id),
        },
        None => String::from("Practice"),
    }
}

/// Contest window text in the given time zone. Only the start is shown when the duration is unknown.
pub fn window_text<Tz>(timing: ContestTiming, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    let start = timing.start_time?;
    let mut text = tz.timestamp_opt(start, 0).single()?.format(FORMAT).to_string();

    if let Some(duration) = timing.duration_seconds.filter(|duration| *duration > 0) {
        if let Some(end) = tz.timestamp_opt(start + duration, 0).single() {
            text.push_str(&format!(" — {}", end.format(FORMAT)));
        }
    }

    Some(text)
}

/// Build the header of one group from its first submission and whatever contest info was found.
pub fn build_group(
    key: String,
    submissions: &[&Submission],
    info: Option<&ContestListEntry>,
) -> SubmissionGroup {
    let input = submissions
        .first()
        .map(|submission| classification_input(submission))
        .unwrap_or_default();
    let contest_id = input.contest().cloned();
    let timing = info.map(|info| ContestTiming {
        start_time: info.start_time,
        duration_seconds: info.duration_seconds,
    });

    let label = classify(&input, |_| timing);
    let contest_name = match info {
        Some(info) => info.name.clone(),
        None => fallback_name(contest_id.as_ref()),
    };
    let window = timing.and_then(|timing| window_text(timing, &Local));

    SubmissionGroup {
        key,
        contest_id,
        contest_name,
        label,
        window,
        submission_ids: submissions.iter().map(|submission| submission.id).collect(),
    }
}
