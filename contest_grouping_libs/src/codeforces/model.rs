use crate::classify::ParticipantType;
use serde::{Deserialize, Serialize};

/// Envelope every Codeforces API method answers with.
#[derive(Serialize, Deserialize, Debug)]
pub struct ApiResponse<T> {
    pub status: String,
    pub comment: Option<String>,
    pub result: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn is_ok(&self) -> bool {
        self.status == "OK"
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Contest {
    pub id: Option<i64>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub phase: Option<String>,
    #[serde(alias = "startTimeSeconds")]
    pub start_time_seconds: Option<i64>,
    #[serde(alias = "durationSeconds")]
    pub duration_seconds: Option<i64>,
}

/// The part of a `contest.standings` result the metadata lookup reads.
#[derive(Serialize, Deserialize, Debug)]
pub struct StandingsResult {
    pub contest: Option<Contest>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    #[serde(alias = "contestId")]
    pub contest_id: Option<i64>,
    pub index: Option<String>,
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Party {
    #[serde(alias = "participantType")]
    pub participant_type: Option<ParticipantType>,
}

/// One entry of a `user.status` result.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: i64,
    #[serde(alias = "contestId")]
    pub contest_id: Option<i64>,
    #[serde(alias = "creationTimeSeconds")]
    pub creation_time_seconds: Option<i64>,
    pub problem: Option<Problem>,
    pub author: Option<Party>,
}

impl Submission {
    pub fn problem_contest_id(&self) -> Option<i64> {
        self.problem
            .as_ref()
            .and_then(|problem| problem.contest_id)
            .or(self.contest_id)
    }

    pub fn participant_type(&self) -> Option<&ParticipantType> {
        self.author
            .as_ref()
            .and_then(|author| author.participant_type.as_ref())
    }
}
