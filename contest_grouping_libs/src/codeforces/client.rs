use crate::{
    codeforces::{
        limiter::RateLimiter,
        model::{ApiResponse, Contest, StandingsResult, Submission},
    },
    contest::ContestId,
};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{sync::Arc, time::Duration};
use thiserror::Error;

type Result<T> = std::result::Result<T, CodeforcesError>;

/// Number of submissions requested from `user.status` in one call.
pub const USER_STATUS_COUNT: u32 = 100000;

#[derive(Debug, Error)]
pub enum CodeforcesError {
    #[error("failed to request to Codeforces API: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("failed to deserialize JSON data: {0}")]
    DeserializeError(#[from] serde_json::Error),
    #[error("invalid Codeforces API url given: {0}")]
    InvalidUrlError(#[from] url::ParseError),
    #[error("{0}")]
    ApiError(String),
}

/// Why the metadata of a single contest could not be resolved.
///
/// The `Display` form is the error string reported to callers of the command surface.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "kebab-case")]
pub enum LookupError {
    #[error("no-contest-id")]
    NoContestId,
    #[error("gym-not-found")]
    GymNotFound,
    #[error("{}", .0.as_deref().unwrap_or("not-found"))]
    NotFound(Option<String>),
    #[error("{0}")]
    NetworkError(String),
    #[error("api-disabled")]
    ApiDisabled,
}

/// Metadata of one contest as resolved from the upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContestSummary {
    pub contest_name: String,
    pub start_time: Option<i64>,
    pub duration_seconds: Option<i64>,
}

/// Interpret a `contest.standings` answer. Success requires an `OK` status and a named contest.
pub fn interpret_standings(
    response: ApiResponse<StandingsResult>,
) -> std::result::Result<ContestSummary, LookupError> {
    let ok = response.is_ok();
    let contest = response.result.and_then(|result| result.contest);

    match contest {
        Some(Contest {
            name: Some(name),
            start_time_seconds,
            duration_seconds,
            ..
        }) if ok => Ok(ContestSummary {
            contest_name: name,
            start_time: start_time_seconds,
            duration_seconds,
        }),
        _ => Err(LookupError::NotFound(response.comment)),
    }
}

#[async_trait]
pub trait ContestApi: Send + Sync {
    /// Resolve name, start time and duration of one contest.
    async fn fetch_contest(
        &self,
        contest_id: &ContestId,
    ) -> std::result::Result<ContestSummary, LookupError>;
    /// Fetch every non-gym contest.
    async fn fetch_contest_list(&self) -> Result<Vec<Contest>>;
    /// Fetch the submissions of a user, newest first.
    async fn fetch_user_status(&self, handle: &str) -> Result<Vec<Submission>>;
}

pub struct CodeforcesClient {
    standings_url: Url,
    contest_list_url: Url,
    user_status_url: Url,
    client: Client,
    limiter: Arc<RateLimiter>,
}

impl CodeforcesClient {
    pub fn new(base_url: &str, limiter: Arc<RateLimiter>) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        base_url.set_path("");
        let standings_url = base_url.join("api/contest.standings")?;
        let contest_list_url = base_url.join("api/contest.list")?;
        let user_status_url = base_url.join("api/user.status")?;

        let client = Client::builder()
            .gzip(true)
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(CodeforcesClient {
            standings_url,
            contest_list_url,
            user_status_url,
            client,
            limiter,
        })
    }

    /// Request the standings of a contest for exactly one row, only to read the contest object.
    ///
    /// The upstream answers unknown contests with HTTP 400 and a `FAILED` envelope, so the
    /// status code is not checked here and the body is always parsed.
    async fn request_standings(&self, id: &str) -> Result<ApiResponse<StandingsResult>> {
        self.limiter.acquire().await;

        let res = self
            .client
            .get(self.standings_url.clone())
            .query(&[("contestId", id), ("from", "1"), ("count", "1")])
            .send()
            .await?;
        let body = res.text().await?;
        let response = serde_json::from_str(&body)?;

        Ok(response)
    }

    /// GET a list method and unwrap its envelope. Error statuses and `FAILED` envelopes are errors.
    async fn request_list<T>(&self, url: Url, params: &[(&str, String)]) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        self.limiter.acquire().await;

        let res = self.client.get(url.clone()).query(params).send().await?;
        if let Err(e) = res.error_for_status_ref() {
            let message = format!("error response returned from {}: {}", url, e);
            tracing::error!(message);
            return Err(CodeforcesError::ApiError(message));
        }

        let body = res.text().await?;
        let response: ApiResponse<Vec<T>> = serde_json::from_str(&body)?;
        if !response.is_ok() {
            let message = format!(
                "{} returned non-OK status: {}",
                url,
                response.comment.unwrap_or_default()
            );
            tracing::warn!(message);
            return Err(CodeforcesError::ApiError(message));
        }

        Ok(response.result.unwrap_or_default())
    }
}

#[async_trait]
impl ContestApi for CodeforcesClient {
    async fn fetch_contest(
        &self,
        contest_id: &ContestId,
    ) -> std::result::Result<ContestSummary, LookupError> {
        if contest_id.is_empty() {
            return Err(LookupError::NoContestId);
        }

        if let Some(gym_id) = contest_id.gym_id() {
            return match self.request_standings(gym_id).await {
                Ok(response) => {
                    interpret_standings(response).map_err(|_| LookupError::GymNotFound)
                }
                Err(e) => {
                    tracing::warn!("failed to fetch gym contest {}: {}", contest_id, e);
                    Err(LookupError::GymNotFound)
                }
            };
        }

        match self.request_standings(contest_id.as_str()).await {
            Ok(response) => interpret_standings(response),
            Err(e) => {
                tracing::warn!("failed to fetch contest {}: {}", contest_id, e);
                Err(LookupError::NetworkError(e.to_string()))
            }
        }
    }

    async fn fetch_contest_list(&self) -> Result<Vec<Contest>> {
        tracing::info!("Start to retrieve contest list from Codeforces.");
        let contests: Vec<Contest> = self
            .request_list(
                self.contest_list_url.clone(),
                &[("gym", String::from("false"))],
            )
            .await?;
        tracing::info!("{} contests successfully retrieved.", contests.len());

        Ok(contests)
    }

    async fn fetch_user_status(&self, handle: &str) -> Result<Vec<Submission>> {
        tracing::info!("Start to retrieve submissions of {}.", handle);
        let submissions: Vec<Submission> = self
            .request_list(
                self.user_status_url.clone(),
                &[
                    ("handle", handle.to_string()),
                    ("from", String::from("1")),
                    ("count", USER_STATUS_COUNT.to_string()),
                ],
            )
            .await?;
        tracing::info!("{} submissions successfully retrieved.", submissions.len());

        Ok(submissions)
    }
}
