use crate::{
    cache::{ContestListCache, ContestListEntry, ContestMetadataCache, ContestRecord},
    classify::{classify, Label, SubmissionClassificationInput},
    clock::Clock,
    codeforces::{
        client::{CodeforcesError, ContestApi, LookupError},
        model::Submission,
    },
    contest::ContestId,
    grouping::{self, SubmissionGroup},
    options::{Options, OptionsStore},
    store::{KeyValueStore, StoreError},
};
use std::sync::Arc;
use validator::Validate;

/// Entry point for every command: metadata lookups, classification, options and grouping.
pub struct ContestService {
    options: OptionsStore,
    metadata: ContestMetadataCache,
    contest_list: ContestListCache,
    api: Arc<dyn ContestApi>,
}

impl ContestService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        api: Arc<dyn ContestApi>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let options = OptionsStore::new(store.clone());
        let metadata = ContestMetadataCache::new(
            store.clone(),
            options.clone(),
            api.clone(),
            clock.clone(),
        );
        let contest_list = ContestListCache::new(store, options.clone(), api.clone(), clock);

        ContestService {
            options,
            metadata,
            contest_list,
            api,
        }
    }

    pub async fn get_contest_metadata(
        &self,
        contest_id: &ContestId,
    ) -> Result<ContestRecord, LookupError> {
        self.metadata.get(contest_id).await
    }

    /// Label one submission, looking the contest up only when the participant type does not
    /// decide it already. A malformed contest id or negative timestamp never reaches the upstream.
    pub async fn classify_submission(&self, input: &SubmissionClassificationInput) -> Label {
        let valid = match input.validate() {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("skipping contest lookup for malformed input: {}", e);
                false
            }
        };

        let timing = match input.contest() {
            Some(contest_id) if valid && input.needs_metadata() => {
                match self.metadata.get(contest_id).await {
                    Ok(record) => Some(record.timing()),
                    Err(e) => {
                        tracing::debug!("no metadata for contest {}: {}", contest_id, e);
                        None
                    }
                }
            }
            _ => None,
        };

        classify(input, |_| timing)
    }

    pub async fn get_options(&self) -> Options {
        self.options.get().await
    }

    pub async fn set_options(&self, options: &Options) -> Result<(), StoreError> {
        self.options.set(options).await
    }

    /// Drop both the per-contest cache and the bulk contest list.
    pub async fn clear_cache(&self) -> Result<(), StoreError> {
        self.metadata.clear().await?;
        self.contest_list.clear().await?;
        Ok(())
    }

    /// Group `submissions` (newest first, as the upstream lists them) under contest headers.
    pub async fn group(&self, submissions: &[Submission]) -> Vec<SubmissionGroup> {
        let mut contests = self.contest_list.load().await;
        let mut groups = Vec::new();

        for (key, members) in grouping::partition(submissions) {
            let contest_id = members
                .first()
                .and_then(|submission| grouping::classification_input(submission).contest_id)
                .filter(|contest_id| !contest_id.is_empty());

            let info = match &contest_id {
                Some(contest_id) => match contests.get(contest_id).cloned() {
                    Some(entry) => Some(entry),
                    None => {
                        let entry = self.resolve(contest_id).await;
                        if let Some(entry) = &entry {
                            contests.insert(contest_id.clone(), entry.clone());
                        }
                        entry
                    }
                },
                None => None,
            };

            groups.push(grouping::build_group(key, &members, info.as_ref()));
        }

        groups
    }

    /// Fetch the submissions of `handle` and group them. Produces nothing while grouping is
    /// disabled.
    pub async fn group_submissions(
        &self,
        handle: &str,
    ) -> Result<Vec<SubmissionGroup>, CodeforcesError> {
        if !self.options.get().await.enabled {
            tracing::info!("Grouping is disabled, skipping {}.", handle);
            return Ok(Vec::new());
        }

        let submissions = self.api.fetch_user_status(handle).await?;
        Ok(self.group(&submissions).await)
    }

    /// Look a contest missing from the bulk list up through the metadata cache and remember it
    /// in the list.
    async fn resolve(&self, contest_id: &ContestId) -> Option<ContestListEntry> {
        let record = match self.metadata.get(contest_id).await {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!("contest {} unresolved: {}", contest_id, e);
                return None;
            }
        };

        let entry = ContestListEntry {
            name: record
                .contest_name
                .unwrap_or_else(|| grouping::fallback_name(Some(contest_id))),
            start_time: record.start_time,
            duration_seconds: record.duration_seconds,
        };
        self.contest_list.merge(contest_id, entry.clone()).await;

        Some(entry)
    }
}
