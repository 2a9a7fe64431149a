use crate::{
    clock::Clock,
    codeforces::{client::ContestApi, model::Contest},
    contest::ContestId,
    options::OptionsStore,
    store::{self, KeyValueStore, StoreError},
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};

pub const CONTEST_LIST_KEY: &str = "contest_list_v1";
/// The bulk snapshot is refreshed wholesale once it is a day old.
pub const CONTEST_LIST_TTL_MILLIS: i64 = 24 * 3600 * 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestListEntry {
    pub name: String,
    pub start_time: Option<i64>,
    pub duration_seconds: Option<i64>,
}

impl From<Contest> for ContestListEntry {
    fn from(contest: Contest) -> Self {
        let name = match (contest.name, contest.id) {
            (Some(name), _) => name,
            (None, Some(id)) => format!("Contest {}", id),
            (None, None) => String::from("Contest"),
        };
        ContestListEntry {
            name,
            start_time: contest.start_time_seconds,
            duration_seconds: contest.duration_seconds,
        }
    }
}

pub type ContestListMap = BTreeMap<ContestId, ContestListEntry>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestListSnapshot {
    pub fetched_at: i64,
    pub map: ContestListMap,
}

/// Bulk snapshot of every non-gym contest, used as the first place to look a contest up.
pub struct ContestListCache {
    store: Arc<dyn KeyValueStore>,
    options: OptionsStore,
    api: Arc<dyn ContestApi>,
    clock: Arc<dyn Clock>,
}

impl ContestListCache {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        options: OptionsStore,
        api: Arc<dyn ContestApi>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        ContestListCache {
            store,
            options,
            api,
            clock,
        }
    }

    /// The contest map, refreshed from the upstream when the snapshot is missing or a day old.
    ///
    /// A failed refresh yields an empty map and leaves nothing behind, so the next call tries
    /// again.
    pub async fn load(&self) -> ContestListMap {
        let snapshot = self.read_snapshot().await;
        let now = self.clock.now_millis();

        if let Some(snapshot) = &snapshot {
            if now - snapshot.fetched_at < CONTEST_LIST_TTL_MILLIS {
                return snapshot.map.clone();
            }
        }

        if !self.options.get().await.use_remote_lookup {
            tracing::debug!("remote lookup disabled, using stored contest list as is");
            return snapshot.map(|snapshot| snapshot.map).unwrap_or_default();
        }

        let contests = match self.api.fetch_contest_list().await {
            Ok(contests) => contests,
            Err(e) => {
                tracing::warn!("failed to refresh contest list: {}", e);
                return ContestListMap::new();
            }
        };

        let map: ContestListMap = contests
            .into_iter()
            .filter_map(|contest| {
                let id = contest.id?;
                Some((ContestId::from(id), ContestListEntry::from(contest)))
            })
            .collect();

        let snapshot = ContestListSnapshot {
            fetched_at: self.clock.now_millis(),
            map,
        };
        if let Err(e) = store::write(self.store.as_ref(), CONTEST_LIST_KEY, &snapshot).await {
            tracing::error!("failed to write contest list: {}", e);
        }

        snapshot.map
    }

    /// Add a contest resolved elsewhere to the stored snapshot, keeping its `fetchedAt`.
    ///
    /// Gym contests never enter the list, and without a stored snapshot nothing is written.
    pub async fn merge(&self, contest_id: &ContestId, entry: ContestListEntry) {
        if contest_id.is_gym() || contest_id.is_empty() {
            return;
        }

        let mut snapshot = match self.read_snapshot().await {
            Some(snapshot) => snapshot,
            None => return,
        };
        snapshot.map.insert(contest_id.clone(), entry);

        if let Err(e) = store::write(self.store.as_ref(), CONTEST_LIST_KEY, &snapshot).await {
            tracing::error!("failed to merge contest {} into contest list: {}", contest_id, e);
        }
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(CONTEST_LIST_KEY).await?;
        tracing::info!("Contest list cache cleared.");
        Ok(())
    }

    async fn read_snapshot(&self) -> Option<ContestListSnapshot> {
        match store::read::<ContestListSnapshot>(self.store.as_ref(), CONTEST_LIST_KEY).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("failed to read contest list, ignoring it: {}", e);
                None
            }
        }
    }
}
