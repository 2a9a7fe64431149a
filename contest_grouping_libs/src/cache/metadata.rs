use crate::{
    cache::ContestRecord,
    clock::Clock,
    codeforces::client::{ContestApi, LookupError},
    contest::ContestId,
    options::OptionsStore,
    store::{self, KeyValueStore},
};
use std::{collections::BTreeMap, sync::Arc};

pub const CONTEST_CACHE_KEY: &str = "contest_cache_v1";

pub type ContestRecordMap = BTreeMap<ContestId, ContestRecord>;

/// Read-through cache of per-contest metadata, persisted as one map under `contest_cache_v1`.
///
/// Failed lookups are cached as negative entries, so an unresolvable contest is asked for at
/// most once per TTL.
pub struct ContestMetadataCache {
    store: Arc<dyn KeyValueStore>,
    options: OptionsStore,
    api: Arc<dyn ContestApi>,
    clock: Arc<dyn Clock>,
}

impl ContestMetadataCache {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        options: OptionsStore,
        api: Arc<dyn ContestApi>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        ContestMetadataCache {
            store,
            options,
            api,
            clock,
        }
    }

    pub async fn get(&self, contest_id: &ContestId) -> Result<ContestRecord, LookupError> {
        if contest_id.is_empty() {
            return Err(LookupError::NoContestId);
        }

        let options = self.options.get().await;
        let ttl = options.cache_ttl_millis();

        let map = self.read_map().await;
        if let Some(record) = map.get(contest_id) {
            if record.is_fresh(self.clock.now_millis(), ttl) {
                tracing::debug!("cache hit for contest {}", contest_id);
                return record.clone().into_result();
            }
        }

        if !options.use_remote_lookup {
            tracing::debug!("remote lookup disabled, contest {} unresolved", contest_id);
            return Err(LookupError::ApiDisabled);
        }

        match self.api.fetch_contest(contest_id).await {
            Ok(summary) => {
                let record = ContestRecord::resolved(summary, self.clock.now_millis());
                self.write_entry(contest_id, record.clone()).await;
                Ok(record)
            }
            Err(e) => {
                tracing::info!("lookup of contest {} failed: {}", contest_id, e);
                let record = ContestRecord::negative(e.clone(), self.clock.now_millis());
                self.write_entry(contest_id, record).await;
                Err(e)
            }
        }
    }

    /// Forget every cached contest.
    pub async fn clear(&self) -> Result<(), store::StoreError> {
        store::write(self.store.as_ref(), CONTEST_CACHE_KEY, &ContestRecordMap::new()).await?;
        tracing::info!("Contest metadata cache cleared.");
        Ok(())
    }

    async fn read_map(&self) -> ContestRecordMap {
        match store::read::<ContestRecordMap>(self.store.as_ref(), CONTEST_CACHE_KEY).await {
            Ok(map) => map.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("failed to read contest cache, treating it as empty: {}", e);
                ContestRecordMap::new()
            }
        }
    }

    /// Merge one entry into the latest persisted map. Entries written concurrently for other
    /// contests are kept; for the same contest the last write wins.
    async fn write_entry(&self, contest_id: &ContestId, record: ContestRecord) {
        let mut map = self.read_map().await;
        map.insert(contest_id.clone(), record);

        if let Err(e) = store::write(self.store.as_ref(), CONTEST_CACHE_KEY, &map).await {
            tracing::error!("failed to write contest cache entry {}: {}", contest_id, e);
        }
    }
}
