pub mod classify;
pub mod clear_cache;
pub mod group;
pub mod metadata;
pub mod options;
pub mod server;

use anyhow::{Context, Result};
use contest_grouping_libs::{
    clock::SystemClock,
    codeforces::{client::CodeforcesClient, limiter::RateLimiter},
    options::OptionsStore,
    store::{KeyValueStore, SqliteStore},
    ContestService,
};
use std::{env, sync::Arc};

/// Wire the store, rate limiter and Codeforces client together from the environment.
pub async fn build_service() -> Result<ContestService> {
    let database_url = env::var("CACHE_DATABASE_URL").unwrap_or_else(|_| {
        tracing::warn!("CACHE_DATABASE_URL environment variable is not set. Default value `sqlite://contest_cache.db` will be used.");
        String::from("sqlite://contest_cache.db")
    });
    let api_url = env::var("CODEFORCES_API_URL").unwrap_or_else(|_| {
        tracing::warn!("CODEFORCES_API_URL environment variable is not set. Default value `https://codeforces.com` will be used.");
        String::from("https://codeforces.com")
    });

    let store: Arc<dyn KeyValueStore> = Arc::new(
        SqliteStore::connect(&database_url)
            .await
            .with_context(|| {
                let message = format!("failed to open cache database {}", database_url);
                tracing::error!(message);
                message
            })?,
    );

    let limiter = Arc::new(RateLimiter::new(OptionsStore::new(store.clone())));
    let client = CodeforcesClient::new(&api_url, limiter).with_context(|| {
        let message = format!("couldn't create Codeforces client for {}", api_url);
        tracing::error!(message);
        message
    })?;

    Ok(ContestService::new(
        store,
        Arc::new(client),
        Arc::new(SystemClock),
    ))
}
