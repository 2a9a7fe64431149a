use crate::options::OptionsStore;
use tokio::{
    sync::Mutex,
    time::{self, Instant},
};

/// Gate that spaces upstream requests at least `rateLimitMs` apart.
///
/// One instance is shared by every request the process makes. Callers waiting in `acquire`
/// are served one at a time in the order they arrived.
pub struct RateLimiter {
    options: OptionsStore,
    last_granted: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(options: OptionsStore) -> Self {
        RateLimiter {
            options,
            last_granted: Mutex::new(None),
        }
    }

    /// Wait until the configured interval has passed since the previous grant, then grant.
    pub async fn acquire(&self) {
        let interval = self.options.get().await.rate_limit_interval();

        let mut last_granted = self.last_granted.lock().await;
        if let Some(previous) = *last_granted {
            let ready_at = previous + interval;
            let wait = ready_at.saturating_duration_since(Instant::now());
            if !wait.is_zero() {
                tracing::debug!(
                    "Rate limited, waiting {} ms before next request",
                    wait.as_millis()
                );
                time::sleep_until(ready_at).await;
            }
        }
        *last_granted = Some(Instant::now());
    }
}
