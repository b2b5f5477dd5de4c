//! Registry of live video detail subscriptions
//!
//! The first read of a video starts its poller. Readers keep it alive; a
//! subscription nobody has read for the idle period is dropped, which stops
//! its poller.

use chrono::Utc;
use detail::source::{Fetch, Snapshot, video_key};
use detail::{RawVideoRecord, VideoDetailSubscription, VideoDetailView, ViewContext, assemble};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info};

/// Registry entry
struct Entry {
    subscription: VideoDetailSubscription,
    last_read: Instant,
}

/// Video detail subscriptions keyed by video id
#[derive(Clone)]
pub struct DetailRegistry {
    fetcher: Arc<dyn Fetch<RawVideoRecord>>,
    interval: Duration,
    ctx: ViewContext,
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl DetailRegistry {
    /// Create a new registry
    pub fn new(
        fetcher: Arc<dyn Fetch<RawVideoRecord>>,
        interval: Duration,
        ctx: ViewContext,
    ) -> Self {
        Self {
            fetcher,
            interval,
            ctx,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn context(&self) -> &ViewContext {
        &self.ctx
    }

    /// Current view of a video, subscribing to it on first read
    ///
    /// An id that is not usable yet, or that is not a single path segment,
    /// gets the empty view and starts nothing.
    pub async fn view(&self, video_id: &str) -> VideoDetailView {
        let Some(key) = video_key(Some(video_id)) else {
            let ctx = self.ctx.clone().at(Utc::now());
            return assemble(&Snapshot::default(), &ctx);
        };

        let mut entries = self.entries.lock().await;
        let entry = entries.entry(key).or_insert_with_key(|key| {
            info!("Subscribing to video {}", key);
            Entry {
                subscription: VideoDetailSubscription::start(
                    self.fetcher.clone(),
                    Some(key.as_str()),
                    self.interval,
                    self.ctx.clone(),
                ),
                last_read: Instant::now(),
            }
        });

        entry.last_read = Instant::now();
        entry.subscription.view()
    }

    /// Ask a live subscription to fetch immediately
    pub async fn refresh(&self, video_id: &str) -> bool {
        let Some(key) = video_key(Some(video_id)) else {
            return false;
        };

        let entries = self.entries.lock().await;
        match entries.get(&key) {
            Some(entry) => {
                entry.subscription.refresh();
                true
            }
            None => false,
        }
    }

    /// Drop a subscription and stop its poller
    pub async fn unsubscribe(&self, video_id: &str) -> bool {
        let Some(key) = video_key(Some(video_id)) else {
            return false;
        };

        let removed = self.entries.lock().await.remove(&key);
        if removed.is_some() {
            info!("Unsubscribed from video {}", key);
        }
        removed.is_some()
    }

    /// Drop every subscription unread for longer than `max_idle`
    pub async fn reap_idle(&self, max_idle: Duration) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|video_id, entry| {
            let keep = entry.last_read.elapsed() <= max_idle;
            if !keep {
                debug!("Dropping idle subscription for video {}", video_id);
            }
            keep
        });
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Reap idle subscriptions every `every`
    pub fn spawn_reaper(&self, every: Duration, max_idle: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = time::interval(every);
            loop {
                ticker.tick().await;
                let reaped = registry.reap_idle(max_idle).await;
                if reaped > 0 {
                    info!("Reaped {} idle video subscriptions", reaped);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use common::{FetchResult, LoadingPolicy};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Fetch<RawVideoRecord> for Counting {
        async fn fetch(&self, key: &str) -> FetchResult<RawVideoRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(RawVideoRecord {
                id: Some(key.to_string()),
                duration: Some(10.0),
                ..RawVideoRecord::default()
            })
        }
    }

    fn registry() -> (DetailRegistry, Arc<Counting>) {
        let fetcher = Arc::new(Counting {
            calls: AtomicUsize::new(0),
        });
        let registry = DetailRegistry::new(
            fetcher.clone(),
            Duration::from_millis(500),
            ViewContext::new("https://vcms.example.com", LoadingPolicy::DurationProxy),
        );
        (registry, fetcher)
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_read_subscribes() {
        let (registry, fetcher) = registry();

        let first = registry.view("v1").await;
        assert!(first.video_loading);
        assert_eq!(registry.len().await, 1);

        time::sleep(Duration::from_millis(10)).await;
        let second = registry.view("v1").await;
        assert!(!second.video_loading);
        assert_eq!(registry.len().await, 1);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unready_id_does_not_subscribe() {
        let (registry, fetcher) = registry();

        let view = registry.view("null").await;
        assert!(!view.has_error);
        assert!(view.video.is_none());
        assert_eq!(registry.len().await, 0);

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_path_like_id_does_not_subscribe() {
        let (registry, fetcher) = registry();

        for id in ["../auth/users/me/", "x?author=ada", "x#top", ".."] {
            let view = registry.view(id).await;
            assert!(view.video.is_none());
            assert!(!registry.refresh(id).await);
        }
        assert_eq!(registry.len().await, 0);

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_padded_id_resolves_to_same_subscription() {
        let (registry, _fetcher) = registry();
        registry.view(" v1 ").await;

        assert!(registry.refresh("v1").await);
        assert!(registry.refresh(" v1 ").await);
        assert!(registry.unsubscribe(" v1 ").await);
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsubscribe_stops_polling() {
        let (registry, fetcher) = registry();
        registry.view("v1").await;
        time::sleep(Duration::from_millis(10)).await;

        assert!(registry.unsubscribe("v1").await);
        assert!(!registry.unsubscribe("v1").await);

        let calls = fetcher.calls.load(Ordering::SeqCst);
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reap_idle() {
        let (registry, _fetcher) = registry();
        registry.view("old").await;
        time::sleep(Duration::from_secs(30)).await;
        registry.view("fresh").await;
        time::sleep(Duration::from_secs(31)).await;

        assert_eq!(registry.reap_idle(Duration::from_secs(60)).await, 1);
        assert_eq!(registry.len().await, 1);
        assert!(!registry.refresh("old").await);
        assert!(registry.refresh("fresh").await);
    }
}
