//! Fetch/poll source
//!
//! A poller owns one backend key and re-fetches it on a fixed interval,
//! publishing [`Snapshot`]s through a `watch` channel. Receivers are only
//! woken when the data or the error actually changed, so a record that stays
//! the same across ticks does not churn downstream views.

use async_trait::async_trait;
use common::{FetchError, FetchResult, VcmsClient};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, watch};
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::models::{MediaList, RawVideoRecord, User};

/// Source of one kind of backend record
#[async_trait]
pub trait Fetch<T>: Send + Sync {
    /// Fetch the record identified by `key`
    async fn fetch(&self, key: &str) -> FetchResult<T>;
}

#[async_trait]
impl Fetch<RawVideoRecord> for VcmsClient {
    async fn fetch(&self, key: &str) -> FetchResult<RawVideoRecord> {
        self.video_detail(key).await
    }
}

/// The key is ignored: the profile is always the authenticated user's
#[async_trait]
impl Fetch<User> for VcmsClient {
    async fn fetch(&self, _key: &str) -> FetchResult<User> {
        self.current_user().await
    }
}

/// The key is the author's username
#[async_trait]
impl Fetch<MediaList> for VcmsClient {
    async fn fetch(&self, key: &str) -> FetchResult<MediaList> {
        self.author_media(key).await
    }
}

/// Progress of a poller's first fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchState {
    /// No fetch attempted, either not yet or because the key is not ready
    #[default]
    NotStarted,
    /// The first fetch is running
    InFlight,
    /// At least one fetch has completed
    Done,
}

/// Latest known state of a polled record
///
/// `data` survives a failed tick, so a transient error leaves the last good
/// record in place next to the error.
#[derive(Debug, PartialEq)]
pub struct Snapshot<T> {
    pub data: Option<Arc<T>>,
    pub error: Option<FetchError>,
    pub state: FetchState,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            state: FetchState::NotStarted,
        }
    }
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            error: self.error.clone(),
            state: self.state,
        }
    }
}

impl<T: PartialEq> Snapshot<T> {
    /// Snapshot of a completed fetch
    pub fn settled(result: FetchResult<T>) -> Self {
        let mut snapshot = Self::default();
        snapshot.apply(result);
        snapshot
    }

    /// Fold one fetch result in; returns whether anything observable changed
    pub fn apply(&mut self, result: FetchResult<T>) -> bool {
        let mut changed = self.state != FetchState::Done;
        self.state = FetchState::Done;

        match result {
            Ok(data) => {
                if self.error.take().is_some() {
                    changed = true;
                }
                if self.data.as_deref() != Some(&data) {
                    self.data = Some(Arc::new(data));
                    changed = true;
                }
            }
            Err(error) => {
                if self.error.as_ref() != Some(&error) {
                    self.error = Some(error);
                    changed = true;
                }
            }
        }

        changed
    }
}

impl<T> Snapshot<T> {
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Turn a possibly-unready identifier into a fetchable key
///
/// Empty strings and the literals `"null"` and `"undefined"` are treated as
/// "not available yet".
pub fn resource_key(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    match raw {
        "" | "null" | "undefined" => None,
        key => Some(key.to_string()),
    }
}

/// Like [`resource_key`], but only for ids that fit in one URL path segment
///
/// Ids carrying `/`, `?` or `#`, and the dot segments, never become a key.
pub fn video_key(raw: Option<&str>) -> Option<String> {
    resource_key(raw)
        .filter(|key| !matches!(key.as_str(), "." | "..") && !key.contains(['/', '?', '#']))
}

/// Handle to a running poller
///
/// Dropping the handle stops the poller.
#[derive(Debug)]
pub struct PollHandle<T> {
    key: Option<String>,
    rx: watch::Receiver<Snapshot<T>>,
    refresh: Arc<Notify>,
    cancel: CancellationToken,
}

impl<T> PollHandle<T> {
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Most recent snapshot
    pub fn latest(&self) -> Snapshot<T> {
        self.rx.borrow().clone()
    }

    /// A receiver that is woken on every observable change
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.rx.clone()
    }

    /// Fetch now instead of waiting for the next tick
    pub fn refresh(&self) {
        self.refresh.notify_one();
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl<T> Drop for PollHandle<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Start polling `key` every `interval`
///
/// With no key nothing is fetched and the snapshot stays empty, without an
/// error. The first fetch happens immediately. Must be called from within a
/// Tokio runtime.
pub fn spawn_poll<T>(
    fetcher: Arc<dyn Fetch<T>>,
    key: Option<String>,
    interval: Duration,
) -> PollHandle<T>
where
    T: PartialEq + Send + Sync + 'static,
{
    let (tx, rx) = watch::channel(Snapshot::default());
    let refresh = Arc::new(Notify::new());
    let cancel = CancellationToken::new();

    let handle = PollHandle {
        key: key.clone(),
        rx,
        refresh: refresh.clone(),
        cancel: cancel.clone(),
    };

    let Some(key) = key else {
        debug!("Poll key not ready, nothing to fetch");
        return handle;
    };

    info!("Polling {} every {:?}", key, interval);

    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tx.closed() => break,
                _ = ticker.tick() => {}
                _ = refresh.notified() => ticker.reset(),
            }

            tx.send_if_modified(|snapshot| {
                if snapshot.state == FetchState::NotStarted {
                    snapshot.state = FetchState::InFlight;
                    true
                } else {
                    false
                }
            });

            let result = tokio::select! {
                _ = cancel.cancelled() => break,
                result = fetcher.fetch(&key) => result,
            };

            if let Err(e) = &result {
                warn!("Fetch for {} failed: {}", key, e);
            }

            tx.send_if_modified(|snapshot| snapshot.apply(result));
        }

        debug!("Poller for {} stopped", key);
    });

    handle
}
