//! Live subscriptions tying a poller to its view
//!
//! A subscription owns its pollers; dropping it stops them.

use common::VcmsConfig;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

use crate::media::{UserMediaView, UserView, author_key, user_media_view, user_view};
use crate::models::{MediaList, RawVideoRecord, User};
use crate::source::{Fetch, PollHandle, Snapshot, spawn_poll, video_key};
use crate::view::{VideoDetailView, ViewContext, assemble};

/// Polls one video's detail record and assembles its view on demand
#[derive(Debug)]
pub struct VideoDetailSubscription {
    handle: PollHandle<RawVideoRecord>,
    ctx: ViewContext,
}

impl VideoDetailSubscription {
    /// Start polling `video_id`; an unready id never fetches
    pub fn start(
        fetcher: Arc<dyn Fetch<RawVideoRecord>>,
        video_id: Option<&str>,
        interval: Duration,
        ctx: ViewContext,
    ) -> Self {
        let handle = spawn_poll(fetcher, video_key(video_id), interval);
        Self { handle, ctx }
    }

    /// Start with the configured interval, base path and loading policy
    pub fn from_config(
        fetcher: Arc<dyn Fetch<RawVideoRecord>>,
        video_id: Option<&str>,
        config: &VcmsConfig,
    ) -> Self {
        Self::start(
            fetcher,
            video_id,
            config.detail_poll_interval(),
            ViewContext::from_config(config),
        )
    }

    pub fn snapshot(&self) -> Snapshot<RawVideoRecord> {
        self.handle.latest()
    }

    /// Assemble the view from the latest snapshot, dated now
    pub fn view(&self) -> VideoDetailView {
        let ctx = self.ctx.clone().at(chrono::Utc::now());
        assemble(&self.handle.latest(), &ctx)
    }

    pub fn context(&self) -> &ViewContext {
        &self.ctx
    }

    pub fn refresh(&self) {
        self.handle.refresh();
    }

    pub fn stop(&self) {
        self.handle.stop();
    }
}

/// Polls the user's profile and, once the username is known, their uploads
pub struct UserMediaSubscription {
    media_fetcher: Arc<dyn Fetch<MediaList>>,
    user: PollHandle<User>,
    media: Mutex<Option<PollHandle<MediaList>>>,
    interval: Duration,
}

impl UserMediaSubscription {
    pub fn start(
        user_fetcher: Arc<dyn Fetch<User>>,
        media_fetcher: Arc<dyn Fetch<MediaList>>,
        interval: Duration,
    ) -> Self {
        Self {
            media_fetcher,
            user: spawn_poll(user_fetcher, Some("me".to_string()), interval),
            media: Mutex::new(None),
            interval,
        }
    }

    pub fn user(&self) -> UserView {
        user_view(&self.user.latest())
    }

    /// Assemble the media view, starting or re-keying the list poller when
    /// the username changed
    ///
    /// Must be called from within a Tokio runtime.
    pub fn view(&self) -> UserMediaView {
        let user = self.user.latest();
        let author = author_key(&user);

        let mut media = self.media.lock().unwrap_or_else(PoisonError::into_inner);

        let current = media.as_ref().and_then(|handle| handle.key());
        if current != author.as_deref() {
            debug!("Media list key changed to {:?}", author);
            *media = author
                .clone()
                .map(|key| spawn_poll(self.media_fetcher.clone(), Some(key), self.interval));
        }

        let media_snapshot = media.as_ref().map(PollHandle::latest).unwrap_or_default();
        user_media_view(&user, &media_snapshot)
    }

    pub fn stop(&self) {
        self.user.stop();
        if let Some(handle) = self
            .media
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            handle.stop();
        }
    }
}
