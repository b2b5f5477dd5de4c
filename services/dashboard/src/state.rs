//! Application state shared across handlers

use detail::UserMediaSubscription;
use std::sync::Arc;

use crate::registry::DetailRegistry;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: DetailRegistry,
    pub user_media: Arc<UserMediaSubscription>,
}
