//! Views over the authenticated user and their uploads

use serde::Serialize;
use std::sync::Arc;

use crate::models::{MediaList, User};
use crate::source::{Snapshot, resource_key};

/// Authentication state derived from the profile fetch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub loading: bool,
    pub is_authenticated: bool,
    pub user: Option<Arc<User>>,
}

pub fn user_view(snapshot: &Snapshot<User>) -> UserView {
    let has_error = snapshot.has_error();
    let has_id = snapshot
        .data
        .as_deref()
        .is_some_and(|user| user.id.is_some());

    UserView {
        loading: snapshot.data.is_none() && !has_error,
        is_authenticated: has_id && !has_error,
        user: snapshot.data.clone(),
    }
}

/// Key of the media list fetch, ready once the user's name is known
pub fn author_key(user: &Snapshot<User>) -> Option<String> {
    resource_key(user.data.as_deref().and_then(|u| u.username.as_deref()))
}

/// The user's uploads with their loading and error signals
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMediaView {
    /// Set only when both the profile and the list fetch failed
    pub has_error: bool,
    pub user_loading: bool,
    pub media_loading: bool,
    pub media: Option<Arc<MediaList>>,
}

pub fn user_media_view(user: &Snapshot<User>, media: &Snapshot<MediaList>) -> UserMediaView {
    UserMediaView {
        has_error: user.has_error() && media.has_error(),
        user_loading: user.data.is_none() && !user.has_error(),
        media_loading: media.data.is_none() && !media.has_error(),
        media: media.data.clone(),
    }
}
