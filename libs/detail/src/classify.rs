//! Loading classification for the detail view

use common::LoadingPolicy;

use crate::source::FetchState;

/// Decide whether the detail view should still show a loading state
///
/// Under [`LoadingPolicy::DurationProxy`] a video counts as loading until the
/// backend reports a duration, so media with no known duration never leaves
/// the loading state. [`LoadingPolicy::FetchState`] only reports loading while
/// the first fetch is in flight. A reported error is never "loading".
pub fn is_loading(
    policy: LoadingPolicy,
    state: FetchState,
    has_error: bool,
    formatted_duration: &str,
) -> bool {
    if has_error {
        return false;
    }

    match policy {
        LoadingPolicy::DurationProxy => formatted_duration.is_empty(),
        LoadingPolicy::FetchState => state == FetchState::InFlight,
    }
}
