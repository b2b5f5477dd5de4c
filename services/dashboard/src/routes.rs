//! Dashboard service routes

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use detail::stats::{header_stats, rendition_cards};
use serde_json::json;

use crate::{
    error::{DashboardError, DashboardResult},
    state::AppState,
};

/// Create the router for the dashboard service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/videos/:id", get(get_video).delete(unsubscribe_video))
        .route("/videos/:id/renditions", get(get_renditions))
        .route("/videos/:id/stats", get(get_stats))
        .route("/videos/:id/refresh", post(refresh_video))
        .route("/me", get(get_user))
        .route("/me/media", get(get_user_media))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "dashboard",
        "subscriptions": state.registry.len().await
    }))
}

/// Assembled detail view of a video
pub async fn get_video(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    Json(state.registry.view(&id).await)
}

/// One card per encoded rendition
pub async fn get_renditions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let view = state.registry.view(&id).await;
    let base_url = &state.registry.context().base_url;

    Json(rendition_cards(&view.encoded_files, base_url))
}

/// Header stats of a video, `null` until the record arrives
pub async fn get_stats(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let view = state.registry.view(&id).await;

    Json(json!({
        "stats": header_stats(view.video.as_deref()),
    }))
}

/// Fetch a subscribed video right away
pub async fn refresh_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> DashboardResult<impl IntoResponse> {
    if state.registry.refresh(&id).await {
        Ok(StatusCode::ACCEPTED)
    } else {
        Err(DashboardError::NotFound(format!(
            "No subscription for video {}",
            id
        )))
    }
}

/// Stop polling a video
pub async fn unsubscribe_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> DashboardResult<impl IntoResponse> {
    if id.trim().is_empty() {
        return Err(DashboardError::BadRequest("Video id is empty".to_string()));
    }

    if state.registry.unsubscribe(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(DashboardError::NotFound(format!(
            "No subscription for video {}",
            id
        )))
    }
}

/// Authentication state of the configured user
pub async fn get_user(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.user_media.user())
}

/// The configured user's uploads
pub async fn get_user_media(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.user_media.view())
}
