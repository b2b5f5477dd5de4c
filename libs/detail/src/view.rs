//! Assembly of the video detail view
//!
//! [`assemble`] runs the whole pipeline on one snapshot: normalize the
//! encodings, format the display metadata, classify loading and resolve asset
//! URLs. It is pure, so running it on every tick is safe and two runs on the
//! same snapshot give equal views.

use chrono::{DateTime, Utc};
use common::{LoadingPolicy, VcmsConfig};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::classify::is_loading;
use crate::format::{DATE_COMPONENTS, VideoImageAssets, format_duration, published_on_date};
use crate::models::RawVideoRecord;
use crate::normalize::{ExtendedEncodedVideo, H264Rendition, normalize};
use crate::source::Snapshot;

/// Explicit inputs of the pipeline besides the record itself
#[derive(Debug, Clone)]
pub struct ViewContext {
    pub base_url: String,
    pub loading_policy: LoadingPolicy,
    /// Reference instant for relative dates
    pub now: DateTime<Utc>,
}

impl ViewContext {
    pub fn new(base_url: impl Into<String>, loading_policy: LoadingPolicy) -> Self {
        Self {
            base_url: base_url.into(),
            loading_policy,
            now: Utc::now(),
        }
    }

    pub fn from_config(config: &VcmsConfig) -> Self {
        Self::new(config.base_url.clone(), config.loading_policy)
    }

    /// Same context with a fixed reference instant
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}

/// Human-readable metadata of a video
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMeta {
    pub title: String,
    pub state: String,
    pub date_published: String,
    pub date_modified: String,
    pub formatted_duration: String,
}

impl PostMeta {
    pub fn from_record(record: Option<&RawVideoRecord>, now: DateTime<Utc>) -> Self {
        let text = |value: Option<&String>| value.cloned().unwrap_or_default();

        Self {
            title: text(record.and_then(|r| r.title.as_ref())),
            state: text(record.and_then(|r| r.state.as_ref())),
            date_published: published_on_date(
                record.and_then(|r| r.add_date.as_deref()),
                now,
                DATE_COMPONENTS,
            ),
            date_modified: published_on_date(
                record.and_then(|r| r.edit_date.as_deref()),
                now,
                DATE_COMPONENTS,
            ),
            formatted_duration: format_duration(record.and_then(|r| r.duration)),
        }
    }
}

/// Everything the detail page reads, derived from one snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetailView {
    pub has_error: bool,
    pub video_loading: bool,
    pub video: Option<Arc<RawVideoRecord>>,
    pub post_meta: PostMeta,
    pub video_image_assets: VideoImageAssets,
    #[serde(rename = "encodedFilesArray")]
    pub encoded_files: Vec<ExtendedEncodedVideo>,
    #[serde(rename = "encodedH264FilesArray")]
    pub encoded_h264_files: Vec<H264Rendition>,
    pub hls_assets: BTreeMap<String, Value>,
    pub hls_master_file: Option<String>,
}

/// Run the detail pipeline on a snapshot
pub fn assemble(snapshot: &Snapshot<RawVideoRecord>, ctx: &ViewContext) -> VideoDetailView {
    let record = snapshot.data.as_deref();

    let post_meta = PostMeta::from_record(record, ctx.now);
    let has_error = snapshot.has_error();
    let video_loading = is_loading(
        ctx.loading_policy,
        snapshot.state,
        has_error,
        &post_meta.formatted_duration,
    );

    let renditions = normalize(record, &ctx.base_url);

    let hls_assets = record.map(|r| r.hls_info.clone()).unwrap_or_default();
    let hls_master_file = hls_assets
        .get("master_file")
        .and_then(Value::as_str)
        .filter(|path| !path.is_empty())
        .map(str::to_string);

    VideoDetailView {
        has_error,
        video_loading,
        video: snapshot.data.clone(),
        post_meta,
        video_image_assets: VideoImageAssets::resolve(record, &ctx.base_url),
        encoded_files: renditions.all,
        encoded_h264_files: renditions.h264,
        hls_assets,
        hls_master_file,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::DATE_PLACEHOLDER;
    use chrono::TimeZone;
    use common::FetchError;
    use serde_json::json;

    const BASE: &str = "https://vcms.example.com";

    fn ctx() -> ViewContext {
        ViewContext::new(BASE, LoadingPolicy::DurationProxy)
            .at(Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap())
    }

    fn record(value: serde_json::Value) -> RawVideoRecord {
        serde_json::from_value(value).expect("record should deserialize")
    }

    fn sample() -> RawVideoRecord {
        record(json!({
            "id": "v1",
            "title": "Launch",
            "state": "public",
            "duration": 3725,
            "add_date": "2024-06-14T12:00:00Z",
            "thumbnail_url": "/media/thumb.jpg",
            "poster_url": "/media/poster.jpg",
            "encodings_info": {
                "720p": { "h264": { "url": "/720.mp4", "status": "running" }, "vp9": { "status": "pending" } },
                "1080p": { "h264": { "url": "/1080.mp4", "status": "success" } }
            },
            "hls_info": { "master_file": "/hls/master.m3u8", "720_playlist": "/hls/720.m3u8" }
        }))
    }

    #[test]
    fn test_before_first_fetch() {
        let view = assemble(&Snapshot::default(), &ctx());

        assert!(!view.has_error);
        assert!(view.video_loading);
        assert!(view.video.is_none());
        assert_eq!(view.post_meta.title, "");
        assert_eq!(view.post_meta.formatted_duration, "");
        assert_eq!(view.post_meta.date_published, DATE_PLACEHOLDER);
        assert_eq!(view.post_meta.date_modified, DATE_PLACEHOLDER);
        assert_eq!(view.video_image_assets, VideoImageAssets::default());
        assert!(view.encoded_files.is_empty());
        assert!(view.encoded_h264_files.is_empty());
        assert!(view.hls_assets.is_empty());
        assert_eq!(view.hls_master_file, None);
    }

    #[test]
    fn test_full_record() {
        let view = assemble(&Snapshot::settled(Ok(sample())), &ctx());

        assert!(!view.has_error);
        assert!(!view.video_loading);
        assert_eq!(view.post_meta.title, "Launch");
        assert_eq!(view.post_meta.state, "public");
        assert_eq!(view.post_meta.formatted_duration, "01:02:05");
        assert_eq!(view.post_meta.date_published, "1 day ago");
        assert_eq!(view.post_meta.date_modified, DATE_PLACEHOLDER);
        assert_eq!(view.encoded_files.len(), 3);
        assert_eq!(view.encoded_h264_files.len(), 2);
        assert_eq!(
            view.video_image_assets.video_thumbnail_url.as_deref(),
            Some("https://vcms.example.com/media/thumb.jpg")
        );
        assert_eq!(view.video_image_assets.video_sprites_url, None);
        assert_eq!(view.hls_master_file.as_deref(), Some("/hls/master.m3u8"));
        assert_eq!(view.hls_assets.len(), 2);
    }

    #[test]
    fn test_error_is_passed_through() {
        let snapshot = Snapshot::<RawVideoRecord>::settled(Err(FetchError::Status {
            url: "x".to_string(),
            status: 500,
        }));
        let view = assemble(&snapshot, &ctx());

        assert!(view.has_error);
        assert!(!view.video_loading);
        assert!(view.encoded_files.is_empty());
    }

    #[test]
    fn test_zero_duration_keeps_loading() {
        let snapshot = Snapshot::settled(Ok(record(json!({ "duration": 0, "title": "Broken" }))));
        let view = assemble(&snapshot, &ctx());

        assert_eq!(view.post_meta.formatted_duration, "");
        assert!(view.video_loading);

        let fetch_state = ViewContext {
            loading_policy: LoadingPolicy::FetchState,
            ..ctx()
        };
        assert!(!assemble(&snapshot, &fetch_state).video_loading);
    }

    #[test]
    fn test_assembly_is_idempotent() {
        let snapshot = Snapshot::settled(Ok(sample()));
        assert_eq!(assemble(&snapshot, &ctx()), assemble(&snapshot, &ctx()));
    }

    #[test]
    fn test_status_change_touches_one_rendition() {
        let before = sample();
        let mut after = sample();
        after
            .encodings_info
            .get_mut(&crate::models::ResolutionKey::new("720p"))
            .and_then(|codecs| codecs.get_mut("vp9"))
            .expect("vp9 rendition")
            .status = Some("success".to_string());

        let before = assemble(&Snapshot::settled(Ok(before)), &ctx());
        let after = assemble(&Snapshot::settled(Ok(after)), &ctx());

        assert_eq!(before.encoded_files.len(), after.encoded_files.len());
        let changed: Vec<usize> = before
            .encoded_files
            .iter()
            .zip(&after.encoded_files)
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(changed.len(), 1);

        let old = &before.encoded_files[changed[0]];
        let new = &after.encoded_files[changed[0]];
        assert_eq!(old.status.as_deref(), Some("pending"));
        assert_eq!(new.status.as_deref(), Some("success"));
        assert_eq!(
            ExtendedEncodedVideo {
                status: None,
                ..old.clone()
            },
            ExtendedEncodedVideo {
                status: None,
                ..new.clone()
            }
        );
        assert_eq!(before.encoded_h264_files, after.encoded_h264_files);
    }

    #[test]
    fn test_view_serializes_with_dashboard_field_names() {
        let view = assemble(&Snapshot::settled(Ok(sample())), &ctx());
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["videoLoading"], false);
        assert_eq!(json["postMeta"]["formattedDuration"], "01:02:05");
        assert_eq!(json["encodedFilesArray"].as_array().map(Vec::len), Some(3));
        assert_eq!(json["encodedH264FilesArray"][0]["name"], "pending");
        assert_eq!(json["hlsMasterFile"], "/hls/master.m3u8");
    }
}
