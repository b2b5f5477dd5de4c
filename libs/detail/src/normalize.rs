//! Flattening of the resolution → codec encodings map
//!
//! Produces the flat rendition list and the h264 download list consumed by
//! the detail view. Ordering follows the map: resolutions by height, codecs by
//! name. Consumers that need identity across polls key by `encoding_id`.

use serde::Serialize;

use crate::format::resolve_asset;
use crate::models::{EncodedVideo, RawVideoRecord, ResolutionKey};

/// Codec key that gets a direct download entry
pub const H264_CODEC: &str = "h264";

/// Name given to h264 entries whose rendition has no title yet
pub const PENDING_NAME: &str = "pending";

/// A rendition together with where it sits in the encodings map
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedEncodedVideo {
    pub resolution: String,
    /// Codec key the rendition was listed under
    pub encoder: String,
    /// Thumbnail path of the parent video
    pub thumbnail: Option<String>,
    /// Preview path of the parent video
    pub preview: Option<String>,
    pub url: Option<String>,
    pub size: Option<String>,
    pub status: Option<String>,
    pub title: Option<String>,
    /// Stable identity across polls, kept under the backend's field name
    #[serde(rename = "encoding_id")]
    pub encoding_id: Option<String>,
    pub progress: Option<f64>,
}

impl ExtendedEncodedVideo {
    fn new(
        record: &RawVideoRecord,
        resolution: &ResolutionKey,
        codec: &str,
        video: &EncodedVideo,
    ) -> Self {
        Self {
            resolution: resolution.as_str().to_string(),
            encoder: codec.to_string(),
            thumbnail: record.thumbnail_url.clone(),
            preview: record.preview_url.clone(),
            url: video.url.clone(),
            size: video.size.clone(),
            status: video.status.clone(),
            title: video.title.clone(),
            encoding_id: video.encoding_id.clone(),
            progress: video.progress,
        }
    }

    /// Whether the rendition has a file to download yet
    pub fn is_ready(&self) -> bool {
        self.url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

/// Download entry for an h264 rendition
///
/// `url` is `None` while the rendition has no file yet; the entry is still
/// listed so the pending encoding stays visible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct H264Rendition {
    pub name: String,
    pub url: Option<String>,
}

/// Output of a normalization pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Renditions {
    pub all: Vec<ExtendedEncodedVideo>,
    pub h264: Vec<H264Rendition>,
}

/// Flatten a record's encodings into the rendition lists
///
/// An absent record or an empty `encodings_info` yields two empty lists.
pub fn normalize(record: Option<&RawVideoRecord>, base_url: &str) -> Renditions {
    let Some(record) = record else {
        return Renditions::default();
    };

    let mut renditions = Renditions::default();

    for (resolution, codecs) in &record.encodings_info {
        for (codec, video) in codecs {
            let extended = ExtendedEncodedVideo::new(record, resolution, codec, video);

            if extended.encoder == H264_CODEC {
                renditions.h264.push(H264Rendition {
                    name: extended
                        .title
                        .clone()
                        .filter(|title| !title.is_empty())
                        .unwrap_or_else(|| PENDING_NAME.to_string()),
                    url: resolve_asset(base_url, extended.url.as_deref()),
                });
            }

            renditions.all.push(extended);
        }
    }

    renditions
}
