//! Stat cards for the video header and the encoded asset list

use serde::Serialize;

use crate::format::{format_duration, resolve_asset};
use crate::models::RawVideoRecord;
use crate::normalize::ExtendedEncodedVideo;

/// One labelled value on a stat card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatItem {
    pub stat_title: String,
    pub stat_value: String,
}

impl StatItem {
    fn new(title: &str, value: impl Into<String>) -> Self {
        Self {
            stat_title: title.to_string(),
            stat_value: value.into(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Duration, size and status of the whole video
///
/// `None` until a record has been fetched.
pub fn header_stats(record: Option<&RawVideoRecord>) -> Option<Vec<StatItem>> {
    let record = record?;

    let duration = format_duration(record.duration);
    Some(vec![
        StatItem::new(
            "Duration",
            if duration.is_empty() { "-".to_string() } else { duration },
        ),
        StatItem::new("Size", non_empty(record.size.as_deref()).unwrap_or("0")),
        StatItem::new(
            "Status",
            non_empty(record.encoding_status.as_deref()).unwrap_or("unknown"),
        ),
    ])
}

/// Download block of a rendition that has a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadLink {
    pub file_url: String,
    pub file_type: String,
    pub file_name: String,
    pub button_text: String,
}

/// Card shown for one rendition in the encoded asset list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenditionCard {
    #[serde(rename = "encoding_id")]
    pub encoding_id: Option<String>,
    pub title: Option<String>,
    pub thumbnail_url: Option<String>,
    pub stats: Vec<StatItem>,
    pub download: Option<DownloadLink>,
}

pub fn rendition_card(rendition: &ExtendedEncodedVideo, base_url: &str) -> RenditionCard {
    let codec = if rendition.encoder.is_empty() {
        "-".to_string()
    } else {
        rendition.encoder.to_uppercase()
    };

    let stats = vec![
        StatItem::new("Codec", codec),
        StatItem::new("Size", non_empty(rendition.size.as_deref()).unwrap_or("0")),
        StatItem::new(
            "Encoding Status",
            non_empty(rendition.status.as_deref()).unwrap_or("unknown"),
        ),
    ];

    let download = non_empty(rendition.url.as_deref()).map(|url| {
        let file_type = url.rsplit('.').next().unwrap_or(url).to_string();
        let name = non_empty(rendition.title.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}-{}", rendition.resolution, rendition.encoder));

        DownloadLink {
            file_url: format!("{}{}", base_url, url),
            file_name: format!("{}.{}", name, file_type),
            button_text: format!("Download {}", file_type),
            file_type,
        }
    });

    RenditionCard {
        encoding_id: rendition.encoding_id.clone(),
        title: rendition.title.clone(),
        thumbnail_url: resolve_asset(base_url, rendition.thumbnail.as_deref()),
        stats,
        download,
    }
}

pub fn rendition_cards(renditions: &[ExtendedEncodedVideo], base_url: &str) -> Vec<RenditionCard> {
    renditions
        .iter()
        .map(|rendition| rendition_card(rendition, base_url))
        .collect()
}
