//! Backend record types for the VCMS video endpoints
//!
//! The backend fills fields in as encoding progresses, so everything is
//! optional. Deserialization is lenient: wrongly-typed scalars become `None`
//! and malformed branches of `encodings_info` become empty maps instead of
//! failing the whole record.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// Resolution label such as `"720p"`, ordered by its numeric height
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolutionKey(String);

impl ResolutionKey {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading digits of the label, e.g. `1080` for `"1080p"`
    pub fn height(&self) -> Option<u32> {
        let digits: String = self.0.chars().take_while(char::is_ascii_digit).collect();
        digits.parse().ok()
    }
}

impl Ord for ResolutionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.height(), other.height()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for ResolutionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Codec key (e.g. `"h264"`) to rendition
pub type CodecMap = BTreeMap<String, EncodedVideo>;

/// Resolution to codec to rendition
pub type EncodingsInfo = BTreeMap<ResolutionKey, CodecMap>;

/// One rendition as reported under `encodings_info`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodedVideo {
    #[serde(deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub size: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub encoder: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub encoding_id: Option<String>,
    /// Encoding progress in percent
    #[serde(deserialize_with = "lenient_f64")]
    pub progress: Option<f64>,
}

/// Video detail record returned by `GET /spa/video/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawVideoRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub state: Option<String>,
    /// Length in seconds
    #[serde(deserialize_with = "lenient_f64")]
    pub duration: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub add_date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub edit_date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub thumbnail_url: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub preview_url: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub sprites_url: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub poster_url: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub thumbnail_time: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub size: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub encoding_status: Option<String>,
    #[serde(deserialize_with = "encodings")]
    pub encodings_info: EncodingsInfo,
    #[serde(deserialize_with = "object_or_empty")]
    pub hls_info: BTreeMap<String, Value>,
}

/// Profile returned by `GET /spa/auth/users/me/`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub username: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
}

/// Video list returned by `GET /spa/video/?author=...`
///
/// Accepts either a bare array or a paginated `{"results": [...]}` page.
/// Entries that are not objects are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MediaList(pub Vec<RawVideoRecord>);

impl<'de> Deserialize<'de> for MediaList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = match Value::deserialize(deserializer)? {
            Value::Array(items) => items,
            Value::Object(mut page) => match page.remove("results") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };

        Ok(MediaList(
            items
                .into_iter()
                .filter(Value::is_object)
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        ))
    }
}

/// Normalize a raw `encodings_info` value into the two-level map
///
/// Anything that is not an object at the top level yields an empty map. A
/// resolution whose value is not an object keeps no codecs. A codec entry
/// that is not an object is kept as an empty rendition, since the backend
/// reports pending encodings that way.
pub fn encodings_from_value(value: Value) -> EncodingsInfo {
    let Value::Object(resolutions) = value else {
        return EncodingsInfo::new();
    };

    resolutions
        .into_iter()
        .map(|(resolution, codecs)| (ResolutionKey::new(resolution), codec_map(codecs)))
        .collect()
}

fn codec_map(value: Value) -> CodecMap {
    match value {
        Value::Object(codecs) => codecs
            .into_iter()
            .map(|(codec, entry)| (codec, encoded_video(entry)))
            .collect(),
        other => {
            debug!("Ignoring malformed codec map: {}", other);
            CodecMap::new()
        }
    }
}

fn encoded_video(value: Value) -> EncodedVideo {
    if !value.is_object() {
        return EncodedVideo::default();
    }

    serde_json::from_value(value).unwrap_or_else(|e| {
        debug!("Ignoring malformed rendition: {}", e);
        EncodedVideo::default()
    })
}

fn encodings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<EncodingsInfo, D::Error> {
    Ok(encodings_from_value(Value::deserialize(deserializer)?))
}

fn object_or_empty<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, Value>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => map.into_iter().collect(),
        _ => BTreeMap::new(),
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}
