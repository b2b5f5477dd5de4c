//! Video detail pipeline for the VCMS dashboard
//!
//! Turns the backend's video record, whose `encodings_info` is a nested
//! resolution → codec map filled in while encoding runs, into flat views
//! that are safe to rebuild on every poll tick:
//!
//! 1. [`source`] polls a record and publishes [`Snapshot`]s
//! 2. [`normalize`] flattens the encodings into rendition lists
//! 3. [`format`] derives durations, relative dates and asset URLs
//! 4. [`classify`] decides the loading signal
//! 5. [`view`] assembles the [`VideoDetailView`]
//!
//! ```rust,no_run
//! use detail::{VideoDetailSubscription, source::Fetch, models::RawVideoRecord};
//! use common::{VcmsClient, VcmsConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = VcmsConfig::from_env()?;
//!     let client: Arc<dyn Fetch<RawVideoRecord>> = Arc::new(VcmsClient::new(&config)?);
//!     let subscription = VideoDetailSubscription::from_config(client, Some("42"), &config);
//!     let view = subscription.view();
//!     println!("{} renditions", view.encoded_files.len());
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod format;
pub mod media;
pub mod models;
pub mod normalize;
pub mod source;
pub mod stats;
pub mod subscription;
pub mod view;

pub use models::{EncodedVideo, MediaList, RawVideoRecord, ResolutionKey, User};
pub use normalize::{ExtendedEncodedVideo, H264Rendition, normalize};
pub use source::{Fetch, FetchState, PollHandle, Snapshot, spawn_poll, video_key};
pub use subscription::{UserMediaSubscription, VideoDetailSubscription};
pub use view::{PostMeta, VideoDetailView, ViewContext, assemble};
