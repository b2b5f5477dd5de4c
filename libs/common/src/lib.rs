//! Common library for the VCMS dashboard
//!
//! This crate provides shared functionality used by the detail pipeline and
//! the dashboard service: runtime configuration, the backend HTTP client and
//! error types.

pub mod client;
pub mod config;
pub mod error;

pub use client::VcmsClient;
pub use config::{DEFAULT_BASE_URL, LoadingPolicy, VcmsConfig};
pub use error::{ConfigError, FetchError, FetchResult};

/// Example usage of the client
///
/// ```rust,no_run
/// use common::{VcmsClient, VcmsConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = VcmsConfig::from_env()?;
///     let client = VcmsClient::new(&config)?;
///     let video: serde_json::Value = client.video_detail("42").await?;
///     println!("Video: {}", video);
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
