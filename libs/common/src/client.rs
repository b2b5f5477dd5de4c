//! HTTP client for the VCMS backend
//!
//! Thin wrapper over `reqwest` that knows the dashboard endpoints and the
//! `Authorization: JWT <token>` header convention. Retries are left to the
//! caller's poll loop.

use reqwest::{Client, Url, header};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    config::VcmsConfig,
    error::{ConfigError, ConfigResult, FetchError, FetchResult},
};

/// VCMS API client
#[derive(Debug, Clone)]
pub struct VcmsClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl VcmsClient {
    /// Build a client from the runtime configuration
    pub fn new(config: &VcmsConfig) -> ConfigResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(ConfigError::Client)?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of a single video's detail record
    ///
    /// The id is always one percent-encoded path segment under `/spa/video/`.
    pub fn video_detail_url(&self, video_id: &str) -> FetchResult<String> {
        if matches!(video_id, "" | "." | "..") {
            return Err(FetchError::InvalidUrl(format!(
                "video id {:?} is not a path segment",
                video_id
            )));
        }

        let mut url = Url::parse(&self.video_list_url())
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push(video_id);

        Ok(url.into())
    }

    /// URL of the authenticated user's profile
    pub fn current_user_url(&self) -> String {
        format!("{}/spa/auth/users/me/", self.base_url)
    }

    /// URL of the video list, filtered by author through a query parameter
    pub fn video_list_url(&self) -> String {
        format!("{}/spa/video/", self.base_url)
    }

    /// GET a JSON document and decode it
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> FetchResult<T> {
        debug!("Fetching {}", url);

        let mut request = self
            .http
            .get(url)
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(token) = &self.token {
            request = request.header(header::AUTHORIZATION, format!("JWT {}", token));
        }

        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }

    /// Fetch a video's detail record
    pub async fn video_detail<T: DeserializeOwned>(&self, video_id: &str) -> FetchResult<T> {
        let url = self.video_detail_url(video_id)?;
        self.get_json(&url, &[]).await
    }

    /// Fetch the authenticated user's profile
    pub async fn current_user<T: DeserializeOwned>(&self) -> FetchResult<T> {
        self.get_json(&self.current_user_url(), &[]).await
    }

    /// Fetch the videos uploaded by `author`
    pub async fn author_media<T: DeserializeOwned>(&self, author: &str) -> FetchResult<T> {
        self.get_json(&self.video_list_url(), &[("author", author)])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> VcmsClient {
        let config = VcmsConfig {
            base_url: base_url.to_string(),
            ..VcmsConfig::default()
        };
        VcmsClient::new(&config).expect("Failed to build client")
    }

    #[test]
    fn test_endpoint_urls() {
        let client = client("https://vcms.example.com");

        assert_eq!(
            client.video_detail_url("42").unwrap(),
            "https://vcms.example.com/spa/video/42"
        );
        assert_eq!(
            client.current_user_url(),
            "https://vcms.example.com/spa/auth/users/me/"
        );
        assert_eq!(client.video_list_url(), "https://vcms.example.com/spa/video/");
    }

    #[test]
    fn test_video_id_stays_one_path_segment() {
        let client = client("https://vcms.example.com");

        let traversal = client.video_detail_url("../auth/users/me/").unwrap();
        let traversal = Url::parse(&traversal).unwrap();
        assert_eq!(traversal.path(), "/spa/video/..%2Fauth%2Fusers%2Fme%2F");
        assert_eq!(traversal.query(), None);

        let query = client.video_detail_url("x?author=ada").unwrap();
        let query = Url::parse(&query).unwrap();
        assert_eq!(query.path(), "/spa/video/x%3Fauthor=ada");
        assert_eq!(query.query(), None);

        let fragment = client.video_detail_url("x#top").unwrap();
        let fragment = Url::parse(&fragment).unwrap();
        assert_eq!(fragment.path(), "/spa/video/x%23top");
        assert_eq!(fragment.fragment(), None);
    }

    #[test]
    fn test_dot_segments_are_rejected() {
        let client = client("https://vcms.example.com");

        for id in ["", ".", ".."] {
            assert!(matches!(
                client.video_detail_url(id),
                Err(FetchError::InvalidUrl(_))
            ));
        }
    }

    #[test]
    fn test_unparseable_base_url() {
        let client = client("nobaseURL");
        assert!(matches!(
            client.video_detail_url("42"),
            Err(FetchError::InvalidUrl(_))
        ));
    }
}
