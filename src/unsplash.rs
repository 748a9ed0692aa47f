//! Unsplash-backed image lookup

use crate::config::UnsplashConfig;
use crate::error::PortError;
use crate::ports::{ImagePort, PortResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Deserialize)]
struct Photo {
    urls: PhotoUrls,
}

#[derive(Deserialize)]
struct PhotoUrls {
    regular: String,
}

/// Resolves item images through the Unsplash photo search
pub struct UnsplashImages {
    client: reqwest::Client,
    base_url: String,
    access_key: String,
}

impl UnsplashImages {
    pub fn new(base_url: impl Into<String>, access_key: impl Into<String>) -> PortResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent("purchase-tool/0.1")
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_key: access_key.into(),
        })
    }

    /// Builds a client from config, `None` when no access key is set
    pub fn from_config(config: &UnsplashConfig) -> PortResult<Option<Self>> {
        match &config.access_key {
            Some(key) => Self::new(&config.base_url, key).map(Some),
            None => Ok(None),
        }
    }

    fn first_photo(body: SearchResponse, item_name: &str) -> PortResult<String> {
        body.results
            .into_iter()
            .next()
            .map(|p| p.urls.regular)
            .ok_or_else(|| PortError::NotFound(format!("No image for '{}'", item_name)))
    }
}

#[async_trait]
impl ImagePort for UnsplashImages {
    async fn resolve_image_url(&self, item_name: &str) -> PortResult<String> {
        let response = self
            .client
            .get(format!("{}/search/photos", self.base_url))
            .query(&[("query", item_name), ("per_page", "1")])
            .header("Authorization", format!("Client-ID {}", self.access_key))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PortError::Unavailable(format!(
                "Unsplash returned HTTP {}",
                response.status().as_u16()
            )));
        }

        let body: SearchResponse = response.json().await?;
        Self::first_photo(body, item_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_result() {
        let body: SearchResponse = serde_json::from_str(
            r#"{"total": 2, "results": [
                {"id": "x", "urls": {"regular": "https://images.unsplash.com/x", "small": "s"}},
                {"id": "y", "urls": {"regular": "https://images.unsplash.com/y"}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            UnsplashImages::first_photo(body, "lamp").unwrap(),
            "https://images.unsplash.com/x"
        );
    }

    #[test]
    fn empty_results_are_not_found() {
        let body: SearchResponse = serde_json::from_str(r#"{"results": []}"#).unwrap();
        assert!(matches!(
            UnsplashImages::first_photo(body, "lamp"),
            Err(PortError::NotFound(_))
        ));
    }

    #[test]
    fn no_key_means_no_client() {
        let config = UnsplashConfig::default();
        assert!(UnsplashImages::from_config(&config).unwrap().is_none());
    }
}
