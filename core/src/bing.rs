use std::time::Duration;

use eyre::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::BingConfig;

pub const MAX_IMAGE_RESULTS: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResult {
    pub name: Option<String>,
    pub content_url: String,
    pub thumbnail_url: String,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    value: Vec<ImageResult>,
}

/// Bing Image Search v7, used to pick cover images
pub struct BingClient {
    http: reqwest::Client,
    config: BingConfig,
}

impl BingClient {
    pub fn new(config: BingConfig) -> Result<BingClient> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .wrap_err("error building http client")?;
        Ok(BingClient { http, config })
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn search_images(&self, query: &str, count: u32) -> Result<Vec<ImageResult>> {
        let query = query.trim();
        if query.is_empty() {
            bail!("image search query is empty");
        }
        let count = count.clamp(1, MAX_IMAGE_RESULTS);
        let response: ImagesResponse = self
            .http
            .get(format!("{}/v7.0/images/search", self.config.endpoint))
            .header("Ocp-Apim-Subscription-Key", &self.config.subscription_key)
            .query(&[
                ("q", query.to_owned()),
                ("count", count.to_string()),
                ("safeSearch", "Strict".to_owned()),
            ])
            .send()
            .await
            .wrap_err("error requesting image search")?
            .error_for_status()
            .wrap_err("image search returned an error")?
            .json()
            .await
            .wrap_err("error parsing image search response")?;
        Ok(response.value)
    }
}
