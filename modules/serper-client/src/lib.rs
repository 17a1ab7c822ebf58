pub mod error;
pub mod types;

pub use error::{Result, SerperError};
pub use types::SearchHit;

use std::time::Duration;

use tracing::info;

use types::SerperResponse;

const BASE_URL: &str = "https://google.serper.dev/search";

/// Client for the Serper.dev Google Search API.
pub struct SerperClient {
    client: reqwest::Client,
    api_key: String,
}

impl SerperClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            api_key: api_key.to_string(),
        }
    }

    pub fn has_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Run one search query, returning up to `max_results` organic hits.
    pub async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        if self.api_key.is_empty() {
            return Err(SerperError::MissingApiKey);
        }

        info!(query, max_results, "Serper search");

        let body = serde_json::json!({
            "q": query,
            "num": max_results,
        });

        let resp = self
            .client
            .post(BASE_URL)
            .header("X-API-KEY", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SerperError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let data: SerperResponse = resp
            .json()
            .await
            .map_err(|e| SerperError::Parse(e.to_string()))?;

        let hits: Vec<SearchHit> = data
            .organic
            .into_iter()
            .take(max_results)
            .map(SearchHit::from)
            .collect();

        info!(query, count = hits.len(), "Serper search complete");
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_reported_before_any_request() {
        let client = SerperClient::new("");
        assert!(!client.has_key());

        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let err = rt.block_on(client.search("anything", 5)).unwrap_err();
        assert!(matches!(err, SerperError::MissingApiKey));
    }

    #[test]
    fn response_parsing_tolerates_missing_fields() {
        let raw = r#"{"organic":[{"link":"https://a.example","title":"A"},{}]}"#;
        let parsed: SerperResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.organic.len(), 2);
        let hits: Vec<SearchHit> = parsed.organic.into_iter().map(SearchHit::from).collect();
        assert_eq!(hits[0].url, "https://a.example");
        assert!(hits[1].url.is_empty());
    }
}
