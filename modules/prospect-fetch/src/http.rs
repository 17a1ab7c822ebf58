use std::time::Duration;

use async_trait::async_trait;
use spider_transformations::transformation::content::{
    transform_content_input, ReturnFormat, TransformConfig, TransformInput,
};
use tracing::{info, warn};

use crate::{extract, ContentFetcher, FetchedContent};

/// Fetcher backed by a plain HTTP GET plus Readability extraction of the
/// main content. The whole fetch is capped by a hard timeout; on expiry a
/// timeout failure is reported rather than an error raised.
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .user_agent("Mozilla/5.0 (compatible; ProspectBot/0.1)")
                .build()
                .expect("Failed to build HTTP client"),
            timeout,
        }
    }

    async fn get_html(&self, url: &str) -> Result<String, String> {
        let parsed = url::Url::parse(url).map_err(|e| format!("Invalid URL: {e}"))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(format!(
                "Only http/https URLs are allowed, got: {}",
                parsed.scheme()
            ));
        }

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("Request failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(format!("HTTP status {status}"));
        }

        resp.text()
            .await
            .map_err(|e| format!("Failed to read body: {e}"))
    }

    /// Readable main-content text via Readability extraction.
    fn readable_text(url: &str, html: &str) -> String {
        let parsed_url = url::Url::parse(url).ok();
        let config = TransformConfig {
            readability: true,
            main_content: true,
            return_format: ReturnFormat::Markdown,
            filter_images: true,
            filter_svg: true,
            clean_html: true,
        };
        let input = TransformInput {
            url: parsed_url.as_ref(),
            content: html.as_bytes(),
            screenshot_bytes: None,
            encoding: None,
            selector_config: None,
            ignore_tags: None,
        };
        transform_content_input(input, &config)
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchedContent {
        info!(url, "Fetching content");

        let html = match tokio::time::timeout(self.timeout, self.get_html(url)).await {
            Ok(Ok(html)) => html,
            Ok(Err(e)) => {
                warn!(url, error = %e, "Fetch failed");
                return FetchedContent::failed(url, e);
            }
            Err(_) => {
                warn!(url, timeout_secs = self.timeout.as_secs(), "Fetch timed out");
                return FetchedContent::failed(
                    url,
                    format!("Timed out after {}s", self.timeout.as_secs()),
                );
            }
        };

        if html.trim().is_empty() {
            warn!(url, "Empty response body");
            return FetchedContent::failed(url, "Empty response body");
        }

        let text = Self::readable_text(url, &html);
        let body = if text.trim().is_empty() { &html } else { &text };

        let content = FetchedContent {
            url: url.to_string(),
            success: true,
            title: extract::extract_title(&html),
            description: extract::extract_description(&html),
            company_name: extract::extract_company_name(&html),
            contact: extract::extract_contact(body),
            social: extract::extract_social_links(&html),
            services: extract::extract_services(body),
            text: Some(body.to_string()).filter(|t| !t.trim().is_empty()),
            error: None,
        };

        info!(
            url,
            bytes = content.body_len(),
            has_email = content.contact.email.is_some(),
            "Fetched successfully"
        );
        content
    }
}
