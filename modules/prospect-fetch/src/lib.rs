pub mod extract;
pub mod http;

pub use http::HttpFetcher;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Contact details harvested from a page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactSignals {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialLinks {
    pub linkedin: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub twitter: Option<String>,
    pub youtube: Option<String>,
}

impl SocialLinks {
    pub fn count(&self) -> usize {
        [
            &self.linkedin,
            &self.facebook,
            &self.instagram,
            &self.twitter,
            &self.youtube,
        ]
        .iter()
        .filter(|l| l.is_some())
        .count()
    }

    /// A professional-network profile carries more signal than general
    /// social presence.
    pub fn has_professional_profile(&self) -> bool {
        self.linkedin.is_some()
    }
}

/// Structured signals extracted from one URL. Fetch failures are reported
/// in-band: `success == false` with `error` set, never a panic or Err.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchedContent {
    pub url: String,
    pub success: bool,
    pub title: Option<String>,
    pub description: Option<String>,
    pub company_name: Option<String>,
    /// Readable main-content text of the page.
    pub text: Option<String>,
    pub contact: ContactSignals,
    pub social: SocialLinks,
    pub services: Vec<String>,
    pub error: Option<String>,
}

impl FetchedContent {
    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn body_len(&self) -> usize {
        self.text.as_deref().map(str::len).unwrap_or(0)
    }
}

/// Retrieves a URL and extracts structured signals. Implementations must
/// never error out of `fetch`: they report failure on the returned
/// content and honor their configured timeout.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchedContent;
}
