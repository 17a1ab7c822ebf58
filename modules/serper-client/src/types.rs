use serde::{Deserialize, Serialize};

/// One organic search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub snippet: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SerperResponse {
    #[serde(default)]
    pub organic: Vec<SerperOrganic>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SerperOrganic {
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
}

impl From<SerperOrganic> for SearchHit {
    fn from(r: SerperOrganic) -> Self {
        SearchHit {
            url: r.link,
            title: r.title,
            snippet: r.snippet,
        }
    }
}
