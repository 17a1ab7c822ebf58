use serde::{Deserialize, Serialize};

/// Default pass threshold for the relevance verdict.
pub const DEFAULT_RELEVANCE_THRESHOLD: u32 = 40;

/// Lowered threshold for low-signal domains (e.g. government tender pages
/// that carry little marketing copy).
pub const LOW_SIGNAL_RELEVANCE_THRESHOLD: u32 = 25;

/// How sure we are the page held real content. Derived from content
/// volume, not from the relevance score itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::Low => write!(f, "low"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::High => write!(f, "high"),
        }
    }
}

/// Per-dimension sub-scores. Each is independently capped; `keyword` may
/// go negative under negative-keyword penalties before the total clamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub keyword: i32,
    pub service: u32,
    pub business_type: u32,
    pub content_quality: u32,
    pub geography: u32,
}

impl ScoreBreakdown {
    /// Sum of all dimensions clamped to [0, 100].
    pub fn total(&self) -> u32 {
        let sum = self.keyword
            + self.service as i32
            + self.business_type as i32
            + self.content_quality as i32
            + self.geography as i32;
        sum.clamp(0, 100) as u32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevanceScore {
    /// 0-100.
    pub score: u32,
    pub relevant: bool,
    /// The threshold the verdict was taken against.
    pub threshold: u32,
    pub breakdown: ScoreBreakdown,
    pub reasons: Vec<String>,
    pub detected_industry: Option<String>,
    pub confidence: Confidence,
}

impl RelevanceScore {
    /// The guaranteed degrade path: unreachable or empty content scores
    /// zero with the fetch error as the sole reason.
    pub fn unreachable(threshold: u32, error: impl Into<String>) -> Self {
        Self {
            score: 0,
            relevant: false,
            threshold,
            breakdown: ScoreBreakdown::default(),
            reasons: vec![error.into()],
            detected_industry: None,
            confidence: Confidence::Low,
        }
    }
}
