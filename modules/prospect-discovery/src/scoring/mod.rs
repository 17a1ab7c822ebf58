pub mod industry;
pub mod relevance;

pub use industry::detect_industry;
pub use relevance::{analyze, AnalysisConfig};
