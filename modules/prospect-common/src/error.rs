use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProspectError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Invalid run transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
