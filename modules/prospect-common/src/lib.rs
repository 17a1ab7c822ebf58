pub mod config;
pub mod error;
pub mod intent;
pub mod run;
pub mod score;
pub mod types;

pub use config::Config;
pub use error::ProspectError;
pub use intent::*;
pub use run::*;
pub use score::*;
pub use types::*;
