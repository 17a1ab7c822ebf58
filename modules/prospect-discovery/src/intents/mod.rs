pub mod catalog;
pub mod resolver;

pub use catalog::{all_intents, intent, DEFAULT_INTENT_ID};
pub use resolver::apply_intent;
