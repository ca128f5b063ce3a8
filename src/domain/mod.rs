pub mod types;
pub mod units;

pub use types::{ChatMessage, MessageRole};
