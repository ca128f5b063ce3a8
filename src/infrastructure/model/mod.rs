//! Model infrastructure module
//!
//! # Structure
//! - `types` - Request, Response, Stream, Error types
//! - `traits` - ModelProvider trait
//! - `ollama` - Ollama HTTP client (buffered + JSON Lines streaming)

pub mod ollama;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use ollama::OllamaClient;
pub use traits::ModelProvider;
pub use types::{ModelError, ModelRequest, ModelResponse, ModelStream};
