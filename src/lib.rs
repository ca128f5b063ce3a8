//! perihelion - close-approach chat gateway
//!
//! Mediates between an Ollama-style inference backend and the JPL
//! close-approach data service: the model may request structured data
//! mid-conversation through a single-line `CAD_CALL` directive, which the
//! gateway detects, tunes, fetches, compacts, and feeds back before relaying
//! the model's final answer buffered or as a live stream.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use application::{ChatOutcome, ChatTurn, Orchestrator, OrchestratorError};
pub use config::AppConfig;
pub use domain::types::{ChatMessage, MessageRole};
pub use infrastructure::model::{ModelProvider, OllamaClient};
pub use infrastructure::server;
