//! Application layer: directive grammar, tuning heuristics, compaction, and
//! the orchestration state machine that ties them to the infrastructure.

pub mod compact;
pub mod directive;
pub mod orchestrator;
pub mod tuner;

#[cfg(test)]
mod tests;

pub use compact::{CompactItem, CompactResult};
pub use directive::{Directive, extract_directive};
pub use orchestrator::{ChatOutcome, ChatTurn, Orchestrator, OrchestratorError};
pub use tuner::{MAX_ITEMS, apply_user_hints};
