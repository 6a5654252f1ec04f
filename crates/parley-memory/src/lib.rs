// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory system for the Parley chatbot service.
//!
//! Two layers, assembled into the prompt by the ask pipeline:
//!
//! - **Short-term**: a token-bounded sliding window over the recent
//!   conversation history ([`window`]).
//! - **Long-term**: a semantic Q&A store using embeddings + vector
//!   similarity ([`store`], [`retriever`]), gated by a small-talk
//!   heuristic ([`heuristics`]).

pub mod heuristics;
pub mod retriever;
pub mod store;
pub mod types;
pub mod window;

pub use heuristics::should_remember;
pub use retriever::QaRetriever;
pub use store::QaMemoryStore;
pub use types::*;
pub use window::select_recent_turns;
