// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model-aware token counting backed by tiktoken.
//!
//! Counts use the o200k_base encoding shared by current OpenAI chat and
//! embedding models. The BPE table is built once per process.

use std::sync::OnceLock;

use tiktoken_rs::CoreBPE;

use crate::types::ChatTurn;

fn bpe() -> &'static CoreBPE {
    static BPE: OnceLock<CoreBPE> = OnceLock::new();
    BPE.get_or_init(|| {
        tiktoken_rs::o200k_base().expect("o200k_base encoding tables are compiled in")
    })
}

/// Count tokens for a single text segment.
pub fn count_tokens(text: &str) -> usize {
    bpe().encode_with_special_tokens(text).len()
}

/// Approximate token cost of one chat turn.
///
/// Counts `"{role}: {content}\n"` for a rough, model-aware estimate that
/// includes the role framing overhead.
pub fn count_turn_tokens(turn: &ChatTurn) -> usize {
    count_tokens(&format!("{}: {}\n", turn.role, turn.content))
}

/// Approximate token cost of a list of chat turns.
pub fn count_turns_tokens(turns: &[ChatTurn]) -> usize {
    turns.iter().map(count_turn_tokens).sum()
}
