// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token-bounded sliding window over conversation history.

use parley_core::tokens::count_turn_tokens;
use parley_core::types::ChatTurn;

/// Take the most recent turns, trimming from the oldest first, until the
/// token budget is reached.
///
/// Walks history newest-to-oldest accumulating token cost; the first turn
/// that would exceed `max_tokens` stops the walk. The selection is returned
/// in chronological order.
pub fn select_recent_turns(history: &[ChatTurn], max_tokens: usize) -> Vec<ChatTurn> {
    let mut selected: Vec<ChatTurn> = Vec::new();
    let mut total_tokens = 0;

    for turn in history.iter().rev() {
        let turn_tokens = count_turn_tokens(turn);
        if total_tokens + turn_tokens > max_tokens {
            break;
        }
        selected.push(turn.clone());
        total_tokens += turn_tokens;
    }

    selected.reverse();
    selected
}
