// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly for the ask pipeline.
//!
//! The full message list sent to the model, in order:
//! 1. System instruction
//! 2. Relevant past Q&A (semantic recall) as an extra system turn
//! 3. Recent short-term history (token-trimmed sliding window)
//! 4. The current question as the final user turn

use parley_core::types::ChatTurn;
use parley_memory::QaPair;

/// Header line introducing the retrieved Q&A context block.
const QA_CONTEXT_HEADER: &str = "Here are some relevant previous Q&A you have given:";

/// Build the full message list for the model.
pub fn build_prompt(
    system_prompt: &str,
    qa_context: &[QaPair],
    recent_history: &[ChatTurn],
    question: &str,
) -> Vec<ChatTurn> {
    let mut turns = vec![ChatTurn::new("system", system_prompt)];

    if !qa_context.is_empty() {
        turns.push(ChatTurn::new("system", render_qa_context(qa_context)));
    }

    turns.extend(recent_history.iter().cloned());
    turns.push(ChatTurn::new("user", question));
    turns
}

/// Render retrieved Q&A pairs as a numbered context block.
fn render_qa_context(pairs: &[QaPair]) -> String {
    let mut lines = vec![QA_CONTEXT_HEADER.to_string()];
    for (idx, pair) in pairs.iter().enumerate() {
        let n = idx + 1;
        lines.push(format!("Q{n}: {}", pair.question));
        lines.push(format!("A{n}: {}", pair.answer));
        lines.push(String::new()); // blank line between entries
    }
    lines.join("\n").trim().to_string()
}
