// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic gate deciding which exchanges enter long-term memory.

/// Leading phrases that mark an exchange as small talk.
const SMALL_TALK_PREFIXES: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "good morning",
    "good evening",
    "thanks",
    "thank you",
    "ok",
    "okay",
    "bye",
    "goodbye",
];

/// Decide whether an exchange has long-term informational value.
///
/// Skips greetings/small talk and exchanges too short to be a reusable Q&A.
pub fn should_remember(
    question: &str,
    answer: &str,
    min_question_words: usize,
    min_answer_words: usize,
) -> bool {
    let q_lower = question.trim().to_lowercase();

    if SMALL_TALK_PREFIXES.iter().any(|p| q_lower.starts_with(p)) {
        return false;
    }

    if question.split_whitespace().count() < min_question_words
        || answer.split_whitespace().count() < min_answer_words
    {
        return false;
    }

    true
}
