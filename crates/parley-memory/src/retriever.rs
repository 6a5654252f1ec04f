// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic retrieval over the Q&A store.
//!
//! The retriever embeds the query, scores every stored embedding with a dot
//! product (vectors are normalized on save), keeps the top-k, and trims the
//! resulting Q&A pairs to a token budget.

use std::collections::HashMap;
use std::sync::Arc;

use parley_config::model::MemoryConfig;
use parley_core::error::ParleyError;
use parley_core::tokens::count_tokens;
use parley_core::traits::EmbeddingAdapter;
use parley_core::types::EmbeddingInput;

use crate::store::QaMemoryStore;
use crate::types::{QaPair, cosine_similarity, l2_normalize};

/// Retrieves semantically similar past Q&A exchanges for a new question.
pub struct QaRetriever {
    store: Arc<QaMemoryStore>,
    embedder: Arc<dyn EmbeddingAdapter>,
    config: MemoryConfig,
}

impl QaRetriever {
    /// Creates a new retriever.
    pub fn new(
        store: Arc<QaMemoryStore>,
        embedder: Arc<dyn EmbeddingAdapter>,
        config: MemoryConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            config,
        }
    }

    /// Retrieve the top-k most similar past Q&A pairs, token-trimmed.
    ///
    /// Returns an empty list when the store is empty, so no embedding call
    /// is spent on a query that cannot match anything.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<QaPair>, ParleyError> {
        if self.store.is_empty().await? {
            return Ok(vec![]);
        }

        let output = self
            .embedder
            .embed(EmbeddingInput {
                texts: vec![question.to_string()],
            })
            .await?;

        let mut query = output
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| ParleyError::Internal("embedding returned no results".to_string()))?;
        l2_normalize(&mut query);

        let ranked = self.vector_search(&query).await?;
        if ranked.is_empty() {
            return Ok(vec![]);
        }

        // Fetch full pairs and restore similarity order.
        let ids: Vec<String> = ranked.iter().map(|(id, _)| id.clone()).collect();
        let rank_of: HashMap<&str, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        let mut pairs = self.store.get_by_ids(&ids).await?;
        pairs.sort_by_key(|p| rank_of.get(p.id.as_str()).copied().unwrap_or(usize::MAX));

        Ok(select_qa_within_budget(pairs, self.config.max_qa_tokens))
    }

    /// Score the query against all stored embeddings, best first, capped at top-k.
    async fn vector_search(&self, query: &[f32]) -> Result<Vec<(String, f32)>, ParleyError> {
        let embeddings = self.store.all_embeddings().await?;

        let mut results: Vec<(String, f32)> = embeddings
            .into_iter()
            .filter_map(|(id, embedding)| {
                if embedding.len() != query.len() {
                    return None;
                }
                Some((id, cosine_similarity(query, &embedding)))
            })
            .collect();

        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(self.config.top_k);

        Ok(results)
    }
}

/// Trim retrieved Q&A pairs so their combined token cost stays within `max_tokens`.
///
/// Pairs are counted in their `"Q: ...\nA: ...\n"` prompt rendering; the
/// first pair that would exceed the budget stops the walk.
pub fn select_qa_within_budget(pairs: Vec<QaPair>, max_tokens: usize) -> Vec<QaPair> {
    let mut selected = Vec::new();
    let mut total_tokens = 0;

    for pair in pairs {
        let pair_text = format!("Q: {}\nA: {}\n", pair.question, pair.answer);
        let pair_tokens = count_tokens(&pair_text);
        if total_tokens + pair_tokens > max_tokens {
            break;
        }
        total_tokens += pair_tokens;
        selected.push(pair);
    }

    selected
}
