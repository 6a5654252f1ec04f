// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory domain types for the semantic Q&A store.

use serde::{Deserialize, Serialize};

/// A remembered question/answer exchange with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaPair {
    /// Unique identifier for this memory.
    pub id: String,
    /// The question as asked.
    pub question: String,
    /// The answer that was given.
    pub answer: String,
    /// L2-normalized embedding of the question.
    #[serde(skip)]
    pub embedding: Vec<f32>,
    /// Conversation where this exchange happened.
    pub conversation_id: Option<String>,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
}

/// Convert f32 vector to bytes for SQLite BLOB storage.
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert SQLite BLOB back to f32 vector.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes(chunk.try_into().unwrap()))
        .collect()
}

/// L2-normalize a vector in place. Zero vectors are left untouched.
pub fn l2_normalize(vec: &mut [f32]) {
    let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vec.iter_mut() {
            *x /= norm;
        }
    }
}

/// Compute cosine similarity between two vectors.
///
/// For L2-normalized vectors (as stored by the Q&A store), this is
/// equivalent to the dot product.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "vectors must have same length");
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
