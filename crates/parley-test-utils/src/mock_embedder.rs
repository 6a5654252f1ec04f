// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock embedding adapter for deterministic testing.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use parley_core::ParleyError;
use parley_core::traits::{EmbeddingAdapter, PluginAdapter};
use parley_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};

/// An embedding adapter that returns the same unit vector for every text.
///
/// Constant embeddings make every stored memory a perfect match for every
/// query, which is exactly what retrieval tests need. The call count lets
/// tests assert that disabled code paths spend no embedding requests.
pub struct MockEmbedder {
    dimensions: usize,
    calls: Arc<AtomicUsize>,
}

impl MockEmbedder {
    /// Create a mock embedder producing vectors of the given dimension.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of embed calls made so far.
    pub async fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn unit_vector(&self) -> Vec<f32> {
        let mut v = vec![0.0; self.dimensions];
        if let Some(first) = v.first_mut() {
            *first = 1.0;
        }
        v
    }
}

#[async_trait]
impl PluginAdapter for MockEmbedder {
    fn name(&self) -> &str {
        "mock-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ParleyError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for MockEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, ParleyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let embeddings = input.texts.iter().map(|_| self.unit_vector()).collect();
        Ok(EmbeddingOutput {
            embeddings,
            dimensions: self.dimensions,
        })
    }
}
