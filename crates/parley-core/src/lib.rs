// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Parley chatbot service.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Parley workspace. All adapter plugins
//! implement traits defined here.

pub mod error;
pub mod tokens;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ParleyError;
pub use types::{AdapterType, HealthStatus, Role};

// Re-export all adapter traits at crate root.
pub use traits::{
    ChannelAdapter, EmbeddingAdapter, PluginAdapter, ProviderAdapter, StorageAdapter,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parley_error_has_all_variants() {
        let _config = ParleyError::Config("test".into());
        let _storage = ParleyError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _constraint = ParleyError::Constraint {
            message: "duplicate key".into(),
        };
        let _not_found = ParleyError::NotFound {
            entity: "conversation",
            id: "c-1".into(),
        };
        let _channel = ParleyError::Channel {
            message: "test".into(),
            source: None,
        };
        let _provider = ParleyError::Provider {
            message: "test".into(),
            source: None,
        };
        let _internal = ParleyError::Internal("test".into());
    }

    #[test]
    fn adapter_type_round_trips() {
        use std::str::FromStr;

        let variants = [
            AdapterType::Channel,
            AdapterType::Provider,
            AdapterType::Storage,
            AdapterType::Embedding,
        ];

        for variant in &variants {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(*variant, parsed);
        }
    }

    #[test]
    fn all_trait_modules_are_exported() {
        // If any adapter trait module is missing or has a compile error,
        // this test won't compile.
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_channel_adapter<T: ChannelAdapter>() {}
        fn _assert_provider_adapter<T: ProviderAdapter>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
        fn _assert_embedding_adapter<T: EmbeddingAdapter>() {}
    }
}
