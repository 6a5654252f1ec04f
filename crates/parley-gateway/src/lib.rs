// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Parley chatbot service.
//!
//! Exposes conversation CRUD and the ask pipeline as a REST API built on
//! axum, with optional bearer-token auth and a fire-and-forget event
//! webhook.

pub mod auth;
pub mod handlers;
pub mod server;
pub mod webhook;

pub use server::{GatewayState, ServerConfig, build_router, start_server};
