// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parley serve` command implementation.
//!
//! Starts the full service: SQLite storage, the OpenAI provider, the ask
//! engine, the optional Telegram channel, and the HTTP gateway.

use std::sync::Arc;

use parley_agent::AskEngine;
use parley_config::ParleyConfig;
use parley_core::error::ParleyError;
use parley_core::traits::{ChannelAdapter, EmbeddingAdapter, ProviderAdapter, StorageAdapter};
use parley_core::types::OutboundMessage;
use parley_gateway::auth::AuthConfig;
use parley_gateway::webhook::WebhookNotifier;
use parley_gateway::{GatewayState, ServerConfig, start_server};
use parley_openai::OpenAiProvider;
use parley_storage::SqliteStorage;
use parley_telegram::TelegramChannel;
use tracing::{error, info};

/// Reply sent to a channel user when the ask pipeline fails.
const CHANNEL_ERROR_REPLY: &str = "Sorry, something went wrong. Please try again.";

/// Runs the `parley serve` command.
///
/// Initializes storage and adapters, spawns the Telegram ask loop when a
/// bot token is configured, and serves the HTTP gateway until shutdown.
pub async fn run_serve(config: ParleyConfig) -> Result<(), ParleyError> {
    init_tracing(&config.agent.log_level);

    info!("starting parley serve");

    // Storage: open, migrate, and share the single connection.
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    let db = storage.db()?.clone();

    // The OpenAI adapter serves as both chat provider and embedder.
    let openai = Arc::new(OpenAiProvider::new(&config)?);
    let provider: Arc<dyn ProviderAdapter> = openai.clone();
    let embedder: Arc<dyn EmbeddingAdapter> = openai;

    let engine = Arc::new(AskEngine::new(db, provider, embedder, &config));

    // Telegram channel (optional).
    if config.telegram.bot_token.is_some() {
        let mut channel = TelegramChannel::new(config.telegram.clone())?;
        channel.connect().await?;
        info!("telegram channel connected");

        let loop_engine = engine.clone();
        tokio::spawn(async move {
            run_channel_loop(channel, loop_engine).await;
        });
    }

    // HTTP gateway (runs until shutdown).
    let state = GatewayState {
        engine,
        auth: AuthConfig {
            bearer_token: config.gateway.bearer_token.clone(),
        },
        webhook: config.webhook.url.clone().map(WebhookNotifier::new),
        start_time: std::time::Instant::now(),
    };
    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };

    start_server(&server_config, state).await
}

/// Receive questions from a channel and answer them through the engine.
///
/// Pipeline errors become an apology reply; the loop ends when the
/// channel closes.
async fn run_channel_loop(channel: TelegramChannel, engine: Arc<AskEngine>) {
    loop {
        let inbound = match channel.receive().await {
            Ok(inbound) => inbound,
            Err(e) => {
                error!(error = %e, "channel receive failed, stopping ask loop");
                break;
            }
        };

        let reply = match engine.ask(&inbound.conversation_id, &inbound.content).await {
            Ok(answer) => answer,
            Err(e) => {
                error!(
                    conversation_id = %inbound.conversation_id,
                    error = %e,
                    "ask pipeline failed"
                );
                CHANNEL_ERROR_REPLY.to_string()
            }
        };

        if let Err(e) = channel
            .send(OutboundMessage {
                conversation_id: inbound.conversation_id,
                content: reply,
            })
            .await
        {
            error!(error = %e, "failed to deliver channel reply");
        }
    }
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` overrides the configured level when set.
fn init_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
