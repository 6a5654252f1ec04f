// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for the Parley chatbot service.
//!
//! Implements [`ChannelAdapter`] for the Telegram Bot API via teloxide,
//! providing long polling and plain-text question/answer delivery. Each
//! Telegram chat id is the conversation id for that chat's history.

pub mod handler;

use std::sync::Arc;

use async_trait::async_trait;
use parley_config::model::TelegramConfig;
use parley_core::error::ParleyError;
use parley_core::traits::{ChannelAdapter, PluginAdapter};
use parley_core::types::{AdapterType, HealthStatus, InboundMessage, OutboundMessage};
use teloxide::prelude::*;
use teloxide::types::{ChatId, Recipient};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Greeting sent in reply to the /start command.
const START_GREETING: &str = "Hi! I am your QA bot. Ask me anything.";

/// Telegram channel adapter implementing [`ChannelAdapter`].
///
/// Connects to Telegram via long polling, filters messages by chat type
/// and the optional allowlist, and delivers answers as plain text.
pub struct TelegramChannel {
    bot: Bot,
    config: TelegramConfig,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundMessage>>,
    inbound_tx: mpsc::Sender<InboundMessage>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TelegramChannel {
    /// Creates a new Telegram channel adapter.
    ///
    /// Requires `config.bot_token` to be set.
    pub fn new(config: TelegramConfig) -> Result<Self, ParleyError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            ParleyError::Config("telegram.bot_token is required for Telegram adapter".into())
        })?;

        if token.is_empty() {
            return Err(ParleyError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let bot = Bot::new(token);
        let (inbound_tx, inbound_rx) = mpsc::channel(100);

        Ok(Self {
            bot,
            config,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: None,
        })
    }
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        // Check if the bot token is valid by calling getMe.
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), ParleyError> {
        debug!("Telegram channel shutting down");
        // The polling handle is dropped with TelegramChannel, which aborts
        // the task. For graceful shutdown, the ask loop should stop calling
        // receive() first.
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
    async fn connect(&mut self) -> Result<(), ParleyError> {
        if self.polling_handle.is_some() {
            return Ok(()); // Already connected
        }

        let bot = self.bot.clone();
        let tx = self.inbound_tx.clone();
        let allowed_users: Arc<Vec<String>> = Arc::new(self.config.allowed_users.clone());

        info!("starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let tg_handler = Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
                let tx = tx.clone();
                let allowed = allowed_users.clone();
                async move {
                    // Filter: DMs only
                    if !handler::is_dm(&msg) {
                        debug!(chat_id = msg.chat.id.0, "ignoring non-DM message");
                        return respond(());
                    }

                    // Filter: authorized users only (empty list allows all)
                    if !handler::is_authorized(&msg, &allowed) {
                        debug!(chat_id = msg.chat.id.0, "ignoring unauthorized user");
                        return respond(());
                    }

                    let Some(text) = msg.text() else {
                        debug!(msg_id = msg.id.0, "ignoring non-text message");
                        return respond(());
                    };

                    // /start gets a canned greeting, not an LLM round-trip.
                    if handler::is_start_command(text) {
                        if let Err(e) = bot.send_message(msg.chat.id, START_GREETING).await {
                            warn!(error = %e, "failed to send start greeting");
                        }
                        return respond(());
                    }

                    let inbound = handler::to_inbound_message(&msg, text);
                    if tx.send(inbound).await.is_err() {
                        warn!("inbound channel closed, dropping message");
                    }

                    respond(())
                }
            });

            Dispatcher::builder(bot, tg_handler)
                .default_handler(|_| async {}) // Silently ignore non-message updates
                .build()
                .dispatch()
                .await;
        });

        self.polling_handle = Some(handle);
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<(), ParleyError> {
        let chat_id = msg
            .conversation_id
            .parse::<i64>()
            .map(ChatId)
            .map_err(|e| ParleyError::Channel {
                message: format!("invalid Telegram chat id `{}`: {e}", msg.conversation_id),
                source: None,
            })?;

        self.bot
            .send_message(Recipient::Id(chat_id), &msg.content)
            .await
            .map_err(|e| ParleyError::Channel {
                message: format!("failed to send message: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(())
    }

    async fn receive(&self) -> Result<InboundMessage, ParleyError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| ParleyError::Channel {
            message: "Telegram inbound channel closed".into(),
            source: None,
        })
    }
}
