// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The ask pipeline for the Parley chatbot service.
//!
//! [`AskEngine`] wires storage, the LLM provider, and both memory layers
//! into the single entry point used by the HTTP gateway and the Telegram
//! channel: take a question, assemble context, call the model, persist the
//! exchange, and update long-term memory.

pub mod prompt;

use std::sync::Arc;

use parley_config::ParleyConfig;
use parley_config::model::MemoryConfig;
use parley_core::ParleyError;
use parley_core::traits::{EmbeddingAdapter, ProviderAdapter};
use parley_core::types::{ChatTurn, EmbeddingInput, ProviderRequest, Role};
use parley_memory::{QaMemoryStore, QaPair, QaRetriever, select_recent_turns, should_remember};
use parley_storage::{Database, queries};
use tracing::{debug, warn};

/// Title given to conversations created lazily, before the first user
/// message promotes its content.
pub const DEFAULT_TITLE: &str = "New Chat";

/// Orchestrates one question/answer exchange end to end.
pub struct AskEngine {
    db: Database,
    provider: Arc<dyn ProviderAdapter>,
    embedder: Arc<dyn EmbeddingAdapter>,
    memory_store: Arc<QaMemoryStore>,
    retriever: QaRetriever,
    model: String,
    system_prompt: String,
    memory: MemoryConfig,
}

impl AskEngine {
    /// Creates a new engine over an opened database and constructed adapters.
    pub fn new(
        db: Database,
        provider: Arc<dyn ProviderAdapter>,
        embedder: Arc<dyn EmbeddingAdapter>,
        config: &ParleyConfig,
    ) -> Self {
        let memory_store = Arc::new(QaMemoryStore::new(db.connection().clone()));
        let retriever = QaRetriever::new(
            memory_store.clone(),
            embedder.clone(),
            config.memory.clone(),
        );

        Self {
            db,
            provider,
            embedder,
            memory_store,
            retriever,
            model: config.openai.model.clone(),
            system_prompt: config.agent.system_prompt.clone(),
            memory: config.memory.clone(),
        }
    }

    /// Returns the database handle shared with the gateway.
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Answer a question within a conversation.
    ///
    /// The conversation is created lazily if it does not exist (channel
    /// ids become conversations on first contact). After the provider
    /// answers, the user and assistant turns are appended to the log and
    /// the exchange is considered for long-term memory.
    pub async fn ask(&self, conversation_id: &str, question: &str) -> Result<String, ParleyError> {
        queries::conversations::ensure_conversation(&self.db, conversation_id, DEFAULT_TITLE)
            .await?;

        let turns = self.assemble_turns(conversation_id, question).await?;

        let response = self
            .provider
            .complete(ProviderRequest {
                model: self.model.clone(),
                messages: turns,
                temperature: 0.0,
                max_tokens: None,
            })
            .await?;
        let answer = response.content;

        queries::messages::append_message(&self.db, conversation_id, Role::User, question).await?;
        queries::messages::append_message(&self.db, conversation_id, Role::Assistant, &answer)
            .await?;

        debug!(
            conversation_id,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            "exchange persisted"
        );

        self.remember(conversation_id, question, &answer).await;

        Ok(answer)
    }

    /// Assemble the model message list: system instruction, retrieved Q&A
    /// context, token-trimmed recent history, and the question.
    async fn assemble_turns(
        &self,
        conversation_id: &str,
        question: &str,
    ) -> Result<Vec<ChatTurn>, ParleyError> {
        let qa_context = if self.memory.enabled {
            // Retrieval failures degrade to an uncontextualized answer.
            match self.retriever.retrieve(question).await {
                Ok(pairs) => pairs,
                Err(e) => {
                    warn!(error = %e, "memory retrieval failed, continuing without context");
                    vec![]
                }
            }
        } else {
            vec![]
        };

        let history = queries::messages::list_messages(&self.db, conversation_id, None).await?;
        let history_turns: Vec<ChatTurn> = history
            .iter()
            .map(|m| ChatTurn::new(m.role.as_str(), m.content.clone()))
            .collect();
        let recent = select_recent_turns(&history_turns, self.memory.max_history_tokens);

        Ok(prompt::build_prompt(
            &self.system_prompt,
            &qa_context,
            &recent,
            question,
        ))
    }

    /// Store the exchange in long-term memory when it passes the heuristic.
    ///
    /// All failures are logged but never propagated -- memory is non-fatal.
    async fn remember(&self, conversation_id: &str, question: &str, answer: &str) {
        if !self.memory.enabled
            || !should_remember(
                question,
                answer,
                self.memory.min_question_words,
                self.memory.min_answer_words,
            )
        {
            return;
        }

        let embedding = match self
            .embedder
            .embed(EmbeddingInput {
                texts: vec![question.to_string()],
            })
            .await
        {
            Ok(output) => match output.embeddings.into_iter().next() {
                Some(e) => e,
                None => {
                    warn!("embedding returned no vector, skipping memory save");
                    return;
                }
            },
            Err(e) => {
                warn!(error = %e, "embedding failed, skipping memory save");
                return;
            }
        };

        let pair = QaPair {
            id: uuid::Uuid::new_v4().to_string(),
            question: question.to_string(),
            answer: answer.to_string(),
            embedding,
            conversation_id: Some(conversation_id.to_string()),
            created_at: parley_storage::now_timestamp(),
        };

        if let Err(e) = self.memory_store.save(&pair).await {
            warn!(error = %e, "failed to save Q&A memory");
        } else {
            debug!(conversation_id, "Q&A exchange stored in memory");
        }
    }
}
