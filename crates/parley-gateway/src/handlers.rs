// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

use parley_agent::DEFAULT_TITLE;
use parley_core::ParleyError;
use parley_core::types::{Conversation, Message};
use parley_storage::queries::{conversations, messages};
use parley_storage::new_conversation;

use crate::server::GatewayState;
use crate::webhook::AskEvent;

/// Request body for POST /ask.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub conversation_id: String,
    #[serde(default)]
    pub question: String,
}

/// Response body for POST /ask.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
}

/// Response body for POST /conversations.
#[derive(Debug, Serialize)]
pub struct CreateConversationResponse {
    pub conversation_id: String,
}

/// Response body for DELETE /conversations/{id}.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub status: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Map a pipeline error onto an HTTP response.
fn error_response(err: ParleyError) -> Response {
    let status = match &err {
        ParleyError::NotFound { .. } => StatusCode::NOT_FOUND,
        ParleyError::Constraint { .. } => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(error = %err, "request failed");
    }
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

/// POST /ask
///
/// Answers a question within a conversation, creating the conversation
/// lazily when needed, and fires the event webhook on success.
pub async fn post_ask(State(state): State<GatewayState>, Json(body): Json<AskRequest>) -> Response {
    if body.conversation_id.is_empty() || body.question.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "conversation_id and question required".to_string(),
            }),
        )
            .into_response();
    }

    match state.engine.ask(&body.conversation_id, &body.question).await {
        Ok(answer) => {
            if let Some(ref notifier) = state.webhook {
                notifier.notify(AskEvent {
                    conversation_id: body.conversation_id.clone(),
                    question: body.question.clone(),
                    answer: answer.clone(),
                });
            }
            (StatusCode::OK, Json(AskResponse { answer })).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// GET /conversations
///
/// Lists conversations that contain at least one message, most recently
/// updated first.
pub async fn get_conversations(State(state): State<GatewayState>) -> Response {
    match conversations::list_conversations(state.engine.db()).await {
        Ok(list) => (StatusCode::OK, Json::<Vec<Conversation>>(list)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /conversations
///
/// Starts a new conversation with a fresh UUID and the default title.
pub async fn post_conversations(State(state): State<GatewayState>) -> Response {
    let conversation_id = uuid::Uuid::new_v4().to_string();
    let conversation = new_conversation(conversation_id.clone(), DEFAULT_TITLE);

    match conversations::create_conversation(state.engine.db(), &conversation).await {
        Ok(()) => (
            StatusCode::OK,
            Json(CreateConversationResponse { conversation_id }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /conversations/{id}/messages
///
/// Returns the conversation's messages, oldest first. 404 when the
/// conversation does not exist.
pub async fn get_conversation_messages(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Response {
    let db = state.engine.db();
    match conversations::get_conversation(db, &id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return error_response(ParleyError::NotFound {
                entity: "conversation",
                id,
            });
        }
        Err(e) => return error_response(e),
    }

    match messages::list_messages(db, &id, None).await {
        Ok(list) => (StatusCode::OK, Json::<Vec<Message>>(list)).into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /conversations/{id}
///
/// Deletes a conversation and, by cascade, all its messages.
pub async fn delete_conversation(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Response {
    match conversations::delete_conversation(state.engine.db(), &id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(DeleteResponse {
                status: "success".to_string(),
            }),
        )
            .into_response(),
        Ok(false) => error_response(ParleyError::NotFound {
            entity: "conversation",
            id,
        }),
        Err(e) => error_response(e),
    }
}

/// GET /health
///
/// Unauthenticated liveness endpoint.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}
