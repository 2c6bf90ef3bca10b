//! HTTP routes for the conversation API.

use crate::auth;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::post,
};
use careline_core::{ConversationId, UserId};
use careline_engine::{EngineError, ResponseDispatcher};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared application state.
pub struct AppState {
    /// The conversation engine.
    pub dispatcher: ResponseDispatcher,
    /// The shared API key clients must present.
    pub api_key: String,
}

/// Builds the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/conversation/start", post(start_conversation))
        .route(
            "/api/conversation/{conversation_id}/message",
            post(send_message),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Request body for starting a conversation.
#[derive(Debug, Deserialize)]
pub struct StartConversationRequest {
    /// The user starting the conversation.
    pub user_id: String,
}

#[derive(Serialize)]
struct StartConversationResponse {
    conversation_id: String,
    message: &'static str,
}

/// Request body for sending a message.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    /// The user sending the message.
    pub user_id: String,
    /// The message text.
    pub message: String,
}

#[derive(Serialize)]
struct SendMessageResponse {
    message: String,
    timestamp: DateTime<Utc>,
}

async fn start_conversation(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartConversationRequest>,
) -> Response {
    match state
        .dispatcher
        .start_conversation(&UserId::new(request.user_id))
        .await
    {
        Ok(conversation) => (
            StatusCode::OK,
            Json(StartConversationResponse {
                conversation_id: conversation.id.to_string(),
                message: "Conversation started successfully",
            }),
        )
            .into_response(),
        Err(error) => engine_error_response(error),
    }
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> Response {
    match state
        .dispatcher
        .handle_turn(
            &ConversationId::new(conversation_id),
            &UserId::new(request.user_id),
            &request.message,
        )
        .await
    {
        Ok(reply) => (
            StatusCode::OK,
            Json(SendMessageResponse {
                message: reply.message,
                timestamp: reply.timestamp,
            }),
        )
            .into_response(),
        Err(error) => engine_error_response(error),
    }
}

/// Maps engine errors onto HTTP responses: validation faults are client
/// errors, storage faults are server errors with the detail kept out of the
/// response body.
fn engine_error_response(error: EngineError) -> Response {
    match error {
        EngineError::Validation { .. } => {
            (StatusCode::BAD_REQUEST, error.to_string()).into_response()
        }
        EngineError::Storage { source } => {
            tracing::error!(error = %source, "Storage fault while handling request");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An error occurred while processing your message".to_string(),
            )
                .into_response()
        }
    }
}
