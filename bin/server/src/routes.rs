//! HTTP routes: health check, webhook callback, administrative clear.

use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use gemini_relay_conversation::ContextStore;
use gemini_relay_core::UserId;
use gemini_relay_transport::{TelegramUpdate, TransportController};
use std::sync::Arc;

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The delivery-mode controller; receives webhook pushes.
    pub controller: Arc<TransportController>,
    /// The conversation store; receives administrative clears.
    pub store: Arc<ContextStore>,
    /// Bot credential the webhook path must match.
    pub bot_token: String,
    /// Deployment environment label for the health endpoint.
    pub environment: String,
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/webhook/{token}", post(webhook))
        .route("/clear/{user_id}", post(clear))
        .fallback(not_found)
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "online",
        "environment": state.environment,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Receives one pushed update from the transport.
///
/// The path token is the shared secret: a mismatch is answered with
/// 404 so the endpoint is indistinguishable from a missing route. A
/// push while the webhook path is not the active delivery mode is
/// rejected, never processed.
async fn webhook(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(update): Json<TelegramUpdate>,
) -> Response {
    if token != state.bot_token {
        tracing::warn!("webhook called with mismatched token");
        return StatusCode::NOT_FOUND.into_response();
    }

    match state.controller.handle_push(update) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "rejected pushed update");
            StatusCode::CONFLICT.into_response()
        }
    }
}

async fn clear(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<serde_json::Value> {
    let ok = state.store.clear(&UserId::new(user_id));
    Json(serde_json::json!({ "success": ok }))
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "Not Found",
            "route": uri.path(),
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use gemini_relay_ai::{AiResponder, ChatMessage, ProviderError};
    use gemini_relay_conversation::ConversationEngine;
    use gemini_relay_core::ChatId;
    use gemini_relay_transport::{
        ChatTransport, Dispatcher, TransportError, TransportMode,
    };
    use tower::ServiceExt;

    struct StubResponder;

    #[async_trait]
    impl AiResponder for StubResponder {
        async fn generate(
            &self,
            _context: &[ChatMessage],
            prompt: &str,
        ) -> Result<String, ProviderError> {
            Ok(format!("echo: {prompt}"))
        }

        fn model(&self) -> &str {
            "stub"
        }
    }

    struct StubTransport;

    #[async_trait]
    impl ChatTransport for StubTransport {
        async fn send_message(&self, _chat_id: ChatId, _text: &str) -> Result<(), TransportError> {
            Ok(())
        }

        async fn send_typing(&self, _chat_id: ChatId) -> Result<(), TransportError> {
            Ok(())
        }

        async fn get_updates(
            &self,
            _offset: Option<i64>,
            _timeout_secs: u64,
        ) -> Result<Vec<TelegramUpdate>, TransportError> {
            Ok(Vec::new())
        }

        async fn set_webhook(&self, _url: &str) -> Result<(), TransportError> {
            Ok(())
        }

        async fn delete_webhook(&self) -> Result<(), TransportError> {
            Ok(())
        }
    }

    fn app() -> (Router, Arc<ContextStore>) {
        let store = Arc::new(ContextStore::new());
        let transport = Arc::new(StubTransport);
        let engine = ConversationEngine::new(Arc::clone(&store), Arc::new(StubResponder));
        let dispatcher = Arc::new(Dispatcher::new(
            engine,
            Arc::clone(&store),
            transport.clone() as Arc<dyn ChatTransport>,
        ));
        let controller = Arc::new(TransportController::new(
            TransportMode::Webhook {
                url: "https://example.com/webhook/tok".to_string(),
            },
            transport,
            dispatcher,
        ));
        let state = AppState {
            controller,
            store: Arc::clone(&store),
            bot_token: "tok".to_string(),
            environment: "test".to_string(),
        };
        (router(state), store)
    }

    #[tokio::test]
    async fn health_endpoint_is_online() {
        let (app, _store) = app();
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn webhook_with_wrong_token_is_not_found() {
        let (app, _store) = app();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/webhook/wrong")
                    .header("content-type", "application/json")
                    .body(Body::from("{\"update_id\": 1}"))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn webhook_push_while_inactive_conflicts() {
        // The controller was never started, so the webhook path is not
        // active and pushes must be refused.
        let (app, _store) = app();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/webhook/tok")
                    .header("content-type", "application/json")
                    .body(Body::from("{\"update_id\": 1}"))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn clear_endpoint_empties_buffer() {
        let (app, store) = app();
        let user = UserId::new("42");
        store.append(&user, "hello", "hi");

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/clear/42")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(store.get(&user).is_empty());
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let (app, _store) = app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/nope/nothing/here")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
