use gemini_relay_ai::{GeminiBackend, GeminiConfig};
use gemini_relay_conversation::{ContextStore, ConversationEngine};
use gemini_relay_server::config::ServerConfig;
use gemini_relay_server::routes::{self, AppState};
use gemini_relay_transport::{ChatTransport, Dispatcher, TelegramApi, TransportController};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    let mode = config
        .transport_mode()
        .expect("invalid transport configuration");
    tracing::info!(environment = %config.environment, "Loaded configuration");

    // Collaborators
    let transport: Arc<dyn ChatTransport> =
        Arc::new(TelegramApi::new(config.telegram_bot_token.clone()));
    let mut gemini_config = GeminiConfig::new(config.gemini_api_key.clone(), config.gemini_model.clone());
    gemini_config.max_output_tokens = config.max_output_tokens;
    let responder = Arc::new(GeminiBackend::new(gemini_config));
    tracing::info!(model = %config.gemini_model, "Using Gemini model");

    // Core
    let store = Arc::new(ContextStore::new());
    let engine = ConversationEngine::new(Arc::clone(&store), responder);
    let dispatcher = Arc::new(Dispatcher::new(
        engine,
        Arc::clone(&store),
        Arc::clone(&transport),
    ));
    let controller = Arc::new(TransportController::new(
        mode,
        Arc::clone(&transport),
        dispatcher,
    ));

    // Activate the configured delivery path. Webhook registration
    // failure terminates startup; there is no fallback to polling.
    controller
        .start()
        .await
        .expect("failed to activate transport delivery");

    let state = AppState {
        controller: Arc::clone(&controller),
        store,
        bot_token: config.telegram_bot_token.clone(),
        environment: config.environment.clone(),
    };
    let app = routes::router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .expect("failed to bind to address");
    tracing::info!(port = config.port, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    // Stop accepting new updates; in-flight dispatches finish on the
    // runtime as the process winds down.
    controller.shutdown().await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        _ = terminate => {},
    }
}
