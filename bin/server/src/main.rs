use careline_ai::CompletionClient;
use careline_engine::ResponseDispatcher;
use careline_server::{
    config::ServerConfig,
    db::{ConversationRepository, MessageRepository},
    routes::{self, AppState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
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
    tracing::info!("Loaded configuration");

    // Create database connection pool
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("failed to run migrations");

    // A misconfigured completion provider degrades the service to static
    // replies; it never aborts startup.
    let completion_client = CompletionClient::from_config(&config.completion);

    let dispatcher = ResponseDispatcher::new(
        Arc::new(ConversationRepository::new(db_pool.clone())),
        Arc::new(MessageRepository::new(db_pool)),
        completion_client,
    );

    let app_state = Arc::new(AppState {
        dispatcher,
        api_key: config.security.api_key.clone(),
    });

    let app = routes::router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("failed to bind listener");
    tracing::info!(addr = %config.listen_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install ctrl-c handler");
    tracing::info!("Shutting down");
}
