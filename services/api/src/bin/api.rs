//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        DataApiVectorStore, DbAdapter, OpenAiChatAdapter, OpenAiEmbeddingAdapter,
        OpenAiTitleAdapter,
    },
    chat::ChatService,
    config::Config,
    error::ApiError,
    ingest::IngestService,
    web::{
        auth::{login_handler, signup_handler},
        chat_handler, create_session_handler, delete_history_handler, delete_session_handler,
        jwt::JwtKeys,
        list_history_handler, list_sessions_handler, require_auth,
        rest::ApiDoc,
        session_messages_handler, state::AppState, upload_pdf_handler,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter
        .run_migrations()
        .await
        .map_err(|e| ApiError::Internal(format!("Migration failed: {}", e)))?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let api_key = config
        .openai_api_key
        .clone()
        .ok_or_else(|| ApiError::Internal("OPENAI_API_KEY is required".to_string()))?;
    let openai_client = Client::with_config(OpenAIConfig::new().with_api_key(&api_key));

    let embedding_adapter = Arc::new(OpenAiEmbeddingAdapter::new(
        api_key,
        config.embedding_model.clone(),
    ));
    let chat_adapter = Arc::new(OpenAiChatAdapter::new(
        openai_client.clone(),
        config.chat_model.clone(),
    ));
    let title_adapter = Arc::new(OpenAiTitleAdapter::new(
        openai_client.clone(),
        config.title_model.clone(),
    ));

    let vector_store = Arc::new(DataApiVectorStore::new(
        config.vector_db_endpoint.clone(),
        config.vector_db_token.clone(),
        config.vector_collection.clone(),
    ));
    vector_store.ensure_collection().await?;

    // --- 4. Build the Pipelines and Shared AppState ---
    let ingest_service = Arc::new(IngestService::new(
        db_adapter.clone(),
        embedding_adapter.clone(),
        vector_store.clone(),
    ));
    let chat_service = Arc::new(ChatService::new(
        db_adapter.clone(),
        embedding_adapter,
        vector_store,
        chat_adapter,
        title_adapter,
    ));

    let jwt_keys = Arc::new(JwtKeys::new(&config.jwt_secret));

    let app_state = Arc::new(AppState {
        db: db_adapter,
        jwt: jwt_keys,
        ingest: ingest_service,
        chat: chat_service,
    });

    // --- 5. Create the Web Router ---
    let cors = CorsLayer::new()
        .allow_origin(
            config
                .cors_origin
                .parse::<HeaderValue>()
                .map_err(|e| ApiError::Internal(format!("Invalid CORS origin: {}", e)))?,
        )
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/signup", post(signup_handler))
        .route("/login", post(login_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/upload-pdf", post(upload_pdf_handler))
        .route(
            "/chat-sessions",
            post(create_session_handler).get(list_sessions_handler),
        )
        .route("/chat-sessions/{id}", delete(delete_session_handler))
        .route("/chat-sessions/{id}/messages", get(session_messages_handler))
        .route("/chat", post(chat_handler))
        .route("/chat-history", get(list_history_handler))
        .route("/chat-history/{id}", delete(delete_history_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(25 * 1024 * 1024))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
