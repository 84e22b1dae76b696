//! COGS Web Server
//!
//! Axum-based REST API for the COGS report agent.
//!
//! The dataset is loaded once at startup and shared read-only by every
//! handler. Each request applies its own filter, so handlers never mutate
//! shared state.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use cogs_core::prompts::{PromptId, PromptLibrary};
use cogs_core::{AgentConfig, Dataset};

mod handlers;

/// Server configuration
#[derive(Clone, Debug, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    pub dataset: Arc<Dataset>,
    pub agent: AgentConfig,
    /// System instruction for the remote generator
    pub system_prompt: String,
    /// Question used when a request omits one
    pub default_question: String,
}

impl AppState {
    /// Build state, resolving the report prompt from the library
    pub fn new(
        dataset: Arc<Dataset>,
        agent: AgentConfig,
        prompts: &mut PromptLibrary,
    ) -> cogs_core::Result<Self> {
        let prompt = prompts.get(PromptId::ReportAgent)?;
        if prompt.is_override {
            info!(
                path = ?prompt.override_path,
                version = prompt.metadata.version,
                "Using report prompt override"
            );
        }
        Ok(Self {
            system_prompt: prompt.system_section().to_string(),
            default_question: prompt.default_question().to_string(),
            dataset,
            agent,
        })
    }
}

/// Create the application router
pub fn create_router(state: AppState, config: ServerConfig) -> Router {
    let state = Arc::new(state);

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/options", get(handlers::get_options))
        // Dashboard
        .route("/kpis", get(handlers::get_kpis))
        .route("/daily", get(handlers::get_daily))
        .route("/sites", get(handlers::get_sites))
        .route("/customers", get(handlers::get_customers))
        .route("/products", get(handlers::get_products))
        .route("/export", get(handlers::export_line_items))
        // Agent
        .route("/context", get(handlers::get_context))
        .route("/agent", post(handlers::ask_agent));

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    };

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    state: AppState,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    info!(
        line_items = state.dataset.line_items.len(),
        days = state.dataset.daily.len(),
        model = %state.agent.model,
        "Dataset ready"
    );

    let app = create_router(state, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }

    /// The remote insight generator failed
    pub fn bad_gateway(msg: &str, err: impl Into<anyhow::Error>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: msg.to_string(),
            internal: Some(err.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

#[cfg(test)]
mod tests;
