use crate::error::{FulfillmentError, Result};
use crate::webhook::dispatch::{parse_request, Dispatcher};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Check if a port is available by attempting to bind to it
async fn check_port_available(host: &str, port: u16) -> bool {
    tokio::net::TcpListener::bind((host, port)).await.is_ok()
}

/// HTTP front end for the webhook
pub struct WebhookServer {
    dispatcher: Arc<Dispatcher>,
    allowed_origins: Vec<String>,
}

impl WebhookServer {
    pub fn new(dispatcher: Dispatcher, allowed_origins: Vec<String>) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            allowed_origins,
        }
    }

    /// Run the HTTP server
    pub async fn run(&self, host: &str, port: u16) -> Result<()> {
        let app = self.router();

        let addr = format!("{}:{}", host, port);
        log::info!("Starting webhook server on http://{}", addr);

        if !check_port_available(host, port).await {
            return Err(FulfillmentError::Config(format!(
                "Port {} is already in use on {}. Stop the other process or set server.port in config.toml",
                port, host
            )));
        }

        let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
            FulfillmentError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to bind to {}: {}", addr, e),
            ))
        })?;

        axum::serve(listener, app)
            .await
            .map_err(|e| FulfillmentError::Io(std::io::Error::other(format!("HTTP server error: {}", e))))?;

        Ok(())
    }

    /// Build the axum router
    pub fn router(&self) -> Router {
        // Empty allow-list means any origin (local testing against the agent console).
        let cors = if self.allowed_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<axum::http::HeaderValue> = self
                .allowed_origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .route("/", post(handle_webhook))
            .route("/health", get(handle_health))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(cors),
            )
            .with_state(AppState {
                dispatcher: Arc::clone(&self.dispatcher),
            })
    }
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    dispatcher: Arc<Dispatcher>,
}

/// Handle a fulfillment request from the agent platform
async fn handle_webhook(State(state): State<AppState>, body: axum::body::Bytes) -> Response {
    let request = match parse_request(&body) {
        Ok(r) => r,
        Err(e) => return e.into_response(),
    };

    match state.dispatcher.handle(&request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Handle health check endpoint
async fn handle_health() -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
        .into_response()
}

impl FulfillmentError {
    /// HTTP status reported for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            FulfillmentError::MalformedRequest(_) | FulfillmentError::UnsupportedAction(_) => {
                StatusCode::BAD_REQUEST
            }
            FulfillmentError::Graph(_)
            | FulfillmentError::Query(_)
            | FulfillmentError::Decode(_) => StatusCode::BAD_GATEWAY,
            FulfillmentError::QueryTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            FulfillmentError::MissingField { .. }
            | FulfillmentError::Config(_)
            | FulfillmentError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FulfillmentError {
    fn into_response(self) -> Response {
        if self.is_client_error() {
            log::warn!("Rejected webhook request: {}", self);
        } else {
            log::error!("Error processing webhook request: {}", self);
        }

        (
            self.status_code(),
            Json(serde_json::json!({
                "error": self.kind(),
                "message": self.to_string()
            })),
        )
            .into_response()
    }
}
