//! HTTP front door for browser callers.
//!
//! `POST /ai-search` relays a query and answers `{response, provider}` or
//! `{error}`. Quota is enforced by the caller's own client, not here.

mod error;

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderName, Method, header};
use axum::routing::{get, post};
use axum::{Json, Router, extract::State};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::concierge::persist_history;
use crate::history::History;
use crate::relay::{Failure, QueryRequest, Relay};

pub use error::ApiError;

/// Shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub relay: Relay,
    pub history: Option<Arc<dyn History>>,
}

impl AppState {
    pub fn new(relay: Relay) -> Self {
        Self {
            relay,
            history: None,
        }
    }

    pub fn with_history(mut self, history: Arc<dyn History>) -> Self {
        self.history = Some(history);
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchBody {
    pub query: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub response: String,
    pub provider: String,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", post(search_handler))
        .route("/ai-search", post(search_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn search_handler(
    State(state): State<AppState>,
    body: Result<Json<SearchBody>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(body) = body.map_err(|e| {
        debug!(error = %e, "rejected search body");
        ApiError::from(Failure::invalid_input())
    })?;

    let request = QueryRequest {
        text: body.query.unwrap_or_default(),
        caller_id: body.user_id,
    };

    let answer = state.relay.relay(&request).await?;

    if let (Some(history), Some(caller)) = (&state.history, request.caller()) {
        persist_history(history.as_ref(), caller, &request, &answer).await;
    }

    Ok(Json(SearchResponse {
        response: answer.text,
        provider: answer.provider,
    }))
}

async fn health_handler() -> &'static str {
    "ok"
}

/// Bind `addr` and serve until Ctrl+C or SIGTERM.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, provider = state.relay.provider_name().unwrap_or("none"), "concierge listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl+C, shutting down"),
            Err(e) => {
                error!(error = %e, "failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
