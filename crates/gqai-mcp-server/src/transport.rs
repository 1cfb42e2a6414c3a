//! Wire bindings for the MCP router
//!
//! Stdio answers one request per line. The HTTP bindings are axum routers: `/rpc` answers
//! in the response body, while `/mcp` and `/sse` push answers onto long-lived event
//! streams drawn from a [`SessionRegistry`].

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderName, StatusCode};
use axum::response::sse::Event;
use axum::response::{IntoResponse, Response};
use gqai_registry::GraphQLConfig;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::mcp::{JsonRpcRequest, JsonRpcResponse, dispatch};
use crate::session::SessionRegistry;

mod rpc;
mod sse;
mod stdio;
mod streamable_http;

pub use stdio::{serve_lines, serve_stdio};

/// Header carrying the session token on the streamable HTTP binding
pub const SESSION_ID_HEADER: HeaderName = HeaderName::from_static("mcp-session-id");

/// State shared by the handlers of a push-stream binding
#[derive(Clone)]
pub struct TransportState {
    pub config: Arc<GraphQLConfig>,
    pub sessions: Arc<SessionRegistry>,
}

impl TransportState {
    pub fn new(config: Arc<GraphQLConfig>, sessions: Arc<SessionRegistry>) -> Self {
        Self { config, sessions }
    }
}

/// `/mcp` and `/rpc`
pub fn streamable_http_router(state: TransportState) -> Router {
    let config = Arc::clone(&state.config);
    with_layers(streamable_http::router(state).merge(rpc::router(config)))
}

/// `/sse`, `/message` and `/rpc`
pub fn sse_router(state: TransportState) -> Router {
    let config = Arc::clone(&state.config);
    with_layers(sse::router(state).merge(rpc::router(config)))
}

fn with_layers(router: Router) -> Router {
    router
        .layer(CorsLayer::permissive().expose_headers([SESSION_ID_HEADER]))
        .layer(TraceLayer::new_for_http())
}

/// Answer a request onto an open session's stream
async fn answer_onto(state: &TransportState, token: &str, request: JsonRpcRequest) -> Response {
    if let Some(response) = dispatch(request, &state.config).await
        && let Err(e) = state.sessions.enqueue(token, response)
    {
        warn!("Session ended before its response was queued: {e}");
        return invalid_session();
    }
    StatusCode::ACCEPTED.into_response()
}

/// Attach the serialized response to `event` as its data
fn response_event(event: Event, response: &JsonRpcResponse) -> Option<Event> {
    match serde_json::to_string(response) {
        Ok(data) => Some(event.data(data)),
        Err(e) => {
            error!("Failed to serialize response: {e}");
            None
        }
    }
}

fn invalid_session() -> Response {
    (StatusCode::NOT_FOUND, "Invalid session").into_response()
}

fn invalid_json() -> Response {
    (StatusCode::BAD_REQUEST, "Invalid JSON").into_response()
}
