//! Session-oriented MCP over a single HTTP path
//!
//! `GET /mcp` opens a session and streams its responses as server-sent events, the first
//! of which names the session. `POST /mcp` answers a request onto the session named by
//! the `Mcp-Session-Id` header and `DELETE /mcp` ends that session.

use std::convert::Infallible;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use futures::{StreamExt as _, future, stream};
use tracing::{debug, info};

use super::{
    SESSION_ID_HEADER, TransportState, answer_onto, invalid_json, invalid_session,
    response_event,
};
use crate::mcp::JsonRpcRequest;

pub(super) fn router(state: TransportState) -> Router {
    Router::new()
        .route(
            "/mcp",
            get(subscribe)
                .post(send)
                .delete(unsubscribe)
                .fallback(method_not_allowed),
        )
        .with_state(state)
}

async fn subscribe(State(state): State<TransportState>) -> impl IntoResponse {
    let session = state.sessions.open();
    let token = session.token().to_string();
    info!(session = %token, "Streamable HTTP client connected");

    let first = Event::default().event("session").data(&token);
    let events = stream::once(future::ready(first))
        .chain(
            session
                .into_stream()
                .filter_map(|response| future::ready(response_event(Event::default(), &response))),
        )
        .map(Ok::<_, Infallible>);

    (
        [(SESSION_ID_HEADER, token)],
        Sse::new(events).keep_alive(KeepAlive::default()),
    )
}

async fn send(State(state): State<TransportState>, headers: HeaderMap, body: Bytes) -> Response {
    let Some(token) = session_id(&headers) else {
        return missing_session_id();
    };
    if !state.sessions.contains(token) {
        return invalid_session();
    }

    let request = match serde_json::from_slice::<JsonRpcRequest>(&body) {
        Ok(request) => request,
        Err(e) => {
            debug!(session = %token, "Rejecting undecodable request: {e}");
            return invalid_json();
        }
    };

    answer_onto(&state, token, request).await
}

async fn unsubscribe(State(state): State<TransportState>, headers: HeaderMap) -> Response {
    let Some(token) = session_id(&headers) else {
        return missing_session_id();
    };
    state.sessions.close(token);
    info!(session = %token, "Streamable HTTP session ended");
    StatusCode::NO_CONTENT.into_response()
}

async fn method_not_allowed() -> Response {
    (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response()
}

fn session_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SESSION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}

fn missing_session_id() -> Response {
    (StatusCode::BAD_REQUEST, "Missing Mcp-Session-Id header").into_response()
}
