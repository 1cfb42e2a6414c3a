//! The two-endpoint SSE binding
//!
//! `GET /sse` opens a session and announces where to post messages for it. Requests sent
//! to `POST /message?sessionId=<token>` are answered as `message` events on that stream.

use std::convert::Infallible;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use futures::{StreamExt as _, future, stream};
use serde::Deserialize;
use tracing::{debug, info};

use super::{TransportState, answer_onto, invalid_json, invalid_session, response_event};
use crate::mcp::JsonRpcRequest;

#[derive(Debug, Deserialize)]
struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

pub(super) fn router(state: TransportState) -> Router {
    Router::new()
        .route("/sse", get(subscribe))
        .route("/message", post(send))
        .with_state(state)
}

async fn subscribe(State(state): State<TransportState>) -> impl IntoResponse {
    let session = state.sessions.open();
    info!(session = %session.token(), "SSE client connected");

    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("/message?sessionId={}", session.token()));
    let events = stream::once(future::ready(endpoint))
        .chain(session.into_stream().filter_map(|response| {
            future::ready(response_event(Event::default().event("message"), &response))
        }))
        .map(Ok::<_, Infallible>);

    Sse::new(events).keep_alive(KeepAlive::default())
}

async fn send(
    State(state): State<TransportState>,
    Query(query): Query<MessageQuery>,
    body: Bytes,
) -> Response {
    let Some(token) = query.session_id.filter(|token| !token.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Missing sessionId parameter").into_response();
    };
    if !state.sessions.contains(&token) {
        return invalid_session();
    }

    let request = match serde_json::from_slice::<JsonRpcRequest>(&body) {
        Ok(request) => request,
        Err(e) => {
            debug!(session = %token, "Rejecting undecodable message: {e}");
            return invalid_json();
        }
    };

    answer_onto(&state, &token, request).await
}
