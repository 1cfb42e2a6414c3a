//! Request/response MCP over HTTP

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use gqai_registry::GraphQLConfig;
use tracing::debug;

use crate::mcp::{JsonRpcRequest, JsonRpcResponse, dispatch};

pub(super) fn router(config: Arc<GraphQLConfig>) -> Router {
    Router::new().route("/rpc", post(call)).with_state(config)
}

async fn call(State(config): State<Arc<GraphQLConfig>>, body: Bytes) -> Response {
    let request = match serde_json::from_slice::<JsonRpcRequest>(&body) {
        Ok(request) => request,
        Err(e) => {
            debug!("Rejecting undecodable request: {e}");
            return (
                StatusCode::BAD_REQUEST,
                Json(JsonRpcResponse::parse_error("Invalid JSON")),
            )
                .into_response();
        }
    };

    match dispatch(request, &config).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use mockito::Matcher;
    use serde_json::{Value, json};
    use tower::ServiceExt as _;

    use crate::session::SessionRegistry;
    use crate::transport::fixtures::{body_text, project};
    use crate::transport::{TransportState, streamable_http_router};

    fn app(endpoint: Option<String>) -> (tempfile::TempDir, Router) {
        let (dir, config) = project(endpoint);
        let state = TransportState::new(
            Arc::new(config),
            Arc::new(SessionRegistry::new("http", 10)),
        );
        (dir, streamable_http_router(state))
    }

    async fn rpc(app: Router, body: &str) -> (StatusCode, String) {
        let request = Request::post("/rpc")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        (status, body_text(response.into_body()).await)
    }

    #[tokio::test]
    async fn tools_list_is_answered_in_the_body() {
        let (_dir, app) = app(None);

        let (status, body) = rpc(app, r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#).await;

        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["id"], json!(1));
        assert_eq!(body["result"]["tools"][0]["name"], "GetFilm");
    }

    #[tokio::test]
    async fn tools_call_proxies_to_the_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/graphql")
            .match_body(Matcher::PartialJson(json!({ "variables": { "id": "1" } })))
            .with_status(200)
            .with_body(r#"{"data":{"film":{"title":"A New Hope"}}}"#)
            .create_async()
            .await;
        let (_dir, app) = app(Some(format!("{}/graphql", server.url())));

        let (status, body) = rpc(
            app,
            r#"{"jsonrpc":"2.0","id":"c","method":"tools/call","params":{"name":"GetFilm","arguments":{"id":"1"}}}"#,
        )
        .await;

        mock.assert_async().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            serde_json::from_str::<Value>(&body).unwrap(),
            json!({
                "jsonrpc": "2.0",
                "id": "c",
                "result": {
                    "content": [{
                        "type": "text",
                        "text": r#"{"data":{"film":{"title":"A New Hope"}}}"#
                    }],
                    "isError": false
                }
            })
        );
    }

    #[tokio::test]
    async fn notifications_are_accepted_with_no_body() {
        let (_dir, app) = app(None);

        let (status, body) = rpc(app, r#"{"jsonrpc":"2.0","method":"initialized"}"#).await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body, "");
    }

    #[tokio::test]
    async fn malformed_json_is_a_parse_error() {
        let (_dir, app) = app(None);

        let (status, body) = rpc(app, "{\"jsonrpc\":").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            serde_json::from_str::<Value>(&body).unwrap(),
            json!({
                "jsonrpc": "2.0",
                "id": null,
                "error": { "code": -32700, "message": "Invalid JSON" }
            })
        );
    }
}
