use std::sync::Arc;

use axum::Router;
use bon::bon;
use gqai_registry::GraphQLConfig;
use tokio::net::TcpListener;
use tracing::info;

use crate::errors::ServerError;
use crate::session::{DEFAULT_QUEUE_CAPACITY, SessionRegistry};
use crate::transport::{TransportState, serve_stdio, sse_router, streamable_http_router};

/// An MCP server exposing a project's GraphQL operations as tools
pub struct Server {
    transport: Transport,
    config: Arc<GraphQLConfig>,
    session_queue: usize,
}

#[derive(Debug, Clone)]
pub enum Transport {
    Stdio,
    SSE { host: String, port: u16 },
    StreamableHttp { host: String, port: u16 },
}

#[bon]
impl Server {
    #[builder]
    pub fn new(
        transport: Transport,
        config: GraphQLConfig,
        #[builder(default = DEFAULT_QUEUE_CAPACITY)] session_queue: usize,
    ) -> Self {
        Self {
            transport,
            config: Arc::new(config),
            session_queue,
        }
    }

    /// Serve until the transport closes or the process is asked to stop
    pub async fn start(self) -> Result<(), ServerError> {
        match self.transport {
            Transport::Stdio => serve_stdio(&self.config).await,
            Transport::StreamableHttp { host, port } => {
                info!(port = ?port, host = %host, "Starting MCP server in Streamable HTTP mode");
                let sessions = Arc::new(SessionRegistry::new("http", self.session_queue));
                let state = TransportState::new(self.config, Arc::clone(&sessions));
                serve(streamable_http_router(state), &host, port, sessions).await
            }
            Transport::SSE { host, port } => {
                info!(port = ?port, host = %host, "Starting MCP server in SSE mode");
                let sessions = Arc::new(SessionRegistry::new("sse", self.session_queue));
                let state = TransportState::new(self.config, Arc::clone(&sessions));
                serve(sse_router(state), &host, port, sessions).await
            }
        }
    }
}

async fn serve(
    router: Router,
    host: &str,
    port: u16,
    sessions: Arc<SessionRegistry>,
) -> Result<(), ServerError> {
    let listener = TcpListener::bind((host, port)).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    // Event streams only end when their sessions do
    let shutdown = async move {
        shutdown_signal().await;
        info!("Shutting down MCP server");
        sessions.shutdown();
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
