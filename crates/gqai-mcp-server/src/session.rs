//! Push-stream sessions
//!
//! Both push transports hand out sessions from a [`SessionRegistry`]. A session owns a
//! bounded FIFO queue of responses that one long-lived stream drains onto the wire.
//! Responses that arrive while the queue is full are dropped.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::Stream;
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::mcp::JsonRpcResponse;

pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session {0} not found")]
    NotFound(String),
}

struct SessionHandle {
    sender: mpsc::Sender<JsonRpcResponse>,
    cancellation_token: CancellationToken,
}

/// The set of open sessions for one transport
pub struct SessionRegistry {
    prefix: &'static str,
    capacity: usize,
    counter: AtomicU64,
    sessions: Mutex<HashMap<String, SessionHandle>>,
    cancellation_token: CancellationToken,
}

impl SessionRegistry {
    /// Create a registry whose tokens look like `<prefix>_<n>`
    pub fn new(prefix: &'static str, capacity: usize) -> Self {
        Self {
            prefix,
            capacity: capacity.max(1),
            counter: AtomicU64::new(0),
            sessions: Mutex::new(HashMap::new()),
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Open a new session. It is removed from the registry when dropped.
    pub fn open(self: &Arc<Self>) -> Session {
        let id = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let token = format!("{}_{id}", self.prefix);
        let (sender, receiver) = mpsc::channel(self.capacity);
        let cancellation_token = self.cancellation_token.child_token();

        self.sessions.lock().insert(
            token.clone(),
            SessionHandle {
                sender,
                cancellation_token: cancellation_token.clone(),
            },
        );
        debug!(session = %token, "Session opened");

        Session {
            token,
            receiver,
            cancellation_token,
            registry: Arc::clone(self),
        }
    }

    /// Queue a response for delivery on a session's stream.
    ///
    /// A full queue drops the response rather than waiting for room.
    pub fn enqueue(&self, token: &str, response: JsonRpcResponse) -> Result<(), SessionError> {
        let sessions = self.sessions.lock();
        let handle = sessions
            .get(token)
            .ok_or_else(|| SessionError::NotFound(token.to_string()))?;

        match handle.sender.try_send(response) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                warn!(session = %token, "Response channel full, dropping response");
                Ok(())
            }
            Err(TrySendError::Closed(_)) => Err(SessionError::NotFound(token.to_string())),
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.sessions.lock().contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// End a session. Closing an unknown session does nothing.
    pub fn close(&self, token: &str) {
        if let Some(handle) = self.sessions.lock().remove(token) {
            handle.cancellation_token.cancel();
            debug!(session = %token, "Session closed");
        }
    }

    /// End every session, including any opened afterwards
    pub fn shutdown(&self) {
        self.cancellation_token.cancel();
        self.sessions.lock().clear();
    }
}

/// An open session and the receiving end of its queue
pub struct Session {
    token: String,
    receiver: mpsc::Receiver<JsonRpcResponse>,
    cancellation_token: CancellationToken,
    registry: Arc<SessionRegistry>,
}

impl Session {
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Wait for the next queued response, or `None` once the session is closed
    pub async fn recv(&mut self) -> Option<JsonRpcResponse> {
        tokio::select! {
            biased;
            _ = self.cancellation_token.cancelled() => None,
            response = self.receiver.recv() => response,
        }
    }

    /// Turn the session into a stream of its responses
    pub fn into_stream(self) -> impl Stream<Item = JsonRpcResponse> + Send + 'static {
        futures::stream::unfold(self, |mut session| async move {
            session.recv().await.map(|response| (response, session))
        })
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.registry.close(&self.token);
        self.cancellation_token.cancel();
    }
}
