//! Debug session backed by the host
//!
//! DAP requests are sent to the host as `dapRequest` reverse calls on the
//! same stdio stream. Replies are routed back by id from the reader task.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use memlens_core::protocol::{HostRequest, Reply, RpcMessage, SessionState};
use memlens_core::{DebugSession, SessionError, StackFrame};
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::oneshot;
use tracing::{debug, warn};

pub type HostWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// A reply, or why the host's answer could not be read as one
type Waiter = oneshot::Sender<Result<Reply, String>>;

/// Write half of the stdio stream plus the reverse calls awaiting a reply
pub struct HostChannel {
    writer: tokio::sync::Mutex<HostWriter>,
    pending: Mutex<HashMap<u64, Waiter>>,
    request_id: AtomicU64,
    closed: AtomicBool,
}

impl HostChannel {
    pub fn new(writer: HostWriter) -> Self {
        Self {
            writer: tokio::sync::Mutex::new(writer),
            pending: Mutex::new(HashMap::new()),
            request_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
        }
    }

    /// Write one message as a single line
    pub async fn send<T: Serialize>(&self, message: &T) -> Result<()> {
        let mut line = serde_json::to_string(message)?;
        debug!("Sending: {}", line);
        line.push('\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }

    /// Forward a DAP request to the host and wait for its reply
    pub async fn call(
        &self,
        session_id: &str,
        command: &str,
        arguments: Value,
    ) -> Result<Value, SessionError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.lock_pending().insert(id, tx);

        // Checked after registering so a concurrent disconnect either sees the entry or we see the flag
        if self.closed.load(Ordering::SeqCst) {
            self.lock_pending().remove(&id);
            return Err(SessionError::Disconnected);
        }

        let message = RpcMessage::new(
            id,
            HostRequest::DapRequest {
                session_id: session_id.to_string(),
                command: command.to_string(),
                arguments,
            },
        );
        if let Err(e) = self.send(&message).await {
            warn!("Failed to send {} request: {}", command, e);
            self.lock_pending().remove(&id);
            return Err(SessionError::Disconnected);
        }

        let reply = rx
            .await
            .map_err(|_| SessionError::Disconnected)?
            .map_err(|reason| SessionError::invalid_body(command, reason))?;

        match (reply.result, reply.error) {
            (_, Some(error)) => Err(SessionError::rejected(command, error.message)),
            (Some(body), None) => Ok(body),
            (None, None) => Ok(Value::Null),
        }
    }

    /// Hand a reply to the call waiting for it
    pub fn resolve(&self, reply: Reply) {
        let waiter = self.lock_pending().remove(&reply.id);
        match waiter {
            Some(tx) => {
                // The waiting call may have been dropped; nothing left to do then
                let _ = tx.send(Ok(reply));
            }
            None => warn!("Reply for unknown request id {}", reply.id),
        }
    }

    /// Fail the call waiting on `id` with an unreadable reply.
    /// Returns false when no call is waiting on that id.
    pub fn fail(&self, id: u64, reason: impl Into<String>) -> bool {
        match self.lock_pending().remove(&id) {
            Some(tx) => {
                let _ = tx.send(Err(reason.into()));
                true
            }
            None => false,
        }
    }

    /// Fail every pending and future call; used once the host stream ends
    pub fn disconnect(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.lock_pending().clear();
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, HashMap<u64, Waiter>> {
        // A panic while holding the lock cannot leave the map half-updated
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// The host's active debug session as seen from the server
pub struct HostSession {
    channel: Arc<HostChannel>,
    state: SessionState,
}

impl HostSession {
    pub fn new(channel: Arc<HostChannel>, state: SessionState) -> Self {
        Self { channel, state }
    }

    pub fn id(&self) -> &str {
        &self.state.id
    }
}

impl DebugSession for HostSession {
    fn current_frame(&self) -> Option<&StackFrame> {
        self.state.frame.as_ref()
    }

    async fn send_request(&self, command: &str, arguments: Value) -> Result<Value, SessionError> {
        self.channel.call(&self.state.id, command, arguments).await
    }
}
