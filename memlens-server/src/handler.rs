//! Request handler for memlens-server

use std::sync::Arc;

use memlens_core::protocol::SessionState;
use memlens_core::{ConfigOverrides, InspectError, Inspector, InspectorConfig, Request, Response};
use tracing::{debug, info, warn};

use crate::host::{HostChannel, HostSession};

pub struct Handler {
    channel: Arc<HostChannel>,
    inspector: Inspector<Option<HostSession>>,
}

impl Handler {
    pub fn new(channel: Arc<HostChannel>, config: InspectorConfig) -> Self {
        Self {
            channel,
            inspector: Inspector::with_config(None, config),
        }
    }

    pub async fn handle(&mut self, request: &Request) -> Response {
        match request {
            Request::Initialize { config } => self.handle_initialize(config.as_ref()),
            Request::SetSession { session } => self.handle_set_session(session.as_ref()),
            Request::ReadMemory { location, length } => {
                self.handle_read_memory(location, *length).await
            }
            Request::GetLocals => self.handle_get_locals().await,
            Request::Shutdown => {
                info!("Shutdown requested");
                Response::success()
            }
        }
    }

    fn handle_initialize(&mut self, overrides: Option<&ConfigOverrides>) -> Response {
        let Some(overrides) = overrides else {
            info!("Initialized with {:?}", self.inspector.config());
            return Response::success();
        };

        let config = match self.inspector.config().merged(overrides) {
            Ok(config) => config,
            Err(e) => {
                warn!("Rejected configuration: {}", e);
                return Response::error(e.to_string());
            }
        };

        info!("Initialized with {:?}", config);
        self.inspector.set_config(config);
        Response::success()
    }

    fn handle_set_session(&mut self, session: Option<&SessionState>) -> Response {
        match session {
            Some(state) => {
                debug!(
                    "Active session {} (frame {:?})",
                    state.id,
                    state.frame.as_ref().map(|f| f.id)
                );
                *self.inspector.sessions_mut() =
                    Some(HostSession::new(self.channel.clone(), state.clone()));
            }
            None => {
                debug!("No active session");
                *self.inspector.sessions_mut() = None;
            }
        }
        Response::success()
    }

    async fn handle_read_memory(&self, location: &str, length: u64) -> Response {
        debug!("Read memory request: location={}, length={}", location, length);

        match self.inspector.read_memory(location, length).await {
            Ok(result) => Response::memory(&result),
            Err(e) => self.failure("readMemory", e),
        }
    }

    async fn handle_get_locals(&self) -> Response {
        match self.inspector.get_locals().await {
            Ok(ranges) => {
                debug!(
                    "Resolved {} locals in session {}",
                    ranges.len(),
                    self.inspector
                        .sessions()
                        .as_ref()
                        .map(HostSession::id)
                        .unwrap_or_default()
                );
                Response::locals(&ranges)
            }
            Err(e) => self.failure("getLocals", e),
        }
    }

    fn failure(&self, method: &str, error: InspectError) -> Response {
        debug!("{} failed: {}", method, error);
        Response::error(error.to_string())
    }
}
