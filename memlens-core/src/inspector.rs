//! Entry point combining a session provider with its configuration

use crate::config::InspectorConfig;
use crate::error::InspectError;
use crate::locals::{self, VariableRange};
use crate::memory::{self, MemoryReadResult};
use crate::session::SessionProvider;

/// Memory and locals queries against whatever session `P` reports as active
pub struct Inspector<P> {
    sessions: P,
    config: InspectorConfig,
}

impl<P: SessionProvider> Inspector<P> {
    pub fn new(sessions: P) -> Self {
        Self::with_config(sessions, InspectorConfig::default())
    }

    pub fn with_config(sessions: P, config: InspectorConfig) -> Self {
        Self { sessions, config }
    }

    pub async fn read_memory(
        &self,
        location: &str,
        length: u64,
    ) -> Result<MemoryReadResult, InspectError> {
        memory::read_memory(&self.sessions, &self.config.memory_request, location, length).await
    }

    pub async fn get_locals(&self) -> Result<Vec<VariableRange>, InspectError> {
        locals::get_locals(
            &self.sessions,
            &self.config.evaluate_context,
            self.config.variable_page_size,
        )
        .await
    }

    pub fn sessions(&self) -> &P {
        &self.sessions
    }

    pub fn sessions_mut(&mut self) -> &mut P {
        &mut self.sessions
    }

    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: InspectorConfig) {
        self.config = config;
    }
}
