//! In-memory session for tests

use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::Value;

use super::{DebugSession, StackFrame};
use crate::error::SessionError;

type Handler = Box<dyn Fn(&Value) -> Result<Value, SessionError>>;

/// Answers requests through per-command handlers and records every request
pub(crate) struct FakeSession {
    frame: Option<StackFrame>,
    handlers: HashMap<String, Handler>,
    requests: RefCell<Vec<(String, Value)>>,
}

impl FakeSession {
    pub fn new(frame: Option<StackFrame>) -> Self {
        Self {
            frame,
            handlers: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn on(
        mut self,
        command: &str,
        handler: impl Fn(&Value) -> Result<Value, SessionError> + 'static,
    ) -> Self {
        self.handlers.insert(command.to_string(), Box::new(handler));
        self
    }

    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.borrow().clone()
    }

    pub fn set_frame(&mut self, frame: Option<StackFrame>) {
        self.frame = frame;
    }
}

impl DebugSession for FakeSession {
    fn current_frame(&self) -> Option<&StackFrame> {
        self.frame.as_ref()
    }

    async fn send_request(&self, command: &str, arguments: Value) -> Result<Value, SessionError> {
        self.requests
            .borrow_mut()
            .push((command.to_string(), arguments.clone()));

        match self.handlers.get(command) {
            Some(handler) => handler(&arguments),
            None => Err(SessionError::rejected(command, "unsupported command")),
        }
    }
}
