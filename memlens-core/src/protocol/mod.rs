//! JSON-RPC Protocol definitions
//!
//! Defines the line-delimited protocol between the IDE host and memlens-server.
//! The host calls in with [`Request`]s; while serving a call the server may
//! call back out with [`HostRequest`]s that the host answers with a [`Reply`].
//! Addresses are always carried as `0x` hex strings.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::{bytes_to_hex, format_address};
use crate::config::ConfigOverrides;
use crate::locals::VariableRange;
use crate::memory::MemoryReadResult;
use crate::session::StackFrame;

/// Session the host currently has selected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub id: String,
    #[serde(default)]
    pub frame: Option<StackFrame>,
}

/// Request from the host to memlens-server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum Request {
    /// Apply configuration overrides on top of the current config
    #[serde(rename = "initialize")]
    Initialize {
        #[serde(default)]
        config: Option<ConfigOverrides>,
    },

    /// Report the active session and selected frame (`null` when none)
    #[serde(rename = "setSession")]
    SetSession {
        #[serde(default)]
        session: Option<SessionState>,
    },

    /// Read raw memory at an address expression
    #[serde(rename = "readMemory")]
    ReadMemory { location: String, length: u64 },

    /// Address ranges of the locals in the selected frame
    #[serde(rename = "getLocals")]
    GetLocals,

    /// Shutdown the server
    #[serde(rename = "shutdown")]
    Shutdown,
}

/// Wire form of a [`VariableRange`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalRange {
    pub name: String,
    pub address: String,
    pub past_the_end_address: String,
}

impl From<&VariableRange> for LocalRange {
    fn from(range: &VariableRange) -> Self {
        Self {
            name: range.name.clone(),
            address: format_address(range.address),
            past_the_end_address: format_address(range.past_the_end_address),
        }
    }
}

/// Response from memlens-server to the host
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Memory { data: String, address: String },
    Locals { locals: Vec<LocalRange> },
    Success { ok: bool },
    Error { error: String },
}

impl Response {
    pub fn success() -> Self {
        Response::Success { ok: true }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Response::Error { error: msg.into() }
    }

    pub fn memory(result: &MemoryReadResult) -> Self {
        Response::Memory {
            data: bytes_to_hex(&result.bytes),
            address: format_address(result.address),
        }
    }

    pub fn locals(ranges: &[VariableRange]) -> Self {
        Response::Locals {
            locals: ranges.iter().map(LocalRange::from).collect(),
        }
    }
}

/// Reverse request from memlens-server to the host
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum HostRequest {
    /// Forward a DAP request to the host's debug session
    #[serde(rename = "dapRequest", rename_all = "camelCase")]
    DapRequest {
        session_id: String,
        command: String,
        arguments: Value,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyError {
    pub message: String,
}

/// Host answer to a [`HostRequest`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    pub id: u64,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<ReplyError>,
}

/// JSON-RPC message wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcMessage<T> {
    pub jsonrpc: String,
    pub id: Option<u64>,
    #[serde(flatten)]
    pub content: T,
}

impl<T> RpcMessage<T> {
    pub fn new(id: u64, content: T) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(id),
            content,
        }
    }
}

/// A line received from the host
#[derive(Debug)]
pub enum Incoming {
    Call(RpcMessage<Request>),
    Reply(Reply),
}

/// Classify a host line: messages carrying `method` are calls, the rest replies
pub fn parse_incoming(line: &str) -> Result<Incoming, serde_json::Error> {
    let value: Value = serde_json::from_str(line)?;
    if value.get("method").is_some() {
        Ok(Incoming::Call(serde_json::from_value(value)?))
    } else {
        Ok(Incoming::Reply(serde_json::from_value(value)?))
    }
}
