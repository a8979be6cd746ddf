//! memlens Core Library
//!
//! Memory inspection helpers layered on a host-owned debug session:
//! - Hex codec for adapter payloads
//! - Raw memory reads through the adapter's custom memory request
//! - Address ranges of the local variables in the selected frame
//! - JSON-RPC protocol for the stdio bridge

pub mod codec;
pub mod config;
pub mod error;
pub mod inspector;
pub mod locals;
pub mod memory;
pub mod protocol;
pub mod session;

pub use config::{ConfigOverrides, InspectorConfig};
pub use error::{InspectError, SessionError};
pub use inspector::Inspector;
pub use locals::VariableRange;
pub use memory::MemoryReadResult;
pub use protocol::{Request, Response};
pub use session::{DebugSession, SessionProvider, StackFrame};
