//! Raw memory reads through the adapter's custom memory request

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::codec::{hex_to_bytes, hex_to_u64};
use crate::error::InspectError;
use crate::session::{DebugSession, SessionProvider};

/// Bytes read from the target and the address they start at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryReadResult {
    pub bytes: Vec<u8>,
    pub address: u64,
}

#[derive(Debug, Deserialize)]
struct MemoryBody {
    data: String,
    address: String,
}

/// Read `length` bytes at `location`, any expression the adapter resolves to an address.
pub async fn read_memory<P: SessionProvider>(
    sessions: &P,
    command: &str,
    location: &str,
    length: u64,
) -> Result<MemoryReadResult, InspectError> {
    let session = sessions
        .active_session()
        .ok_or(InspectError::NoActiveSession)?;

    debug!("{} request: address={}, length={}", command, location, length);

    let body = session
        .send_request(command, json!({ "address": location, "length": length }))
        .await?;

    let body: MemoryBody =
        serde_json::from_value(body).map_err(|e| InspectError::malformed(command, e))?;
    let bytes = hex_to_bytes(&body.data).map_err(|e| InspectError::malformed(command, e))?;
    let address = hex_to_u64(&body.address).map_err(|e| InspectError::malformed(command, e))?;

    Ok(MemoryReadResult { bytes, address })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MEMORY_REQUEST;
    use crate::error::SessionError;
    use crate::session::fake::FakeSession;

    #[tokio::test]
    async fn test_read_memory() {
        let sessions = Some(FakeSession::new(None).on(DEFAULT_MEMORY_REQUEST, |_| {
            Ok(json!({ "data": "deadbeef", "address": "0x1000" }))
        }));

        let result = read_memory(&sessions, DEFAULT_MEMORY_REQUEST, "0x1000", 4)
            .await
            .unwrap();
        assert_eq!(
            result,
            MemoryReadResult {
                bytes: vec![0xde, 0xad, 0xbe, 0xef],
                address: 0x1000,
            }
        );

        let requests = sessions.as_ref().unwrap().requests();
        assert_eq!(
            requests,
            vec![(
                DEFAULT_MEMORY_REQUEST.to_string(),
                json!({ "address": "0x1000", "length": 4 })
            )]
        );
    }

    #[tokio::test]
    async fn test_read_memory_passes_expression_through() {
        let sessions = Some(FakeSession::new(None).on(DEFAULT_MEMORY_REQUEST, |args| {
            assert_eq!(args["address"], "&buf[2]");
            Ok(json!({ "data": "", "address": "0xffffffffffffff00" }))
        }));

        let result = read_memory(&sessions, DEFAULT_MEMORY_REQUEST, "&buf[2]", 0)
            .await
            .unwrap();
        assert!(result.bytes.is_empty());
        assert_eq!(result.address, 0xffff_ffff_ffff_ff00);
    }

    #[tokio::test]
    async fn test_read_memory_without_session() {
        let sessions: Option<FakeSession> = None;

        let err = read_memory(&sessions, DEFAULT_MEMORY_REQUEST, "0x1000", 4)
            .await
            .unwrap_err();
        assert_eq!(err, InspectError::NoActiveSession);
    }

    #[tokio::test]
    async fn test_read_memory_propagates_rejection() {
        let sessions = Some(FakeSession::new(None).on(DEFAULT_MEMORY_REQUEST, |_| {
            Err(SessionError::rejected(
                DEFAULT_MEMORY_REQUEST,
                "Cannot access memory at address 0x0",
            ))
        }));

        let err = read_memory(&sessions, DEFAULT_MEMORY_REQUEST, "0x0", 4)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "cdt-gdb-adapter/Memory request failed: Cannot access memory at address 0x0"
        );
        assert!(matches!(err, InspectError::Request(SessionError::Rejected { .. })));
    }

    #[tokio::test]
    async fn test_read_memory_malformed_body() {
        let sessions = Some(FakeSession::new(None).on(DEFAULT_MEMORY_REQUEST, |_| {
            Ok(json!({ "data": "abc", "address": "0x1000" }))
        }));

        let err = read_memory(&sessions, DEFAULT_MEMORY_REQUEST, "0x1000", 2)
            .await
            .unwrap_err();
        assert!(matches!(err, InspectError::MalformedResponse { .. }));
    }
}
