//! Line-delimited JSON-RPC loop over a host stream

use std::sync::Arc;

use anyhow::{Context, Result};
use memlens_core::protocol::{parse_incoming, Incoming, RpcMessage};
use memlens_core::{InspectorConfig, Request, Response};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::handler::Handler;
use crate::host::{HostChannel, HostWriter};

/// Serve host calls until `shutdown` or end of input.
///
/// Calls are handled one at a time; a reader task keeps consuming input so
/// replies to reverse requests reach the call that is waiting for them.
pub async fn serve<R>(reader: R, writer: HostWriter, config: InspectorConfig) -> Result<()>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    let channel = Arc::new(HostChannel::new(writer));
    let (calls_tx, mut calls_rx) = mpsc::unbounded_channel::<RpcMessage<Request>>();

    let reader_task = tokio::spawn(read_loop(reader, channel.clone(), calls_tx));

    let mut handler = Handler::new(channel.clone(), config);

    while let Some(msg) = calls_rx.recv().await {
        let response = handler.handle(&msg.content).await;
        channel
            .send(&RpcMessage::new(msg.id.unwrap_or(0), response))
            .await
            .context("Failed to write response")?;

        if matches!(msg.content, Request::Shutdown) {
            break;
        }
    }

    reader_task.abort();
    channel.disconnect();
    Ok(())
}

async fn read_loop<R>(
    reader: R,
    channel: Arc<HostChannel>,
    calls: mpsc::UnboundedSender<RpcMessage<Request>>,
) where
    R: AsyncRead + Send + Unpin + 'static,
{
    let mut lines = BufReader::new(reader).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read line: {}", e);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        debug!("Received: {}", line);

        match parse_incoming(&line) {
            Ok(Incoming::Call(msg)) => {
                if calls.send(msg).is_err() {
                    break;
                }
            }
            Ok(Incoming::Reply(reply)) => channel.resolve(reply),
            Err(e) => match unreadable_reply_id(&line) {
                // Replies are never answered; the waiting call gets the error instead
                Some(id) => {
                    if !channel.fail(id, e.to_string()) {
                        warn!("Unreadable reply for unknown request id {}: {}", id, e);
                    }
                }
                None => {
                    let id = request_id(&line);
                    let response =
                        RpcMessage::new(id, Response::error(format!("Parse error: {}", e)));
                    if let Err(e) = channel.send(&response).await {
                        error!("Failed to write parse error: {}", e);
                        break;
                    }
                }
            },
        }
    }

    info!("Host input closed");
    channel.disconnect();
}

/// Id of a line that is valid JSON without `method`, i.e. a malformed reply
fn unreadable_reply_id(line: &str) -> Option<u64> {
    let value: Value = serde_json::from_str(line).ok()?;
    if value.get("method").is_some() {
        return None;
    }
    value.get("id").and_then(Value::as_u64)
}

/// Best-effort id of a line that failed to parse as a message
fn request_id(line: &str) -> u64 {
    serde_json::from_str::<Value>(line)
        .ok()
        .and_then(|value| value.get("id").and_then(Value::as_u64))
        .unwrap_or(0)
}
