//! The single writer of the outbound stream.
//!
//! Every outbound frame funnels through one channel into one task, so two
//! concurrent flips can never interleave partial messages and stream order
//! equals enqueue order.

use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::protocol::wire;

/// Cloneable handle enqueueing frames for the writer task.
#[derive(Clone)]
pub struct FrameSender {
    tx: mpsc::UnboundedSender<Vec<u8>>,
}

impl FrameSender {
    /// Encodes and enqueues one `{"command", "content"}` frame.
    pub fn send<T: Serialize>(&self, command: &str, content: &T) {
        let _ = self.tx.send(wire::encode_frame(command, content));
    }

    /// Enqueues an already-encoded frame.
    pub fn send_raw(&self, frame: Vec<u8>) {
        let _ = self.tx.send(frame);
    }
}

/// Spawns the writer task draining frames into `out`. Must be called within
/// a Tokio runtime.
pub fn spawn_writer<W>(mut out: W) -> FrameSender
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if let Err(err) = out.write_all(&frame).await {
                tracing::warn!(error = %err, "outbound stream write failed, writer stopping");
                break;
            }
            if let Err(err) = out.flush().await {
                tracing::warn!(error = %err, "outbound stream flush failed, writer stopping");
                break;
            }
        }
    });
    FrameSender { tx }
}
