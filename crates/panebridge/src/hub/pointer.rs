use std::collections::{HashMap, VecDeque};

use tokio::sync::{mpsc, oneshot};

use crate::error::{BridgeError, BridgeResult};
use crate::ids::SurfaceId;

/// One click, queued per originating surface. Button 0 is left, 1 middle,
/// 2 right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerClick {
    pub x: i32,
    pub y: i32,
    pub surface: SurfaceId,
    pub button: u8,
}

enum Request {
    Record(PointerClick),
    Next {
        surface: SurfaceId,
        reply: oneshot::Sender<Option<PointerClick>>,
    },
    Clear {
        surface: SurfaceId,
    },
}

/// Per-surface click queues. The legacy wire protocol signalled "no click"
/// with negative sentinel coordinates; here the empty case is `None`.
#[derive(Clone)]
pub struct PointerHub {
    tx: mpsc::UnboundedSender<Request>,
}

impl PointerHub {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(rx));
        Self { tx }
    }

    pub fn record(&self, click: PointerClick) {
        let _ = self.tx.send(Request::Record(click));
    }

    /// Pops the oldest queued click for `surface`.
    pub async fn next(&self, surface: SurfaceId) -> BridgeResult<Option<PointerClick>> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::Next { surface, reply })
            .map_err(|_| BridgeError::Closed)?;
        rx.await.map_err(|_| BridgeError::Closed)
    }

    pub fn clear_queue(&self, surface: SurfaceId) {
        let _ = self.tx.send(Request::Clear { surface });
    }
}

async fn run(mut rx: mpsc::UnboundedReceiver<Request>) {
    let mut queues: HashMap<SurfaceId, VecDeque<PointerClick>> = HashMap::new();

    while let Some(request) = rx.recv().await {
        match request {
            Request::Record(click) => {
                queues.entry(click.surface).or_default().push_back(click);
            }
            Request::Next { surface, reply } => {
                let click = queues.get_mut(&surface).and_then(VecDeque::pop_front);
                let _ = reply.send(click);
            }
            Request::Clear { surface } => {
                queues.remove(&surface);
            }
        }
    }
}
