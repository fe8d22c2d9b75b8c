use std::collections::{HashMap, VecDeque};

use tokio::sync::{mpsc, oneshot};

use crate::error::{BridgeError, BridgeResult};
use crate::ids::SurfaceId;

enum Request {
    Down {
        surface: SurfaceId,
        key: String,
    },
    Up {
        surface: SurfaceId,
        key: String,
    },
    Held {
        surface: SurfaceId,
        key: String,
        reply: oneshot::Sender<bool>,
    },
    Next {
        surface: SurfaceId,
        reply: oneshot::Sender<Option<String>>,
    },
    Clear {
        surface: SurfaceId,
    },
}

/// Per-surface keyboard state: a FIFO of pressed keys plus a lower-cased
/// held map. Downs queue and mark held; ups only unmark.
#[derive(Clone)]
pub struct KeyHub {
    tx: mpsc::UnboundedSender<Request>,
}

impl KeyHub {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(rx));
        Self { tx }
    }

    pub fn record_down(&self, surface: SurfaceId, key: String) {
        let _ = self.tx.send(Request::Down { surface, key });
    }

    pub fn record_up(&self, surface: SurfaceId, key: String) {
        let _ = self.tx.send(Request::Up { surface, key });
    }

    /// Whether `key` is currently held on `surface`, case-insensitively.
    /// Unknown surfaces and keys read as false.
    pub async fn held(&self, surface: SurfaceId, key: &str) -> BridgeResult<bool> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::Held {
                surface,
                key: key.to_string(),
                reply,
            })
            .map_err(|_| BridgeError::Closed)?;
        rx.await.map_err(|_| BridgeError::Closed)
    }

    /// Pops the oldest queued key for `surface`. `None` means the queue is
    /// empty — distinct from a key literally named `""`.
    pub async fn next(&self, surface: SurfaceId) -> BridgeResult<Option<String>> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::Next { surface, reply })
            .map_err(|_| BridgeError::Closed)?;
        rx.await.map_err(|_| BridgeError::Closed)
    }

    /// Discards queued keys for `surface`; held state is untouched.
    pub fn clear_queue(&self, surface: SurfaceId) {
        let _ = self.tx.send(Request::Clear { surface });
    }
}

async fn run(mut rx: mpsc::UnboundedReceiver<Request>) {
    let mut queues: HashMap<SurfaceId, VecDeque<String>> = HashMap::new();
    let mut held: HashMap<SurfaceId, HashMap<String, bool>> = HashMap::new();

    while let Some(request) = rx.recv().await {
        match request {
            Request::Down { surface, key } => {
                held.entry(surface)
                    .or_default()
                    .insert(key.to_lowercase(), true);
                queues.entry(surface).or_default().push_back(key);
            }
            Request::Up { surface, key } => {
                held.entry(surface)
                    .or_default()
                    .insert(key.to_lowercase(), false);
            }
            Request::Held {
                surface,
                key,
                reply,
            } => {
                let state = held
                    .get(&surface)
                    .and_then(|map| map.get(&key.to_lowercase()))
                    .copied()
                    .unwrap_or(false);
                let _ = reply.send(state);
            }
            Request::Next { surface, reply } => {
                let key = queues.get_mut(&surface).and_then(VecDeque::pop_front);
                let _ = reply.send(key);
            }
            Request::Clear { surface } => {
                queues.remove(&surface);
            }
        }
    }
}
