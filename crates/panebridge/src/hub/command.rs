use std::collections::VecDeque;

use tokio::sync::{mpsc, oneshot};

use crate::error::{BridgeError, BridgeResult};

enum Request {
    Push(String),
    Next {
        reply: oneshot::Sender<Option<String>>,
    },
}

/// One global FIFO of menu command strings; commands are not scoped to a
/// surface.
#[derive(Clone)]
pub struct CommandHub {
    tx: mpsc::UnboundedSender<Request>,
}

impl CommandHub {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(rx));
        Self { tx }
    }

    pub fn push(&self, command: String) {
        let _ = self.tx.send(Request::Push(command));
    }

    pub async fn next(&self) -> BridgeResult<Option<String>> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::Next { reply })
            .map_err(|_| BridgeError::Closed)?;
        rx.await.map_err(|_| BridgeError::Closed)
    }
}

async fn run(mut rx: mpsc::UnboundedReceiver<Request>) {
    let mut queue: VecDeque<String> = VecDeque::new();

    while let Some(request) = rx.recv().await {
        match request {
            Request::Push(command) => queue.push_back(command),
            Request::Next { reply } => {
                let _ = reply.send(queue.pop_front());
            }
        }
    }
}
