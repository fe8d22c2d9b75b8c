use tokio::sync::{mpsc, oneshot};

use crate::error::{BridgeError, BridgeResult};

enum Request {
    Signal,
    Query { reply: oneshot::Sender<bool> },
}

/// One boolean, set when the front end asks the backend to shut down. Never
/// reset.
#[derive(Clone)]
pub struct QuitHub {
    tx: mpsc::UnboundedSender<Request>,
}

impl QuitHub {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(rx));
        Self { tx }
    }

    pub fn signal(&self) {
        let _ = self.tx.send(Request::Signal);
    }

    pub async fn should_quit(&self) -> BridgeResult<bool> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::Query { reply })
            .map_err(|_| BridgeError::Closed)?;
        rx.await.map_err(|_| BridgeError::Closed)
    }
}

async fn run(mut rx: mpsc::UnboundedReceiver<Request>) {
    let mut quit = false;

    while let Some(request) = rx.recv().await {
        match request {
            Request::Signal => quit = true,
            Request::Query { reply } => {
                let _ = reply.send(quit);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn quit_is_sticky() {
        let hub = QuitHub::spawn();
        assert!(!hub.should_quit().await.unwrap());
        hub.signal();
        assert!(hub.should_quit().await.unwrap());
        hub.signal();
        assert!(hub.should_quit().await.unwrap());
    }
}
