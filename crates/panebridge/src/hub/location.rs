use tokio::sync::{mpsc, oneshot};

use crate::error::{BridgeError, BridgeResult};
use crate::ids::SurfaceId;

/// Latest pointer position as reported by `mouseover` frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerLocation {
    pub x: i32,
    pub y: i32,
    pub surface: SurfaceId,
}

enum Request {
    Update(PointerLocation),
    Query {
        reply: oneshot::Sender<PointerLocation>,
    },
}

/// Holds exactly one location, last-write-wins. No queue.
#[derive(Clone)]
pub struct LocationHub {
    tx: mpsc::UnboundedSender<Request>,
}

impl LocationHub {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(rx));
        Self { tx }
    }

    pub fn update(&self, location: PointerLocation) {
        let _ = self.tx.send(Request::Update(location));
    }

    pub async fn current(&self) -> BridgeResult<PointerLocation> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::Query { reply })
            .map_err(|_| BridgeError::Closed)?;
        rx.await.map_err(|_| BridgeError::Closed)
    }
}

async fn run(mut rx: mpsc::UnboundedReceiver<Request>) {
    let mut latest = PointerLocation::default();

    while let Some(request) = rx.recv().await {
        match request {
            Request::Update(location) => latest = location,
            Request::Query { reply } => {
                let _ = reply.send(latest);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn last_write_wins() {
        let hub = LocationHub::spawn();
        assert_eq!(hub.current().await.unwrap(), PointerLocation::default());

        hub.update(PointerLocation {
            x: 3,
            y: 4,
            surface: SurfaceId(1),
        });
        hub.update(PointerLocation {
            x: 9,
            y: 9,
            surface: SurfaceId(2),
        });
        assert_eq!(
            hub.current().await.unwrap(),
            PointerLocation {
                x: 9,
                y: 9,
                surface: SurfaceId(2)
            }
        );
        // Querying does not consume the value.
        assert_eq!(hub.current().await.unwrap().x, 9);
    }
}
