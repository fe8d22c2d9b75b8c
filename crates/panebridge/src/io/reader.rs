//! The single consumer of the inbound stream.
//!
//! One task reads lines, classifies them, and routes each event to its
//! owning hub or the ack registry. Unparsable lines are discarded and the
//! loop keeps reading; the only events that stop it are end of stream and
//! the front end's forced-failure signal.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::ack::AckRegistry;
use crate::hub::{Hubs, PointerClick, PointerLocation};
use crate::protocol::{wire, InputEvent};

/// Why the reader loop returned. The caller decides what termination means;
/// [`Bridge`](crate::Bridge) exits the process on `ForcedFailure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderStop {
    /// The inbound stream hit end of file or an I/O error.
    StreamClosed,
    /// The front end sent its deliberate-failure signal.
    ForcedFailure,
}

pub async fn run_reader<R>(input: R, hubs: Hubs, acks: Arc<AckRegistry>) -> ReaderStop
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return ReaderStop::StreamClosed,
            Err(err) => {
                tracing::warn!(error = %err, "inbound stream read failed");
                return ReaderStop::StreamClosed;
            }
        };

        let Some(envelope) = wire::parse_line(&line) else {
            if !line.trim().is_empty() {
                tracing::trace!(line = %line, "discarding unparsable inbound line");
            }
            continue;
        };
        let Some(event) = InputEvent::classify(envelope) else {
            continue;
        };

        match event {
            InputEvent::KeyDown { surface, key } => hubs.keys.record_down(surface, key),
            InputEvent::KeyUp { surface, key } => hubs.keys.record_up(surface, key),
            InputEvent::PointerDown {
                surface,
                x,
                y,
                button,
            } => hubs.pointer.record(PointerClick {
                x,
                y,
                surface,
                button,
            }),
            InputEvent::PointerMove { surface, x, y } => {
                hubs.location.update(PointerLocation { x, y, surface })
            }
            InputEvent::Command(command) => hubs.commands.push(command),
            InputEvent::Quit => hubs.quit.signal(),
            InputEvent::Ack(token) => {
                // The registry's pop is atomic, so a flip that already timed
                // out leaves nothing here and the ack dissolves harmlessly.
                if !acks.complete(&token) {
                    tracing::debug!(token = %token, "ack without a pending flip");
                }
            }
            InputEvent::ForcedFailure => return ReaderStop::ForcedFailure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SurfaceId;
    use tokio::io::BufReader;
    use tokio::sync::oneshot;

    fn fixture() -> (Hubs, Arc<AckRegistry>) {
        (Hubs::spawn(), Arc::new(AckRegistry::new()))
    }

    async fn drive(input: &str, hubs: Hubs, acks: Arc<AckRegistry>) -> ReaderStop {
        run_reader(BufReader::new(input.as_bytes()), hubs, acks).await
    }

    #[tokio::test]
    async fn routes_each_kind_to_its_hub() {
        let (hubs, acks) = fixture();
        let input = concat!(
            "\n",
            "{\"type\":\"key\",\"content\":{\"down\":true,\"key\":\"Enter\",\"uid\":1}}\n",
            "not json at all\n",
            "{\"type\":\"mouse\",\"content\":{\"down\":true,\"x\":2,\"y\":3,\"uid\":1}}\n",
            "{\"type\":\"mouse\",\"content\":{\"down\":false,\"x\":9,\"y\":9,\"uid\":1}}\n",
            "{\"type\":\"mouseover\",\"content\":{\"x\":5,\"y\":6,\"uid\":1}}\n",
            "{\"type\":\"cmd\",\"content\":{\"cmd\":\"save\"}}\n",
            "{\"type\":\"quit\"}\n",
            "{\"type\":\"wibble\",\"content\":{}}\n",
        );
        let stop = drive(input, hubs.clone(), acks).await;
        assert_eq!(stop, ReaderStop::StreamClosed);

        assert_eq!(
            hubs.keys.next(SurfaceId(1)).await.unwrap(),
            Some("Enter".into())
        );
        let click = hubs.pointer.next(SurfaceId(1)).await.unwrap().unwrap();
        assert_eq!((click.x, click.y), (2, 3));
        // The pointer-up frame was dropped, not queued.
        assert_eq!(hubs.pointer.next(SurfaceId(1)).await.unwrap(), None);
        assert_eq!(hubs.location.current().await.unwrap().x, 5);
        assert_eq!(hubs.commands.next().await.unwrap(), Some("save".into()));
        assert!(hubs.quit.should_quit().await.unwrap());
    }

    #[tokio::test]
    async fn ack_resolves_the_pending_token() {
        let (hubs, acks) = fixture();
        let (tx, rx) = oneshot::channel();
        acks.register("42".into(), tx);

        let stop = drive(
            "{\"type\":\"ack\",\"content\":{\"ackmessage\":\"42\"}}\n",
            hubs,
            Arc::clone(&acks),
        )
        .await;
        assert_eq!(stop, ReaderStop::StreamClosed);
        rx.await.expect("flip confirmed");
        assert!(!acks.is_pending("42"));
    }

    #[tokio::test]
    async fn unmatched_ack_is_non_fatal() {
        let (hubs, acks) = fixture();
        let input = concat!(
            "{\"type\":\"ack\",\"content\":{\"ackmessage\":\"ghost\"}}\n",
            "{\"type\":\"cmd\",\"content\":{\"cmd\":\"still alive\"}}\n",
        );
        drive(input, hubs.clone(), acks).await;
        assert_eq!(
            hubs.commands.next().await.unwrap(),
            Some("still alive".into())
        );
    }

    #[tokio::test]
    async fn forced_failure_stops_the_loop() {
        let (hubs, acks) = fixture();
        let input = concat!(
            "{\"type\":\"panic\"}\n",
            "{\"type\":\"cmd\",\"content\":{\"cmd\":\"never read\"}}\n",
        );
        let stop = drive(input, hubs.clone(), acks).await;
        assert_eq!(stop, ReaderStop::ForcedFailure);
        assert_eq!(hubs.commands.next().await.unwrap(), None);
    }
}
