//! Scrolling-text surface: append-only, no buffer kept on this side.

use crate::ids::{SequenceSource, SurfaceId};
use crate::io::writer::FrameSender;
use crate::protocol::{TextOpen, TextUpdate};

/// Construction parameters for a text surface.
#[derive(Debug, Clone)]
pub struct TextOptions {
    pub name: String,
    pub page: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
}

impl TextOptions {
    pub fn new(name: &str, page: &str, width: u32, height: u32) -> Self {
        Self {
            name: name.to_string(),
            page: page.to_string(),
            width,
            height,
            resizable: true,
        }
    }
}

/// Handle to one text surface. Clones share the surface.
#[derive(Clone)]
pub struct TextSurface {
    id: SurfaceId,
    writer: FrameSender,
}

impl TextSurface {
    pub(crate) fn open(
        options: TextOptions,
        writer: FrameSender,
        seq: &SequenceSource,
    ) -> TextSurface {
        let id = seq.next_surface();
        writer.send(
            "new",
            &TextOpen {
                name: options.name,
                page: options.page,
                uid: id,
                width: options.width,
                height: options.height,
                resizable: options.resizable,
            },
        );
        TextSurface { id, writer }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    /// Appends a line to the front end's text view. A trailing newline is
    /// added when missing; empty input sends nothing.
    pub fn append(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        let msg = if text.ends_with('\n') {
            text.to_string()
        } else {
            format!("{text}\n")
        };
        self.writer
            .send("update", &TextUpdate { uid: self.id, msg });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::writer::spawn_writer;
    use serde_json::Value;
    use tokio::io::{AsyncBufReadExt, BufReader};

    #[tokio::test]
    async fn open_then_append_frames() {
        let (front, back) = tokio::io::duplex(4096);
        let writer = spawn_writer(back);
        let seq = SequenceSource::new();

        let surface = TextSurface::open(
            TextOptions::new("Reports", "pages/log.html", 400, 300),
            writer,
            &seq,
        );
        surface.append("hello");
        surface.append("already terminated\n");
        surface.append("");

        let mut lines = BufReader::new(front).lines();
        let new: Value = serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert_eq!(new["command"], "new");
        assert_eq!(new["content"]["uid"], 1);
        assert_eq!(new["content"]["name"], "Reports");

        let first: Value =
            serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert_eq!(first["content"]["msg"], "hello\n");
        let second: Value =
            serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert_eq!(second["content"]["msg"], "already terminated\n");

        // The empty append produced no third frame: dropping the last writer
        // handle ends the stream right after the second update.
        drop(surface);
        assert!(lines.next_line().await.unwrap().is_none());
    }
}
