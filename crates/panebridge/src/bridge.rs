//! The bridge supervisor: spawns the hub, reader, and writer tasks, mints
//! surfaces, and exposes the query and meta-frame API.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, BufReader};

use crate::ack::AckRegistry;
use crate::config::BridgeConfig;
use crate::error::BridgeResult;
use crate::hub::{Hubs, PointerClick, PointerLocation};
use crate::ids::{SequenceSource, SurfaceId};
use crate::io::reader::{run_reader, ReaderStop};
use crate::io::writer::{spawn_writer, FrameSender};
use crate::protocol::{Effect, MenuItem};
use crate::surface::{GridOptions, GridSurface, TextOptions, TextSurface};

pub struct Bridge {
    hubs: Hubs,
    writer: FrameSender,
    acks: Arc<AckRegistry>,
    seq: Arc<SequenceSource>,
    config: BridgeConfig,
}

impl Bridge {
    /// Wires a bridge over an arbitrary stream pair and spawns its tasks.
    /// Must be called within a Tokio runtime.
    ///
    /// When the front end sends its forced-failure signal the process exits
    /// abnormally; when the inbound stream simply closes, the reader stops
    /// and the hubs keep serving whatever they already hold.
    pub fn launch<R, W>(input: R, output: W, config: BridgeConfig) -> Bridge
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let hubs = Hubs::spawn();
        let acks = Arc::new(AckRegistry::new());
        let writer = spawn_writer(output);

        let reader_hubs = hubs.clone();
        let reader_acks = Arc::clone(&acks);
        tokio::spawn(async move {
            match run_reader(BufReader::new(input), reader_hubs, reader_acks).await {
                ReaderStop::StreamClosed => {
                    tracing::warn!("inbound stream closed, front end is gone");
                }
                ReaderStop::ForcedFailure => {
                    tracing::error!("front end requested abnormal termination");
                    std::process::exit(70);
                }
            }
        });

        Bridge {
            hubs,
            writer,
            acks,
            seq: Arc::new(SequenceSource::new()),
            config,
        }
    }

    /// Bridges over the process's own stdin/stdout — the normal arrangement
    /// when the front end spawned this backend. Diagnostics must go to
    /// stderr; stdout belongs to the protocol.
    pub fn stdio(config: BridgeConfig) -> Bridge {
        Self::launch(tokio::io::stdin(), tokio::io::stdout(), config)
    }

    pub fn open_grid(&self, options: GridOptions) -> GridSurface {
        GridSurface::open(
            options,
            self.writer.clone(),
            Arc::clone(&self.acks),
            Arc::clone(&self.seq),
            self.config.clone(),
        )
    }

    pub fn open_text(&self, options: TextOptions) -> TextSurface {
        TextSurface::open(options, self.writer.clone(), &self.seq)
    }

    // --- hub queries ---

    /// Oldest queued key press for `surface`; keys from frames without a uid
    /// queue under [`SurfaceId::UNSCOPED`].
    pub async fn next_key(&self, surface: SurfaceId) -> BridgeResult<Option<String>> {
        self.hubs.keys.next(surface).await
    }

    pub async fn key_held(&self, surface: SurfaceId, key: &str) -> BridgeResult<bool> {
        self.hubs.keys.held(surface, key).await
    }

    pub fn clear_key_queue(&self, surface: SurfaceId) {
        self.hubs.keys.clear_queue(surface);
    }

    pub async fn next_click(&self, surface: SurfaceId) -> BridgeResult<Option<PointerClick>> {
        self.hubs.pointer.next(surface).await
    }

    pub fn clear_click_queue(&self, surface: SurfaceId) {
        self.hubs.pointer.clear_queue(surface);
    }

    pub async fn pointer_location(&self) -> BridgeResult<PointerLocation> {
        self.hubs.location.current().await
    }

    pub async fn next_command(&self) -> BridgeResult<Option<String>> {
        self.hubs.commands.next().await
    }

    pub async fn should_quit(&self) -> BridgeResult<bool> {
        self.hubs.quit.should_quit().await
    }

    // --- meta frames (passed through to the front end, never inspected) ---

    pub fn register_command(&self, label: &str, accelerator: &str) {
        self.writer.send(
            "register",
            &MenuItem {
                label: label.to_string(),
                accelerator: accelerator.to_string(),
            },
        );
    }

    pub fn menu_separator(&self) {
        self.writer.send("separator", &());
    }

    pub fn build_menu(&self) {
        self.writer.send("buildmenu", &());
    }

    pub fn set_about(&self, text: &str) {
        self.writer.send("about", &text);
    }

    /// User-visible alert dialog in the front end.
    pub fn alert(&self, text: &str) {
        self.writer.send("alert", &text);
    }

    /// Diagnostic line for the front end's log view, without bringing that
    /// view forward.
    pub fn silent_log(&self, text: &str) {
        if !text.is_empty() {
            self.writer.send("silentlog", &text);
        }
    }

    /// Tells the front end the backend is ready to be shut down via `quit`.
    pub fn allow_quit(&self) {
        self.writer.send("allowquit", &());
    }

    pub fn bring_to_front(&self, surface: SurfaceId) {
        self.writer.send("front", &surface);
    }

    /// Asks the front end to animate a projectile between two cells.
    pub fn shot_effect(
        &self,
        surface: SurfaceId,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        duration: f64,
        colour: &str,
    ) {
        self.writer.send(
            "effect",
            &Effect {
                function: "make_shot".to_string(),
                uid: surface,
                x1,
                y1,
                x2,
                y2,
                duration,
                colour: colour.to_string(),
                ..Effect::default()
            },
        );
    }

    /// Asks the front end to flash one cell with an RGB tint.
    pub fn flash_effect(&self, surface: SurfaceId, x: i32, y: i32, r: u8, g: u8, b: u8) {
        self.writer.send(
            "effect",
            &Effect {
                function: "make_flash".to_string(),
                uid: surface,
                x,
                y,
                r,
                g,
                b,
                ..Effect::default()
            },
        );
    }
}
