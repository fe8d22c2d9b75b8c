//! The mutable cell grid and its flip protocol.
//!
//! All per-surface state lives under one mutex, so concurrent flips and
//! mutations on the same surface serialize while different surfaces stay
//! fully independent. A flip serializes the buffer, fingerprints it, and
//! then either transmits, suppresses an unchanged frame, or drops it under
//! rate limiting with a deferred catch-up so the final state is still shown.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::ack::AckRegistry;
use crate::config::{BridgeConfig, SyncPolicy};
use crate::error::{BridgeError, BridgeResult};
use crate::ids::{SequenceSource, SurfaceId};
use crate::io::writer::FrameSender;
use crate::protocol::{wire, GridOpen, GridUpdate, Point};
use crate::surface::FlipOutcome;

/// One cell of a grid surface: a glyph plus single-char foreground and
/// background colour codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub glyph: char,
    pub colour: char,
    pub background: char,
}

impl Cell {
    /// What every cell holds after `clear`, and what out-of-range reads
    /// return.
    pub const BLANK: Cell = Cell {
        glyph: ' ',
        colour: ' ',
        background: ' ',
    };
}

/// Construction parameters for a grid surface. Everything past the
/// dimensions is display configuration passed through to the front end
/// unmodified.
#[derive(Debug, Clone)]
pub struct GridOptions {
    pub name: String,
    pub page: String,
    pub width: u32,
    pub height: u32,
    pub boxwidth: u32,
    pub boxheight: u32,
    pub fontpercent: u32,
    pub starthidden: bool,
    pub resizable: bool,
}

impl GridOptions {
    pub fn new(name: &str, page: &str, width: u32, height: u32) -> Self {
        Self {
            name: name.to_string(),
            page: page.to_string(),
            width,
            height,
            boxwidth: 10,
            boxheight: 20,
            fontpercent: 100,
            starthidden: false,
            resizable: false,
        }
    }
}

#[derive(Debug)]
struct GridState {
    glyphs: Vec<char>,
    colours: Vec<char>,
    backgrounds: Vec<char>,
    highlight: Point,
    last_fingerprint: Option<[u8; 32]>,
    last_send: Option<Instant>,
    dropped: u64,
    flip_seq: u64,
}

struct GridInner {
    id: SurfaceId,
    width: u32,
    height: u32,
    state: Mutex<GridState>,
    pending_catchups: AtomicUsize,
    writer: FrameSender,
    acks: Arc<AckRegistry>,
    seq: Arc<SequenceSource>,
    config: BridgeConfig,
}

/// Handle to one grid surface. Clones share the surface.
#[derive(Clone)]
pub struct GridSurface {
    inner: Arc<GridInner>,
}

enum Transmit {
    Suppressed,
    Throttled,
    Sent(Option<(String, oneshot::Receiver<()>)>),
}

impl GridSurface {
    pub(crate) fn open(
        options: GridOptions,
        writer: FrameSender,
        acks: Arc<AckRegistry>,
        seq: Arc<SequenceSource>,
        config: BridgeConfig,
    ) -> GridSurface {
        let id = seq.next_surface();
        let cells = options.width as usize * options.height as usize;
        writer.send(
            "new",
            &GridOpen {
                name: options.name,
                page: options.page,
                uid: id,
                width: options.width,
                height: options.height,
                boxwidth: options.boxwidth,
                boxheight: options.boxheight,
                fontpercent: options.fontpercent,
                starthidden: options.starthidden,
                resizable: options.resizable,
            },
        );
        GridSurface {
            inner: Arc::new(GridInner {
                id,
                width: options.width,
                height: options.height,
                state: Mutex::new(GridState {
                    glyphs: vec![Cell::BLANK.glyph; cells],
                    colours: vec![Cell::BLANK.colour; cells],
                    backgrounds: vec![Cell::BLANK.background; cells],
                    highlight: Point::UNSET,
                    last_fingerprint: None,
                    last_send: None,
                    dropped: 0,
                    flip_seq: 0,
                }),
                pending_catchups: AtomicUsize::new(0),
                writer,
                acks,
                seq,
                config,
            }),
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.inner.id
    }

    pub fn width(&self) -> u32 {
        self.inner.width
    }

    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Writes one cell. Out-of-range coordinates are silent no-ops — expected
    /// at animation edges. A glyph or colour code wider than one display cell
    /// is a caller bug and fails with [`BridgeError::NotOneCell`].
    pub fn set(&self, x: i32, y: i32, glyph: &str, colour: &str, background: &str) -> BridgeResult<()> {
        let glyph = one_cell(glyph)?;
        let colour = one_cell(colour)?;
        let background = one_cell(background)?;
        let Some(index) = self.index(x, y) else {
            return Ok(());
        };
        let mut state = self.inner.state.lock();
        state.glyphs[index] = glyph;
        state.colours[index] = colour;
        state.backgrounds[index] = background;
        Ok(())
    }

    /// Reads one cell; [`Cell::BLANK`] outside the grid.
    pub fn get(&self, x: i32, y: i32) -> Cell {
        let Some(index) = self.index(x, y) else {
            return Cell::BLANK;
        };
        let state = self.inner.state.lock();
        Cell {
            glyph: state.glyphs[index],
            colour: state.colours[index],
            background: state.backgrounds[index],
        }
    }

    pub fn set_highlight(&self, x: i32, y: i32) {
        self.inner.state.lock().highlight = Point { x, y };
    }

    pub fn clear_highlight(&self) {
        self.inner.state.lock().highlight = Point::UNSET;
    }

    /// Blanks every cell and removes the highlight.
    pub fn clear(&self) {
        let mut state = self.inner.state.lock();
        state.glyphs.fill(Cell::BLANK.glyph);
        state.colours.fill(Cell::BLANK.colour);
        state.backgrounds.fill(Cell::BLANK.background);
        state.highlight = Point::UNSET;
    }

    /// Serializes the buffer and decides whether to transmit it.
    ///
    /// Unchanged frames are suppressed under either [`SyncPolicy`]. Under
    /// [`SyncPolicy::RateLimited`], a frame arriving too soon after the last
    /// transmission is dropped and a catch-up is scheduled instead; a
    /// throttled flip never waits for an ack. With `want_ack`, the caller
    /// blocks until the front end confirms rendering or the configured
    /// timeout elapses — whichever pops the pending token first wins.
    pub async fn flip(&self, want_ack: bool) -> FlipOutcome {
        match self.transmit(want_ack) {
            Transmit::Suppressed => FlipOutcome::Unchanged,
            Transmit::Throttled => FlipOutcome::Throttled,
            Transmit::Sent(None) => FlipOutcome::Sent,
            Transmit::Sent(Some((token, signal))) => self.await_ack(token, signal).await,
        }
    }

    fn transmit(&self, want_ack: bool) -> Transmit {
        let inner = &self.inner;
        let mut state = inner.state.lock();
        state.flip_seq += 1;
        let seq = state.flip_seq;

        // Fingerprint the frame as it would go out without a token, so
        // asking for an ack cannot defeat diff suppression.
        let frame = wire::encode_frame("update", &inner.update_content(&state, None));
        let fingerprint: [u8; 32] = Sha256::digest(&frame).into();
        if state.last_fingerprint == Some(fingerprint) {
            return Transmit::Suppressed;
        }

        if inner.config.policy == SyncPolicy::RateLimited {
            if let Some(last) = state.last_send {
                if last.elapsed() < inner.config.min_send_interval {
                    state.dropped += 1;
                    if state.dropped.is_power_of_two() {
                        tracing::debug!(
                            uid = %inner.id,
                            dropped = state.dropped,
                            "flips dropped by rate limiter"
                        );
                    }
                    drop(state);
                    schedule_catchup(inner, seq);
                    return Transmit::Throttled;
                }
            }
        }

        let wait = if want_ack {
            let token = inner.seq.next_ack_token();
            let (signal, receiver) = oneshot::channel();
            inner.acks.register(token.clone(), signal);
            let tagged =
                wire::encode_frame("update", &inner.update_content(&state, Some(token.clone())));
            inner.writer.send_raw(tagged);
            Some((token, receiver))
        } else {
            inner.writer.send_raw(frame);
            None
        };
        state.last_fingerprint = Some(fingerprint);
        state.last_send = Some(Instant::now());
        Transmit::Sent(wait)
    }

    async fn await_ack(&self, token: String, signal: oneshot::Receiver<()>) -> FlipOutcome {
        match tokio::time::timeout(self.inner.config.ack_timeout, signal).await {
            Ok(Ok(())) => FlipOutcome::Acknowledged,
            // Registry dropped without firing; nobody will ever confirm.
            Ok(Err(_)) => FlipOutcome::TimedOut,
            Err(_) => {
                if self.inner.acks.abandon(&token) {
                    FlipOutcome::TimedOut
                } else {
                    // The ack popped the entry as the timer fired; honour it.
                    FlipOutcome::Acknowledged
                }
            }
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.inner.width as i32 || y >= self.inner.height as i32 {
            return None;
        }
        Some(y as usize * self.inner.width as usize + x as usize)
    }
}

impl GridInner {
    fn update_content(&self, state: &GridState, ackmessage: Option<String>) -> GridUpdate {
        GridUpdate {
            uid: self.id,
            width: self.width,
            height: self.height,
            chars: state.glyphs.iter().collect(),
            colours: state.colours.iter().collect(),
            backgrounds: state.backgrounds.iter().collect(),
            highlight: state.highlight,
            ackmessage,
        }
    }

    /// Deferred transmission after a throttled flip. Fires only when no
    /// newer flip has occurred since it was scheduled; a newer flip either
    /// transmitted already or scheduled its own catch-up.
    fn run_catchup(&self, seq: u64) {
        let mut state = self.state.lock();
        if state.flip_seq != seq {
            return;
        }
        let frame = wire::encode_frame("update", &self.update_content(&state, None));
        let fingerprint: [u8; 32] = Sha256::digest(&frame).into();
        if state.last_fingerprint == Some(fingerprint) {
            return;
        }
        state.last_fingerprint = Some(fingerprint);
        state.last_send = Some(Instant::now());
        self.writer.send_raw(frame);
    }
}

fn schedule_catchup(inner: &Arc<GridInner>, seq: u64) {
    // Soft cap: pathological call rates must not pile up tasks.
    if inner.pending_catchups.load(Ordering::Relaxed) >= inner.config.max_pending_catchups {
        return;
    }
    inner.pending_catchups.fetch_add(1, Ordering::Relaxed);
    let inner = Arc::clone(inner);
    tokio::spawn(async move {
        tokio::time::sleep(inner.config.catchup_delay).await;
        inner.pending_catchups.fetch_sub(1, Ordering::Relaxed);
        inner.run_catchup(seq);
    });
}

fn one_cell(value: &str) -> BridgeResult<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => Err(BridgeError::NotOneCell(value.to_string())),
    }
}
