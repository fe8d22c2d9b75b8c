//! Display surfaces and the flip protocol.

mod grid;
mod text;

pub use grid::{Cell, GridOptions, GridSurface};
pub use text::{TextOptions, TextSurface};

/// What one call to [`GridSurface::flip`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipOutcome {
    /// Frame transmitted; no confirmation was requested.
    Sent,
    /// Identical to the last transmitted frame; nothing was sent.
    Unchanged,
    /// Dropped by the rate limiter; a catch-up transmission will carry the
    /// surface's final state shortly.
    Throttled,
    /// Frame transmitted and confirmed rendered by the front end.
    Acknowledged,
    /// Frame transmitted but no confirmation arrived in time. The frame is
    /// not retried; the caller decides whether to flip again.
    TimedOut,
}
