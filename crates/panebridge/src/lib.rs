//! Backend half of a two-process display bridge.
//!
//! A backend embeds this crate to drive display surfaces owned by a separate
//! front-end process, speaking newline-delimited JSON over a duplex byte
//! stream (stdin/stdout by default). One reader task classifies inbound lines
//! and routes them to single-owner event hubs; one writer task serializes all
//! outbound frames; grid surfaces decide per flip whether to transmit, drop,
//! or wait for the front end's acknowledgement.

pub mod ack;
pub mod bridge;
pub mod config;
pub mod error;
pub mod hub;
pub mod ids;
pub mod io;
pub mod protocol;
pub mod surface;

pub use ack::AckRegistry;
pub use bridge::Bridge;
pub use config::{BridgeConfig, SyncPolicy};
pub use error::{BridgeError, BridgeResult};
pub use hub::{PointerClick, PointerLocation};
pub use ids::{SequenceSource, SurfaceId};
pub use io::reader::ReaderStop;
pub use protocol::InputEvent;
pub use surface::{Cell, FlipOutcome, GridOptions, GridSurface, TextOptions, TextSurface};
