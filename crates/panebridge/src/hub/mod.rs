//! Event hubs: single-owner state behind request channels.
//!
//! Each hub is one spawned task owning its queue or map outright. Producers
//! (the stream reader) and consumers (application code) reach it only through
//! a cloned channel handle; queries carry a oneshot for the reply, so a
//! caller blocks on its own response and never on other callers. No hub
//! holds a lock — serialization comes from the single request loop.

pub mod command;
pub mod key;
pub mod location;
pub mod pointer;
pub mod quit;

pub use command::CommandHub;
pub use key::KeyHub;
pub use location::{LocationHub, PointerLocation};
pub use pointer::{PointerClick, PointerHub};
pub use quit::QuitHub;

/// Handles to all five hubs. Cheap to clone; the underlying tasks are shared.
#[derive(Clone)]
pub struct Hubs {
    pub keys: KeyHub,
    pub pointer: PointerHub,
    pub location: LocationHub,
    pub commands: CommandHub,
    pub quit: QuitHub,
}

impl Hubs {
    /// Spawns all hub tasks. Must be called within a Tokio runtime.
    pub fn spawn() -> Self {
        Self {
            keys: KeyHub::spawn(),
            pointer: PointerHub::spawn(),
            location: LocationHub::spawn(),
            commands: CommandHub::spawn(),
            quit: QuitHub::spawn(),
        }
    }
}
