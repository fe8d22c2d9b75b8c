use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BridgeError {
    /// A glyph or colour code that does not occupy exactly one display cell.
    /// This is a caller bug, not a runtime condition.
    #[error("value {0:?} is not exactly one display cell wide")]
    NotOneCell(String),
    /// A hub or the writer went away, which only happens while the runtime is
    /// shutting down.
    #[error("bridge channel closed")]
    Closed,
}

pub type BridgeResult<T> = Result<T, BridgeError>;
