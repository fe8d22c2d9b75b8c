//! Correlation table linking transmitted `update` frames to their eventual
//! front-end acknowledgements.
//!
//! Each pending flip holds the receiving end of a oneshot; the table owns the
//! sending end keyed by token. The ack/timeout race is decided by whichever
//! side pops the entry first — the pop is atomic under the lock, so exactly
//! one of [`complete`] and [`abandon`] can ever act on a given token.
//!
//! [`complete`]: AckRegistry::complete
//! [`abandon`]: AckRegistry::abandon

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::sync::oneshot;

#[derive(Debug, Default)]
pub struct AckRegistry {
    pending: Mutex<HashMap<String, oneshot::Sender<()>>>,
}

impl AckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a completion signal under `token`.
    pub fn register(&self, token: String, signal: oneshot::Sender<()>) {
        self.pending.lock().insert(token, signal);
    }

    /// Atomically removes `token` and fires its signal. Returns `false` when
    /// the token is unknown (never issued, already acknowledged, or already
    /// abandoned by its timeout).
    pub fn complete(&self, token: &str) -> bool {
        let Some(signal) = self.pending.lock().remove(token) else {
            return false;
        };
        // The waiter may have timed out and dropped its receiver between our
        // pop and this send; that is not an error.
        let _ = signal.send(());
        true
    }

    /// Atomically removes `token` without firing it, used by the timeout
    /// path. Returns `false` when the ack already won the race.
    pub fn abandon(&self, token: &str) -> bool {
        self.pending.lock().remove(token).is_some()
    }

    pub fn is_pending(&self, token: &str) -> bool {
        self.pending.lock().contains_key(token)
    }
}
