use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Identifies one surface for the lifetime of the process. Ids are minted
/// once at surface construction and never reused.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SurfaceId(pub u64);

impl SurfaceId {
    /// Bucket for inbound events that name no surface. Real ids start at 1.
    pub const UNSCOPED: SurfaceId = SurfaceId(0);
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Process-wide generator for surface ids and ack tokens. Constructed once by
/// the bridge and shared by handle; the two counters are independent.
#[derive(Debug, Default)]
pub struct SequenceSource {
    surfaces: AtomicU64,
    acks: AtomicU64,
}

impl SequenceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_surface(&self) -> SurfaceId {
        SurfaceId(self.surfaces.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Mints a token correlating one `update` frame with its eventual
    /// front-end acknowledgement.
    pub fn next_ack_token(&self) -> String {
        (self.acks.fetch_add(1, Ordering::Relaxed) + 1).to_string()
    }
}
