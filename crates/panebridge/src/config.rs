use std::env;
use std::time::Duration;

/// Frame-suppression policy applied by [`GridSurface::flip`].
///
/// The two strategies are alternatives, not layers: `DiffOnly` reproduces the
/// plain content-diff behaviour, `RateLimited` adds the elapsed-time gate and
/// catch-up transmissions on top of the diff.
///
/// [`GridSurface::flip`]: crate::surface::GridSurface::flip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPolicy {
    /// Suppress a flip only when its frame fingerprint equals the last
    /// transmitted one.
    DiffOnly,
    /// Additionally drop frames arriving faster than `min_send_interval` and
    /// schedule a deferred catch-up so the final state is still shown.
    RateLimited,
}

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub policy: SyncPolicy,
    /// Minimum spacing between physical transmissions of one surface.
    pub min_send_interval: Duration,
    /// Delay before a dropped frame's catch-up transmission fires.
    pub catchup_delay: Duration,
    /// How long a `flip(true)` caller waits for the front end's ack.
    pub ack_timeout: Duration,
    /// Upper bound on catch-up tasks in flight per surface.
    pub max_pending_catchups: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            policy: SyncPolicy::RateLimited,
            min_send_interval: Duration::from_millis(9),
            catchup_delay: Duration::from_millis(25),
            ack_timeout: Duration::from_millis(100),
            max_pending_catchups: 100,
        }
    }
}

impl BridgeConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults above: `PANEBRIDGE_SYNC_POLICY` (`diff` | `rate`),
    /// `PANEBRIDGE_MIN_SEND_MS`, `PANEBRIDGE_CATCHUP_MS`,
    /// `PANEBRIDGE_ACK_TIMEOUT_MS`.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(value) = env::var("PANEBRIDGE_SYNC_POLICY") {
            match value.trim().to_ascii_lowercase().as_str() {
                "diff" => cfg.policy = SyncPolicy::DiffOnly,
                "rate" => cfg.policy = SyncPolicy::RateLimited,
                other => tracing::warn!(policy = %other, "unknown sync policy, keeping default"),
            }
        }
        if let Some(interval) = env_millis("PANEBRIDGE_MIN_SEND_MS") {
            cfg.min_send_interval = interval;
        }
        if let Some(delay) = env_millis("PANEBRIDGE_CATCHUP_MS") {
            cfg.catchup_delay = delay;
        }
        if let Some(timeout) = env_millis("PANEBRIDGE_ACK_TIMEOUT_MS") {
            cfg.ack_timeout = timeout;
        }
        cfg
    }
}

fn env_millis(var: &str) -> Option<Duration> {
    env::var(var)
        .ok()?
        .trim()
        .parse()
        .ok()
        .map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{LazyLock, Mutex};

    // Environment variable tests must not run in parallel.
    static ENV_MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

    #[test]
    fn defaults_match_conventional_values() {
        let cfg = BridgeConfig::default();
        assert_eq!(cfg.policy, SyncPolicy::RateLimited);
        assert_eq!(cfg.min_send_interval, Duration::from_millis(9));
        assert_eq!(cfg.catchup_delay, Duration::from_millis(25));
        assert_eq!(cfg.ack_timeout, Duration::from_millis(100));
        assert_eq!(cfg.max_pending_catchups, 100);
    }

    #[test]
    fn env_overrides_apply() {
        let _lock = ENV_MUTEX.lock().unwrap();
        env::set_var("PANEBRIDGE_SYNC_POLICY", "diff");
        env::set_var("PANEBRIDGE_MIN_SEND_MS", "15");
        env::set_var("PANEBRIDGE_ACK_TIMEOUT_MS", "250");
        let cfg = BridgeConfig::from_env();
        env::remove_var("PANEBRIDGE_SYNC_POLICY");
        env::remove_var("PANEBRIDGE_MIN_SEND_MS");
        env::remove_var("PANEBRIDGE_ACK_TIMEOUT_MS");
        assert_eq!(cfg.policy, SyncPolicy::DiffOnly);
        assert_eq!(cfg.min_send_interval, Duration::from_millis(15));
        assert_eq!(cfg.ack_timeout, Duration::from_millis(250));
        assert_eq!(cfg.catchup_delay, Duration::from_millis(25));
    }

    #[test]
    fn garbage_env_values_are_ignored() {
        let _lock = ENV_MUTEX.lock().unwrap();
        env::set_var("PANEBRIDGE_SYNC_POLICY", "sometimes");
        env::set_var("PANEBRIDGE_MIN_SEND_MS", "soon");
        let cfg = BridgeConfig::from_env();
        env::remove_var("PANEBRIDGE_SYNC_POLICY");
        env::remove_var("PANEBRIDGE_MIN_SEND_MS");
        assert_eq!(cfg.policy, SyncPolicy::RateLimited);
        assert_eq!(cfg.min_send_interval, Duration::from_millis(9));
    }
}
