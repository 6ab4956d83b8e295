use std::time::Duration;

use crate::notice::DEFAULT_NOTICE_TTL_MS;

/// Timing knobs for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Registry/diagnostics refresh period while any document is ingesting.
    pub fast_refresh: Duration,
    /// Registry/diagnostics refresh period otherwise.
    pub slow_refresh: Duration,
    /// Task status poll period while pending tasks exist.
    pub task_poll: Duration,
    pub default_notice_ttl_ms: i64,
    /// Consecutive quiet refreshes required before slowing down again.
    pub slow_down_after: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            fast_refresh: Duration::from_millis(1200),
            slow_refresh: Duration::from_millis(5000),
            task_poll: Duration::from_millis(3000),
            default_notice_ttl_ms: DEFAULT_NOTICE_TTL_MS,
            slow_down_after: 2,
        }
    }
}
