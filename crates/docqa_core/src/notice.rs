use std::time::Duration;

/// Lifetime applied when a notice is pushed without an explicit ttl.
pub const DEFAULT_NOTICE_TTL_MS: i64 = 3500;

pub type NoticeId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

/// An ephemeral user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: NoticeId,
    pub message: String,
    pub kind: NoticeKind,
    /// Milliseconds until auto-dismissal; zero or less means sticky.
    pub ttl_ms: i64,
}

impl Notice {
    pub fn is_sticky(&self) -> bool {
        self.ttl_ms <= 0
    }

    /// Delay after which the notice should expire, if it expires at all.
    pub fn expires_after(&self) -> Option<Duration> {
        u64::try_from(self.ttl_ms)
            .ok()
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

/// Process-wide notification queue, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notices {
    entries: Vec<Notice>,
    default_ttl_ms: i64,
}

impl Default for Notices {
    fn default() -> Self {
        Self::with_default_ttl(DEFAULT_NOTICE_TTL_MS)
    }
}

impl Notices {
    pub fn with_default_ttl(default_ttl_ms: i64) -> Self {
        Self {
            entries: Vec::new(),
            default_ttl_ms,
        }
    }

    /// Enqueues a notice and returns a copy of it so callers can schedule expiry.
    pub fn push(&mut self, message: impl Into<String>, kind: NoticeKind, ttl_ms: Option<i64>) -> Notice {
        let notice = Notice {
            id: uuid::Uuid::new_v4().simple().to_string(),
            message: message.into(),
            kind,
            ttl_ms: ttl_ms.unwrap_or(self.default_ttl_ms),
        };
        self.entries.push(notice.clone());
        notice
    }

    /// Removes a notice. Returns `false` when it was already gone.
    pub fn dismiss(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|notice| notice.id != id);
        before != self.entries.len()
    }

    pub fn entries(&self) -> &[Notice] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ttl_applies() {
        let mut notices = Notices::default();
        let notice = notices.push("hello", NoticeKind::Info, None);
        assert_eq!(notice.ttl_ms, DEFAULT_NOTICE_TTL_MS);
        assert_eq!(notice.expires_after(), Some(Duration::from_millis(3500)));
    }

    #[test]
    fn non_positive_ttl_is_sticky() {
        let mut notices = Notices::default();
        let zero = notices.push("a", NoticeKind::Error, Some(0));
        let negative = notices.push("b", NoticeKind::Error, Some(-5));
        assert!(zero.is_sticky());
        assert!(negative.is_sticky());
        assert_eq!(zero.expires_after(), None);
        assert_eq!(negative.expires_after(), None);
    }

    #[test]
    fn ids_are_unique_and_dismissable() {
        let mut notices = Notices::default();
        let a = notices.push("a", NoticeKind::Info, None);
        let b = notices.push("b", NoticeKind::Info, None);
        assert_ne!(a.id, b.id);
        assert!(notices.dismiss(&a.id));
        assert!(!notices.dismiss(&a.id));
        assert_eq!(notices.entries()[0].id, b.id);
    }
}
