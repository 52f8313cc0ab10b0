//! Transient inline notices shown above a form

use crate::dom::NodeId;
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NoticeKind {
    pub fn as_class(&self) -> &'static str {
        match self {
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
            NoticeKind::Warning => "warning",
            NoticeKind::Info => "info",
        }
    }
}

/// A rendered notice and when it should disappear
#[derive(Debug, Clone)]
pub struct Notice<N = NodeId> {
    pub node: N,
    pub kind: NoticeKind,
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

impl<N> Notice<N> {
    pub fn new(node: N, kind: NoticeKind, message: &str, shown_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            node,
            kind,
            message: message.to_string(),
            expires_at: shown_at + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
