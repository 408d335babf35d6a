use bytes::Bytes;
use std::time::Duration;
use tokio::time::Instant;

/// One stored answer. Immutable once inserted; a newer answer for the same
/// key replaces the whole entry.
#[derive(Debug, Clone)]
pub struct AnswerEntry {
    pub answer: Bytes,
    pub ttl: u32,
    pub expires_at: Instant,
}

impl AnswerEntry {
    pub fn new(answer: Bytes, ttl: u32, now: Instant) -> Self {
        Self {
            answer,
            ttl,
            expires_at: now + Duration::from_secs(u64::from(ttl)),
        }
    }

    #[inline]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    pub fn remaining_at(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }
}
