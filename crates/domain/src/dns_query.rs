use crate::CacheKey;
use std::fmt;
use std::sync::Arc;

/// The single question a query is cached and forwarded under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub labels: Vec<String>,
    pub qtype: u16,
    pub qclass: u16,
}

impl Question {
    pub fn new(labels: Vec<String>, qtype: u16, qclass: u16) -> Self {
        Self {
            labels,
            qtype,
            qclass,
        }
    }

    /// Dotted name without the trailing dot; the root name is `""`.
    pub fn name(&self) -> String {
        self.labels.join(".")
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(&self.name(), self.qtype, self.qclass)
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. type={} class={}", self.name(), self.qtype, self.qclass)
    }
}

/// A decoded inbound query.
///
/// `raw` is the datagram exactly as received and is what gets forwarded
/// upstream, so every upstream sees the requester's transaction id and the
/// full question section even when only the first question was parsed.
#[derive(Debug, Clone)]
pub struct DnsQuery {
    pub transaction_id: u16,
    pub question: Question,
    pub question_count: u16,
    /// Offset just past the first question in `raw`.
    pub question_end: usize,
    pub raw: Arc<[u8]>,
}

impl DnsQuery {
    pub fn cache_key(&self) -> CacheKey {
        self.question.cache_key()
    }
}
