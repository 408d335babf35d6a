use std::fmt;
use std::sync::Arc;

/// Cache identity of a question: normalized name, type and class.
///
/// The transaction id is deliberately absent so that one cached answer serves
/// every client asking the same question.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub name: Arc<str>,
    pub qtype: u16,
    pub qclass: u16,
}

impl CacheKey {
    pub fn new(name: &str, qtype: u16, qclass: u16) -> Self {
        Self {
            name: normalize_name(name).into(),
            qtype,
            qclass,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.name, self.qtype, self.qclass)
    }
}

/// ASCII-lowercases and strips one trailing dot.
pub fn normalize_name(name: &str) -> String {
    name.strip_suffix('.').unwrap_or(name).to_ascii_lowercase()
}
