use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    #[error("Oversized datagram: {0} bytes")]
    OversizedDatagram(usize),

    #[error("All upstreams timed out after {0}ms")]
    AllUpstreamsTimedOut(u64),

    #[error("Query could not be sent to any upstream")]
    AllUpstreamsFailedToSend,

    #[error("No upstream servers configured")]
    NoUpstreamServers,

    #[error("Invalid upstream reply: {0}")]
    InvalidUpstreamReply(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

/// Errors produced by the wire codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("datagram of {0} bytes exceeds the 512-byte UDP limit")]
    Oversized(usize),

    #[error("malformed query: {reason}")]
    Malformed {
        /// Transaction id, when at least the first two bytes were present.
        transaction_id: Option<u16>,
        reason: &'static str,
    },

    /// QR bit set; dropped without a reply.
    #[error("datagram is a response, not a query")]
    NotAQuery,

    #[error("invalid name: {0}")]
    InvalidName(String),
}

impl DecodeError {
    pub(crate) fn malformed(raw: &[u8], reason: &'static str) -> Self {
        let transaction_id = (raw.len() >= 2).then(|| u16::from_be_bytes([raw[0], raw[1]]));
        Self::Malformed {
            transaction_id,
            reason,
        }
    }

    /// Transaction id recovered before the failure, if any.
    pub fn transaction_id(&self) -> Option<u16> {
        match self {
            Self::Malformed { transaction_id, .. } => *transaction_id,
            _ => None,
        }
    }
}

impl From<DecodeError> for DomainError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Oversized(len) => DomainError::OversizedDatagram(len),
            other => DomainError::MalformedQuery(other.to_string()),
        }
    }
}
