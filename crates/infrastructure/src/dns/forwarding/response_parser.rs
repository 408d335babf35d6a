use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::{RData, Record};
use relay_dns_domain::wire::{self, HEADER_LEN, MAX_UDP_PAYLOAD};
use relay_dns_domain::DomainError;
use tracing::debug;

/// A reply that passed every check and may be cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedReply {
    pub ttl: u32,
    pub rcode: u8,
    /// NXDOMAIN, or NOERROR with an empty answer section.
    pub negative: bool,
}

/// Decides whether an upstream datagram answers the query in flight.
#[derive(Debug, Clone, Copy)]
pub struct ResponseParser {
    min_negative_ttl: u32,
    max_ttl: u32,
}

impl ResponseParser {
    pub fn new(min_negative_ttl: u32, max_ttl: u32) -> Self {
        Self {
            min_negative_ttl,
            max_ttl,
        }
    }

    /// Every `Err` means "discard this datagram and keep listening".
    ///
    /// `question` is the first question of the query in flight, as returned
    /// by [`wire::first_question`]; the reply must echo it.
    pub fn validate(
        &self,
        reply: &[u8],
        transaction_id: u16,
        question: &[u8],
    ) -> Result<ValidatedReply, DomainError> {
        if reply.len() < HEADER_LEN {
            return Err(DomainError::InvalidUpstreamReply(format!(
                "{} bytes is shorter than a header",
                reply.len()
            )));
        }
        if wire::peek_transaction_id(reply) != Some(transaction_id) {
            return Err(DomainError::InvalidUpstreamReply(
                "transaction id mismatch".into(),
            ));
        }
        if reply.len() > MAX_UDP_PAYLOAD {
            return Err(DomainError::InvalidUpstreamReply(format!(
                "{} bytes exceeds the UDP limit",
                reply.len()
            )));
        }
        if !wire::is_response(reply) {
            return Err(DomainError::InvalidUpstreamReply("QR bit not set".into()));
        }
        if wire::is_truncated(reply) {
            return Err(DomainError::InvalidUpstreamReply("truncated reply".into()));
        }
        let echoed = wire::first_question(reply);
        if !echoed.is_some_and(|echoed| wire::same_question(echoed, question)) {
            return Err(DomainError::InvalidUpstreamReply(
                "question section does not match the query".into(),
            ));
        }

        let message = Message::from_vec(reply).map_err(|e| {
            DomainError::InvalidUpstreamReply(format!("Failed to parse DNS response: {}", e))
        })?;
        let rcode = wire::response_code(reply).unwrap_or_default();

        let validated = match message.response_code {
            ResponseCode::NoError if !&message.answers.is_empty() => ValidatedReply {
                ttl: self.positive_ttl(&message.answers),
                rcode,
                negative: false,
            },
            ResponseCode::NoError | ResponseCode::NXDomain => ValidatedReply {
                ttl: self.negative_ttl(&message.authorities),
                rcode,
                negative: true,
            },
            other => {
                return Err(DomainError::InvalidUpstreamReply(format!(
                    "unusable response code {:?}",
                    other
                )))
            }
        };

        debug!(
            rcode = ?message.response_code,
            answers = message.answers.len(),
            ttl = validated.ttl,
            negative = validated.negative,
            "Upstream reply accepted"
        );

        Ok(validated)
    }

    fn positive_ttl(&self, answers: &[Record]) -> u32 {
        answers
            .iter()
            .map(|r| r.ttl)
            .min()
            .unwrap_or(0)
            .min(self.max_ttl)
    }

    fn negative_ttl(&self, authority: &[Record]) -> u32 {
        let soa_ttl = authority.iter().find_map(|r| {
            if let RData::SOA(soa) = &r.data {
                Some(soa.minimum.min(r.ttl))
            } else {
                None
            }
        });

        soa_ttl
            .unwrap_or(0)
            .max(self.min_negative_ttl)
            .min(self.max_ttl.max(self.min_negative_ttl))
    }
}
