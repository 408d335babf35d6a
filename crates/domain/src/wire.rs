//! Minimal DNS wire codec (RFC 1035 §4.1).
//!
//! Only the header and the first question are parsed; everything else in a
//! datagram is carried opaquely. Every read is bounds-checked and failures
//! surface as [`DecodeError`] instead of a panic.

use crate::{DecodeError, DnsQuery, Question};
use std::sync::Arc;

pub const HEADER_LEN: usize = 12;
/// Largest datagram accepted or produced without EDNS0.
pub const MAX_UDP_PAYLOAD: usize = 512;

const MAX_NAME_WIRE_LEN: usize = 255;
const MAX_LABEL_LEN: usize = 63;

const FLAG_QR: u16 = 0x8000;
const FLAG_RD: u16 = 0x0100;
const FLAG_RA: u16 = 0x0080;

pub const RCODE_NOERROR: u8 = 0;
pub const RCODE_SERVFAIL: u8 = 2;
pub const RCODE_NXDOMAIN: u8 = 3;

pub const QTYPE_A: u16 = 1;
pub const QCLASS_IN: u16 = 1;

/// Parses the header and first question of an inbound query.
pub fn decode(raw: &[u8]) -> Result<DnsQuery, DecodeError> {
    if raw.len() > MAX_UDP_PAYLOAD {
        return Err(DecodeError::Oversized(raw.len()));
    }
    if raw.len() < HEADER_LEN {
        return Err(DecodeError::malformed(raw, "shorter than a DNS header"));
    }

    let transaction_id = u16::from_be_bytes([raw[0], raw[1]]);
    let flags = u16::from_be_bytes([raw[2], raw[3]]);
    if flags & FLAG_QR != 0 {
        return Err(DecodeError::NotAQuery);
    }

    let question_count = u16::from_be_bytes([raw[4], raw[5]]);
    if question_count == 0 {
        return Err(DecodeError::malformed(raw, "no question"));
    }

    let (labels, mut pos) = read_name(raw, HEADER_LEN)?;

    let Some(tail) = raw.get(pos..pos + 4) else {
        return Err(DecodeError::malformed(raw, "question truncated before type/class"));
    };
    let qtype = u16::from_be_bytes([tail[0], tail[1]]);
    let qclass = u16::from_be_bytes([tail[2], tail[3]]);
    pos += 4;

    Ok(DnsQuery {
        transaction_id,
        question: Question::new(labels, qtype, qclass),
        question_count,
        question_end: pos,
        raw: Arc::from(raw),
    })
}

fn read_name(raw: &[u8], start: usize) -> Result<(Vec<String>, usize), DecodeError> {
    let mut labels = Vec::new();
    let mut pos = start;
    let mut wire_len = 0usize;

    loop {
        let Some(&len_byte) = raw.get(pos) else {
            return Err(DecodeError::malformed(raw, "name not terminated"));
        };
        pos += 1;
        wire_len += 1;

        if len_byte == 0 {
            break;
        }
        match len_byte & 0xC0 {
            0x00 => {}
            0xC0 => return Err(DecodeError::malformed(raw, "compression pointer in question")),
            _ => return Err(DecodeError::malformed(raw, "extended label type")),
        }

        let end = pos + len_byte as usize;
        let Some(bytes) = raw.get(pos..end) else {
            return Err(DecodeError::malformed(raw, "label runs past end of datagram"));
        };
        wire_len += bytes.len();
        if wire_len > MAX_NAME_WIRE_LEN {
            return Err(DecodeError::malformed(raw, "name longer than 255 bytes"));
        }

        let label = std::str::from_utf8(bytes)
            .map_err(|_| DecodeError::malformed(raw, "label is not valid text"))?;
        if label.contains('.') {
            return Err(DecodeError::malformed(raw, "label contains a dot"));
        }
        labels.push(label.to_owned());
        pos = end;
    }

    Ok((labels, pos))
}

/// Frames a cached answer for a requester: `transaction_id ++ cached_answer`.
///
/// `cached_answer` is an upstream reply with its two id bytes removed.
pub fn encode_reply(transaction_id: u16, cached_answer: &[u8]) -> Vec<u8> {
    let mut reply = Vec::with_capacity(2 + cached_answer.len());
    reply.extend_from_slice(&transaction_id.to_be_bytes());
    reply.extend_from_slice(cached_answer);
    reply
}

/// Header-only SERVFAIL reply carrying the requester's transaction id.
///
/// RD is copied from the request (RFC 1035 §4.1.1).
pub fn build_servfail(transaction_id: u16, recursion_desired: bool) -> [u8; HEADER_LEN] {
    let mut buf = [0u8; HEADER_LEN];
    buf[0..2].copy_from_slice(&transaction_id.to_be_bytes());
    let mut flags = FLAG_QR | FLAG_RA | RCODE_SERVFAIL as u16;
    if recursion_desired {
        flags |= FLAG_RD;
    }
    buf[2..4].copy_from_slice(&flags.to_be_bytes());
    buf
}

/// Builds a standard recursive query with a single question.
pub fn encode_query(
    transaction_id: u16,
    name: &str,
    qtype: u16,
    qclass: u16,
) -> Result<Vec<u8>, DecodeError> {
    let name = name.strip_suffix('.').unwrap_or(name);

    let mut buf = Vec::with_capacity(HEADER_LEN + name.len() + 6);
    buf.extend_from_slice(&transaction_id.to_be_bytes());
    buf.extend_from_slice(&FLAG_RD.to_be_bytes());
    buf.extend_from_slice(&1u16.to_be_bytes());
    buf.extend_from_slice(&[0, 0, 0, 0, 0, 0]);

    let mut wire_len = 1usize;
    if !name.is_empty() {
        for label in name.split('.') {
            if label.is_empty() || label.len() > MAX_LABEL_LEN {
                return Err(DecodeError::InvalidName(format!(
                    "'{}' has an empty or over-long label",
                    name
                )));
            }
            wire_len += 1 + label.len();
            buf.push(label.len() as u8);
            buf.extend_from_slice(label.as_bytes());
        }
    }
    if wire_len > MAX_NAME_WIRE_LEN {
        return Err(DecodeError::InvalidName(format!("'{}' is longer than 255 bytes", name)));
    }

    buf.push(0);
    buf.extend_from_slice(&qtype.to_be_bytes());
    buf.extend_from_slice(&qclass.to_be_bytes());
    Ok(buf)
}

/// Rewrites the question bytes of `reply` with the requester's own spelling.
///
/// A cached answer carries the question exactly as the first requester typed
/// it. Names compare case-insensitively, so a later requester using different
/// case gets its own bytes back. Nothing is touched unless both question
/// sections are the same length and equal ignoring ASCII case.
pub fn restore_question_case(reply: &mut [u8], query: &DnsQuery) {
    let end = query.question_end;
    let (Some(theirs), Some(ours)) = (reply.get(HEADER_LEN..end), query.raw.get(HEADER_LEN..end))
    else {
        return;
    };
    if theirs != ours && theirs.eq_ignore_ascii_case(ours) {
        reply[HEADER_LEN..end].copy_from_slice(ours);
    }
}

/// Raw bytes of the first question (name, type and class).
///
/// `None` when QDCOUNT is zero, the name is compressed or runs past the end,
/// or type/class are missing.
pub fn first_question(raw: &[u8]) -> Option<&[u8]> {
    let qdcount = u16::from_be_bytes([*raw.get(4)?, *raw.get(5)?]);
    if qdcount == 0 {
        return None;
    }

    let mut pos = HEADER_LEN;
    loop {
        let len = *raw.get(pos)? as usize;
        pos += 1;
        if len == 0 {
            break;
        }
        if len > MAX_LABEL_LEN {
            return None;
        }
        pos += len;
        if pos - HEADER_LEN > MAX_NAME_WIRE_LEN {
            return None;
        }
    }

    raw.get(HEADER_LEN..pos + 4)
}

/// Same question, comparing the name without regard to ASCII case.
pub fn same_question(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() || a.len() < 4 {
        return false;
    }
    let split = a.len() - 4;
    a[..split].eq_ignore_ascii_case(&b[..split]) && a[split..] == b[split..]
}

pub fn peek_transaction_id(raw: &[u8]) -> Option<u16> {
    raw.get(0..2).map(|b| u16::from_be_bytes([b[0], b[1]]))
}

pub fn is_response(raw: &[u8]) -> bool {
    raw.get(2).is_some_and(|b| b & 0x80 != 0)
}

pub fn recursion_desired(raw: &[u8]) -> bool {
    raw.get(2).is_some_and(|b| b & 0x01 != 0)
}

pub fn is_truncated(raw: &[u8]) -> bool {
    raw.get(2).is_some_and(|b| b & 0x02 != 0)
}

pub fn response_code(raw: &[u8]) -> Option<u8> {
    raw.get(3).map(|b| b & 0x0F)
}

pub fn answer_count(raw: &[u8]) -> Option<u16> {
    raw.get(6..8).map(|b| u16::from_be_bytes([b[0], b[1]]))
}
