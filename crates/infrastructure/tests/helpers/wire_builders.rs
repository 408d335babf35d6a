#![allow(dead_code)]

use relay_dns_domain::wire::{self, QCLASS_IN, QTYPE_A};

pub const ANSWER_IP: [u8; 4] = [93, 184, 216, 34];

pub fn query(id: u16, name: &str) -> Vec<u8> {
    wire::encode_query(id, name, QTYPE_A, QCLASS_IN).unwrap()
}

fn reply_header(query: &[u8], rcode: u8, ancount: u16, nscount: u16) -> Vec<u8> {
    let mut reply = query.to_vec();
    reply[2] = 0x81;
    reply[3] = 0x80 | rcode;
    reply[6..8].copy_from_slice(&ancount.to_be_bytes());
    reply[8..10].copy_from_slice(&nscount.to_be_bytes());
    reply[10..12].copy_from_slice(&[0, 0]);
    reply
}

fn a_record(ttl: u32) -> Vec<u8> {
    let mut rr = vec![0xC0, 0x0C, 0x00, 0x01, 0x00, 0x01];
    rr.extend_from_slice(&ttl.to_be_bytes());
    rr.extend_from_slice(&[0x00, 0x04]);
    rr.extend_from_slice(&ANSWER_IP);
    rr
}

fn soa_record(ttl: u32, minimum: u32) -> Vec<u8> {
    let mut rr = vec![0xC0, 0x0C, 0x00, 0x06, 0x00, 0x01];
    rr.extend_from_slice(&ttl.to_be_bytes());
    rr.extend_from_slice(&22u16.to_be_bytes());
    // MNAME and RNAME are the root name.
    rr.extend_from_slice(&[0x00, 0x00]);
    for value in [2024_01_01u32, 7200, 3600, 1_209_600, minimum] {
        rr.extend_from_slice(&value.to_be_bytes());
    }
    rr
}

/// NOERROR reply with one A record per entry in `ttls`.
pub fn answer_reply(query: &[u8], ttls: &[u32]) -> Vec<u8> {
    let mut reply = reply_header(query, 0, ttls.len() as u16, 0);
    for &ttl in ttls {
        reply.extend_from_slice(&a_record(ttl));
    }
    reply
}

/// NXDOMAIN reply, optionally carrying an SOA `(record ttl, minimum)`.
pub fn nxdomain_reply(query: &[u8], soa: Option<(u32, u32)>) -> Vec<u8> {
    negative_reply(query, 3, soa)
}

/// NOERROR with an empty answer section.
pub fn nodata_reply(query: &[u8], soa: Option<(u32, u32)>) -> Vec<u8> {
    negative_reply(query, 0, soa)
}

fn negative_reply(query: &[u8], rcode: u8, soa: Option<(u32, u32)>) -> Vec<u8> {
    let mut reply = reply_header(query, rcode, 0, soa.is_some() as u16);
    if let Some((ttl, minimum)) = soa {
        reply.extend_from_slice(&soa_record(ttl, minimum));
    }
    reply
}

pub fn servfail_reply(query: &[u8]) -> Vec<u8> {
    reply_header(query, 2, 0, 0)
}

pub fn truncated_reply(query: &[u8]) -> Vec<u8> {
    let mut reply = answer_reply(query, &[60]);
    reply[2] |= 0x02;
    reply
}

pub fn with_id(mut datagram: Vec<u8>, id: u16) -> Vec<u8> {
    datagram[0..2].copy_from_slice(&id.to_be_bytes());
    datagram
}
