#![allow(dead_code)]

use bytes::Bytes;
use relay_dns_application::ports::ResolvedAnswer;
use relay_dns_domain::wire::{self, QCLASS_IN, QTYPE_A};
use std::net::SocketAddr;
use std::time::Duration;

pub fn client() -> SocketAddr {
    "192.168.1.100:40000".parse().unwrap()
}

pub fn upstream() -> SocketAddr {
    "10.0.0.1:53".parse().unwrap()
}

pub fn query(id: u16, name: &str) -> Vec<u8> {
    wire::encode_query(id, name, QTYPE_A, QCLASS_IN).unwrap()
}

/// NOERROR reply to `query` with one A record.
pub fn answer_reply(query: &[u8], ttl: u32) -> Vec<u8> {
    let mut reply = query.to_vec();
    reply[2] = 0x81;
    reply[3] = 0x80;
    reply[6..8].copy_from_slice(&1u16.to_be_bytes());
    reply.extend_from_slice(&[0xC0, 0x0C, 0x00, 0x01, 0x00, 0x01]);
    reply.extend_from_slice(&ttl.to_be_bytes());
    reply.extend_from_slice(&[0x00, 0x04, 93, 184, 216, 34]);
    reply
}

pub fn resolved(query: &[u8], ttl: u32) -> ResolvedAnswer {
    let reply = answer_reply(query, ttl);
    ResolvedAnswer {
        server: upstream(),
        answer: Bytes::copy_from_slice(&reply[2..]),
        ttl,
        rcode: 0,
        negative: false,
        latency: Duration::from_millis(5),
    }
}
