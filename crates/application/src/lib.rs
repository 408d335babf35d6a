//! relay-dns application layer: ports and the per-datagram use case.
pub mod ports;
pub mod use_cases;
