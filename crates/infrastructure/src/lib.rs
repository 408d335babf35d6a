//! relay-dns infrastructure: cache, upstream race and the UDP worker pool.
pub mod dns;
