#![allow(dead_code)]

/// Hand-assembles query datagrams, including shapes the encoder refuses to
/// produce.
pub struct QueryBuilder {
    id: u16,
    flags: u16,
    qdcount: Option<u16>,
    name: Vec<u8>,
    qtype: u16,
    qclass: u16,
    trailing: Vec<u8>,
}

impl QueryBuilder {
    pub fn new(name: &str) -> Self {
        let mut wire = Vec::new();
        for label in name.split('.').filter(|l| !l.is_empty()) {
            wire.push(label.len() as u8);
            wire.extend_from_slice(label.as_bytes());
        }
        wire.push(0);
        Self {
            id: 0x1234,
            flags: 0x0100,
            qdcount: None,
            name: wire,
            qtype: 1,
            qclass: 1,
            trailing: Vec::new(),
        }
    }

    pub fn with_raw_name(mut self, name: Vec<u8>) -> Self {
        self.name = name;
        self
    }

    pub fn with_id(mut self, id: u16) -> Self {
        self.id = id;
        self
    }

    pub fn with_flags(mut self, flags: u16) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_qdcount(mut self, count: u16) -> Self {
        self.qdcount = Some(count);
        self
    }

    pub fn with_type(mut self, qtype: u16) -> Self {
        self.qtype = qtype;
        self
    }

    pub fn with_class(mut self, qclass: u16) -> Self {
        self.qclass = qclass;
        self
    }

    pub fn with_trailing(mut self, bytes: &[u8]) -> Self {
        self.trailing.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&self.id.to_be_bytes());
        buf.extend_from_slice(&self.flags.to_be_bytes());
        buf.extend_from_slice(&self.qdcount.unwrap_or(1).to_be_bytes());
        buf.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
        buf.extend_from_slice(&self.name);
        buf.extend_from_slice(&self.qtype.to_be_bytes());
        buf.extend_from_slice(&self.qclass.to_be_bytes());
        buf.extend_from_slice(&self.trailing);
        buf
    }
}
