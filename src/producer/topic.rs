//! Topic logs of the in-memory broker
//!
//! A `Topic` is an append-only log of delivered records. Offsets start at
//! zero and grow by one per record; the in-memory broker only has a single
//! partition per topic.
//!
//! Concurrency note: callers must synchronize access to `Topic` (the broker
//! keeps all topics behind one lock).

/// A record delivered to a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub payload: Vec<u8>,
    /// Milliseconds since the UNIX epoch at which the producer accepted it.
    pub timestamp: i64,
}

#[derive(Debug, Default)]
pub struct Topic {
    pub name: String,
    pub records: Vec<Record>,
}

impl Topic {
    /// Create a new, empty topic with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            records: Vec::new(),
        }
    }

    pub fn next_offset(&self) -> i64 {
        self.records.len() as i64
    }

    /// Append a payload and return the offset it was stored at.
    pub fn append(&mut self, payload: Vec<u8>, timestamp: i64) -> i64 {
        let offset = self.next_offset();
        self.records.push(Record {
            topic: self.name.clone(),
            partition: 0,
            offset,
            payload,
            timestamp,
        });
        offset
    }
}
