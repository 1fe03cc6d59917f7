/*!
Identifier generation for message IDs, sample numbers and result set IDs.

The codec treats identifiers as opaque text; uniqueness is the provider's job.
*/

use uuid::Uuid;

/// Source of opaque identifiers
pub trait IdProvider {
    fn next_id(&mut self) -> String;
}

/// Random v4 UUIDs in hyphenated form
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdProvider;

impl IdProvider for UuidIdProvider {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Counter-based IDs for reproducible runs
#[derive(Debug, Clone)]
pub struct SequentialIdProvider {
    prefix: String,
    next: u64,
}

impl SequentialIdProvider {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdProvider for SequentialIdProvider {
    fn next_id(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}
