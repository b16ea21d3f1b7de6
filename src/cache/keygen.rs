//! Key Generator Module
//!
//! Produces opaque, globally unique keys for stored values.

use std::fmt::Debug;

use uuid::Uuid;

/// Source of fresh keys for `ValueStore::store`.
pub trait KeyGenerator: Send + Sync + Debug {
    fn generate(&self) -> String;
}

/// Random 128-bit (UUID v4) keys drawn from the OS CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidKeyGenerator;

impl KeyGenerator for UuidKeyGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
