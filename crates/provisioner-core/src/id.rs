//! Identifier generation
//!
//! Every entity minted by the translator gets its identifier from an
//! [`IdGenerator`] passed in by the caller, never from ambient state.

/// Source of unique opaque identifiers
///
/// Implementations are shared between concurrent translations and must never
/// hand the same identifier to two callers.
pub trait IdGenerator: Send + Sync {
    fn new_id(&self) -> String;
}

/// Random v4 UUIDs
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl UuidGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for UuidGenerator {
    fn new_id(&self) -> String {
        ::uuid::Uuid::new_v4().to_string()
    }
}
