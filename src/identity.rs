//! Deterministic identifiers for items and files.
//!
//! Identifiers are name-based (version 5) UUIDs in the DNS namespace, so the
//! same catalog identifier or file name maps to the same id on every run and
//! on every machine.

use uuid::Uuid;

/// Derives the stable identifier for `name`.
#[must_use]
pub fn derive_id(name: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_DNS, name.as_bytes())
}

/// Same as [`derive_id`], rendered as a lowercase hyphenated string.
#[must_use]
pub fn derive_id_string(name: &str) -> String {
    derive_id(name).hyphenated().to_string()
}
