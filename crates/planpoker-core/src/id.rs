//! Opaque identifier generation.

use uuid::Uuid;

/// Returns a fresh identifier, unique within the process lifetime.
///
/// UUIDv7 combines a millisecond timestamp with random bits, so identifiers
/// are collision-resistant and sort roughly by creation time.
pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}
