//! Domain ID generation
//!
//! IDs use the format `{kind}-{uuidv7}`, e.g. `job-0192f3a8-...`.
//! UUIDv7 is time-ordered, so IDs sort by creation time while staying
//! unique under concurrent submissions.

/// Generate a time-ordered unique ID for the given kind of record
pub fn generate_id(kind: &str) -> String {
    format!("{kind}-{}", uuid::Uuid::now_v7())
}
