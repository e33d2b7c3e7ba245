//! Common types used across plugboard modules.

/// Timestamp wrapper for consistent serialization.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Get current UTC timestamp.
pub fn now() -> Timestamp {
    chrono::Utc::now()
}

/// Priority assigned to middleware and scripts that leave it unset (zero).
pub const DEFAULT_PRIORITY: i32 = 50;

/// Resolve a declared priority, mapping the unset value to [`DEFAULT_PRIORITY`].
pub fn effective_priority(priority: i32) -> i32 {
    if priority == 0 {
        DEFAULT_PRIORITY
    } else {
        priority
    }
}
