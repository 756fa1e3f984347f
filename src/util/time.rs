use std::time::{SystemTime, UNIX_EPOCH};

/// Get the current time in milliseconds since the UNIX epoch
pub fn timestamp_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Get a timestamp in seconds since the UNIX epoch
pub fn timestamp_secs() -> u64 {
    timestamp_millis() / 1000
}
