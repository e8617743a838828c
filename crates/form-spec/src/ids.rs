use time::OffsetDateTime;
use uuid::Uuid;

/// Collision-resistant identifier for forms, steps, fields, options and responses.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// Current time, never earlier than `previous`.
pub fn advance(previous: i64) -> i64 {
    now_millis().max(previous)
}
