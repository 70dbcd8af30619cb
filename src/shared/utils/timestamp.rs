use chrono::{SecondsFormat, Utc};

/// Current UTC time as fixed-width RFC 3339 with microseconds.
///
/// Fixed width keeps stored timestamps lexicographically sortable, which the
/// waitlist and registration ordering rely on.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
