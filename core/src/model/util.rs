use chrono::{DateTime, TimeZone, Utc};
use eyre::{eyre, Context, Result};
use uuid::Uuid;

/// milliseconds since UNIX epoch
pub fn datetime_to_db_repr(d: &DateTime<Utc>) -> i64 {
    d.timestamp_millis()
}

/// From milliseconds since UNIX epoch
pub fn datetime_from_db_repr(unix_millis: i64) -> Result<DateTime<Utc>> {
    match Utc.timestamp_millis_opt(unix_millis) {
        chrono::LocalResult::Single(dt) => Ok(dt),
        _ => Err(eyre!(
            "error converting unix millis epoch to DateTime: {}",
            unix_millis
        )),
    }
}

/// Hyphenated lowercase form, so that ids compare equal as text in SQL
pub fn uuid_to_db_repr(id: &Uuid) -> String {
    id.as_hyphenated().to_string()
}

pub fn uuid_from_db_repr(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).wrap_err_with(|| format!("invalid uuid in db: '{}'", s))
}
