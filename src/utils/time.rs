use chrono::{DateTime, Duration, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Start of the "recent" window used by the stats endpoints.
pub fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
}
