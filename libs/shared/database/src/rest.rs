//! Small helpers for building PostgREST query strings.

use chrono::{DateTime, SecondsFormat, Utc};

/// `in.(a,b,c)` filter value for a list of ids.
pub fn in_list<I, S>(ids: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = ids
        .into_iter()
        .map(|id| id.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("in.({})", joined)
}

/// RFC 3339 timestamp, percent-encoded so `+` offsets survive the query string.
pub fn encode_timestamp(ts: DateTime<Utc>) -> String {
    urlencoding::encode(&ts.to_rfc3339_opts(SecondsFormat::Millis, true)).into_owned()
}
