pub mod eventregistry;

pub use eventregistry::EventRegistrySource;

/// Common utilities for feed sources
pub(crate) mod utils {
    use chrono::{DateTime, NaiveDateTime, Utc};

    /// Parses a provider timestamp, accepting RFC 3339 and zone-less `YYYY-MM-DDTHH:MM:SS` (taken as UTC).
    pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
        let value = value.trim();
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }

}
