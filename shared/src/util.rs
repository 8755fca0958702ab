/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Serde helper for timestamps that the API sends either as Unix millis or
/// as RFC 3339 strings.
pub mod lenient_millis {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(i64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(ms) => serializer.serialize_i64(*ms),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        let raw = Option::<Raw>::deserialize(deserializer)?;
        Ok(match raw {
            None => None,
            Some(Raw::Millis(ms)) => Some(ms),
            Some(Raw::Text(text)) => chrono::DateTime::parse_from_rfc3339(&text)
                .map(|dt| dt.timestamp_millis())
                .ok()
                .or_else(|| text.parse().ok()),
        })
    }
}
