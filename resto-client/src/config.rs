use std::path::PathBuf;

/// Client configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | API_BASE_URL | http://localhost:1337/ | Restaurant/review API root |
/// | DATA_DIR | ./data | Directory holding the review queue file |
/// | REVIEW_REQUEST_TIMEOUT_MS | 30000 | Per-request HTTP timeout |
/// | STARTUP_FLUSH_DELAY_MS | 500 | Delay before the startup flush |
/// | CONNECTIVITY_PROBE_INTERVAL_MS | 5000 | Reachability check period |
/// | LOG_LEVEL | info | Default tracing filter |
/// | LOG_JSON | false | JSON console output |
/// | LOG_DIR | (unset) | Enables daily rolling log files |
///
/// ```ignore
/// API_BASE_URL=https://reviews.example.com/ DATA_DIR=/var/lib/resto resto-sync
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub data_dir: PathBuf,
    pub request_timeout_ms: u64,
    pub startup_flush_delay_ms: u64,
    pub probe_interval_ms: u64,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            api_base_url: std::env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:1337/".into()),
            data_dir: std::env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data")),
            request_timeout_ms: env_parse("REVIEW_REQUEST_TIMEOUT_MS", 30_000),
            startup_flush_delay_ms: env_parse("STARTUP_FLUSH_DELAY_MS", 500),
            probe_interval_ms: env_parse("CONNECTIVITY_PROBE_INTERVAL_MS", 5_000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_parse("LOG_JSON", false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
        }
    }

    /// Configuration pointing at a specific API and data directory
    ///
    /// Commonly used in tests
    pub fn with_overrides(api_base_url: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        let mut config = Self::from_env();
        config.api_base_url = api_base_url.into();
        config.data_dir = data_dir.into();
        config
    }

    /// Location of the review queue database
    pub fn queue_path(&self) -> PathBuf {
        self.data_dir.join("reviews.redb")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_and_queue_path() {
        let config = Config::with_overrides("http://api.test/", "/tmp/resto");
        assert_eq!(config.api_base_url, "http://api.test/");
        assert_eq!(config.queue_path(), PathBuf::from("/tmp/resto/reviews.redb"));
    }
}
