//! Reassembly configuration.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// How long one chunk fetch may block before the message is abandoned.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(20);

/// Settings fixed for the lifetime of one [`DechunkingBuffer`](crate::DechunkingBuffer).
///
/// Deserializes from e.g. `read_timeout_secs = 5`; missing fields take their
/// defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DechunkConfig {
    #[serde(rename = "read_timeout_secs", deserialize_with = "duration_from_secs")]
    pub read_timeout: Duration,
}

impl Default for DechunkConfig {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

impl DechunkConfig {
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }
}

fn duration_from_secs<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeout() {
        assert_eq!(DechunkConfig::default().read_timeout, Duration::from_secs(20));
    }

    #[test]
    fn test_from_toml() {
        let config: DechunkConfig = toml::from_str("read_timeout_secs = 3").unwrap();
        assert_eq!(config.read_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_from_empty_toml() {
        let config: DechunkConfig = toml::from_str("").unwrap();
        assert_eq!(config, DechunkConfig::default());
    }

    #[test]
    fn test_rejects_unknown_key() {
        assert!(toml::from_str::<DechunkConfig>("timeout = 3").is_err());
    }
}
