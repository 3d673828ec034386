use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::placeholder::PlaceholderFormat;

/// Defaults applied to statements started from
/// [`StatementBuilder::from_config`](crate::StatementBuilder::from_config).
///
/// Deserializable so it can sit inside an application's own config file:
///
/// ```ignore
/// let config: BuilderConfig = serde_json::from_str(r#"{"placeholder_format": "dollar"}"#)?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Placeholder syntax of the target backend. Defaults to `?`.
    pub placeholder_format: PlaceholderFormat,
    /// Per-statement execution timeout in milliseconds. `None` means no timeout.
    pub query_timeout_ms: Option<u64>,
}

impl BuilderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_placeholder_format(mut self, format: PlaceholderFormat) -> Self {
        self.placeholder_format = format;
        self
    }

    /// Set the execution timeout.
    ///
    /// Zero is treated as "no timeout".
    pub fn with_query_timeout_ms(mut self, millis: u64) -> Self {
        self.query_timeout_ms = Some(millis);
        self
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BuilderConfig::new();
        assert_eq!(config.placeholder_format, PlaceholderFormat::Question);
        assert_eq!(config.query_timeout(), None);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: BuilderConfig =
            serde_json::from_str(r#"{"placeholder_format": "atp"}"#).unwrap();
        assert_eq!(config.placeholder_format, PlaceholderFormat::AtP);
        assert_eq!(config.query_timeout_ms, None);

        let config: BuilderConfig = serde_json::from_str(r#"{"query_timeout_ms": 1500}"#).unwrap();
        assert_eq!(config.placeholder_format, PlaceholderFormat::Question);
        assert_eq!(config.query_timeout(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_zero_timeout_disables() {
        let config = BuilderConfig::new().with_query_timeout_ms(0);
        assert_eq!(config.query_timeout(), None);
    }

    #[test]
    fn test_unknown_format_rejected() {
        let result: Result<BuilderConfig, _> =
            serde_json::from_str(r#"{"placeholder_format": "percent"}"#);
        assert!(result.is_err());
    }
}
