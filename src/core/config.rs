//! Engine configuration

use chrono::Duration;

/// Default number of retries after an optimistic version conflict
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default time window for heuristic transfer-leg matching, in seconds
pub const DEFAULT_MATCH_WINDOW_SECS: u64 = 1;

/// Tunables of the ledger engine
///
/// Controls how hard the coordinator retries conflicting units of work and
/// how far apart two legs may be for the reconciler to pair them heuristically.
#[derive(Clone, Debug, PartialEq)]
pub struct LedgerConfig {
    /// Retries after the first attempt; 0 means a conflict is surfaced at once
    pub max_retries: u32,

    /// Legs are paired heuristically only if their timestamps are within this window
    pub match_window: Duration,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            match_window: Duration::seconds(DEFAULT_MATCH_WINDOW_SECS as i64),
        }
    }
}

impl LedgerConfig {
    /// Create a LedgerConfig with custom values
    ///
    /// Windows too large for `chrono::Duration` are clamped to its maximum.
    pub fn new(max_retries: u32, match_window_secs: u64) -> Self {
        let match_window = i64::try_from(match_window_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);

        Self {
            max_retries,
            match_window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LedgerConfig::default();
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.match_window, Duration::seconds(1));
    }

    #[test]
    fn test_custom_config() {
        let config = LedgerConfig::new(0, 30);
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.match_window, Duration::seconds(30));
    }

    #[test]
    fn test_huge_window_is_clamped() {
        let config = LedgerConfig::new(1, u64::MAX);
        assert_eq!(config.match_window, Duration::MAX);
    }
}
