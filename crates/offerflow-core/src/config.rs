//! Configuration defaults and environment helpers.

use std::time::Duration;

/// Default idle timeout for access-stream sessions: 10 minutes.
pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 600;

/// Environment variable names.
pub mod env_vars {
    use super::DEFAULT_SESSION_TIMEOUT_SECS;

    pub const SESSION_TIMEOUT_SECS: &str = "OFFERFLOW_SESSION_TIMEOUT_SECS";

    /// Session timeout from the environment, or the default.
    pub fn session_timeout_secs() -> u64 {
        std::env::var(SESSION_TIMEOUT_SECS)
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|&secs| secs > 0)
            .unwrap_or(DEFAULT_SESSION_TIMEOUT_SECS)
    }
}

/// Configuration for the access-stream manager.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessConfig {
    /// Idle timeout after which a session buffer is discarded.
    pub session_timeout: Duration,
}

impl AccessConfig {
    /// Configuration with an explicit session timeout.
    ///
    /// A zero timeout falls back to the default rather than meaning
    /// "never expire".
    pub fn with_session_timeout(timeout: Duration) -> Self {
        if timeout.is_zero() {
            Self::default()
        } else {
            Self {
                session_timeout: timeout,
            }
        }
    }

    /// Configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            session_timeout: Duration::from_secs(env_vars::session_timeout_secs()),
        }
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            session_timeout: Duration::from_secs(DEFAULT_SESSION_TIMEOUT_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_ten_minutes() {
        assert_eq!(
            AccessConfig::default().session_timeout,
            Duration::from_secs(600)
        );
    }

    #[test]
    fn test_zero_timeout_falls_back_to_default() {
        let config = AccessConfig::with_session_timeout(Duration::ZERO);
        assert_eq!(config, AccessConfig::default());
    }

    #[test]
    fn test_explicit_timeout_kept() {
        let config = AccessConfig::with_session_timeout(Duration::from_secs(30));
        assert_eq!(config.session_timeout, Duration::from_secs(30));
    }
}
