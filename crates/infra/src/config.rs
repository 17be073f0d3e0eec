//! Service configuration.

use serde::{Deserialize, Serialize};

/// First attempt plus one transparent retry.
pub const DEFAULT_MAX_COMMIT_ATTEMPTS: u32 = 2;

pub const ENV_MAX_COMMIT_ATTEMPTS: &str = "SHELFPLAN_MAX_COMMIT_ATTEMPTS";

/// Layout mutation service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// How many times a mutation is attempted when its commit hits a
    /// concurrent-write conflict. The last conflict is reported as transient.
    pub max_commit_attempts: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_commit_attempts: DEFAULT_MAX_COMMIT_ATTEMPTS,
        }
    }
}

impl LayoutConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through `lookup`; unparsable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_MAX_COMMIT_ATTEMPTS) {
            match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => config.max_commit_attempts = n,
                _ => tracing::warn!(
                    key = ENV_MAX_COMMIT_ATTEMPTS,
                    value = %raw,
                    default = DEFAULT_MAX_COMMIT_ATTEMPTS,
                    "invalid value; using default"
                ),
            }
        }

        config
    }

    pub fn with_max_commit_attempts(mut self, attempts: u32) -> Self {
        self.max_commit_attempts = attempts.max(1);
        self
    }
}
