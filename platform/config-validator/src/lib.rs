//! Small env-var helpers shared by every service binary's `Config::from_env`,
//! so each module doesn't re-invent the same "missing or unparsable" error
//! message (see `gl-rs::config::Config::from_env` for the pattern this
//! factors out).

use std::env;
use std::fmt;
use std::str::FromStr;

#[derive(Debug)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Read a required env var, or fail with a descriptive error.
pub fn require(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError(format!("{name} must be set")))
}

/// Read an optional env var with a default.
pub fn optional(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Read and parse an optional env var, falling back to `default` if unset
/// or unparsable.
pub fn optional_parsed<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Read and parse a required env var, failing with a descriptive error if
/// unset or unparsable.
pub fn require_parsed<T: FromStr>(name: &str) -> Result<T, ConfigError> {
    let raw = require(name)?;
    raw.parse::<T>()
        .map_err(|_| ConfigError(format!("{name} must be a valid value, got '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_parsed_falls_back_on_missing_var() {
        let value: u16 = optional_parsed("CONFIG_VALIDATOR_TEST_MISSING_VAR", 8090);
        assert_eq!(value, 8090);
    }

    #[test]
    fn require_fails_with_descriptive_message() {
        let err = require("CONFIG_VALIDATOR_TEST_MISSING_VAR").unwrap_err();
        assert!(err.0.contains("must be set"));
    }
}
