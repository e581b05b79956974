//! Error types for the request pipeline
//!
//! Every message names what the user should do about it, not only what went wrong.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::config::PresetKind;

/// Configuration store failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "config file not found at {}: create it (KEY='value' per line) or pass --config PATH",
        path.display()
    )]
    Missing { path: PathBuf },

    #[error("failed to access config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "failed to back up {} before saving, nothing was written: {source} (check permissions on the config directory)",
        path.display()
    )]
    Backup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{key} is empty: set {key} before saving")]
    MissingRequired { key: &'static str },

    #[error("unknown {kind} preset '{name}': use one of {available}")]
    UnknownPreset {
        kind: PresetKind,
        name: String,
        available: String,
    },
}

/// Raised before any network call when no usable token is available
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("authorization token is not set: set AUTHORIZATION_TOKEN in config.env or pass --token")]
    Missing,
}

/// Request construction failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("API host is not set: set API_HOST in config.env or apply an endpoint preset")]
    MissingHost,

    #[error("{key} contains control characters that cannot be sent in a header: remove them from {key}")]
    InvalidHeaderValue { key: &'static str },
}

/// Whole seconds as `30s`, anything finer as milliseconds
fn display_duration(duration: &Duration) -> String {
    if duration.subsec_nanos() == 0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

/// Transport-level failures. HTTP error statuses are not errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("request timed out after {}: raise --timeout or check connectivity", display_duration(.0))]
    Timeout(Duration),

    #[error("could not connect: {0} (check API_HOST and your network)")]
    Connect(String),

    #[error("proxy at {addr} is not reachable: start the interception proxy or set USE_PROXY=false")]
    ProxyUnreachable { addr: String },

    #[error("invalid proxy address '{0}': fix PROXY_HOST and PROXY_PORT")]
    InvalidProxy(String),

    #[error("request failed: {0}")]
    Transport(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_keeps_sub_second_precision() {
        assert_eq!(
            NetworkError::Timeout(Duration::from_millis(200)).to_string(),
            "request timed out after 200ms: raise --timeout or check connectivity"
        );
        assert!(NetworkError::Timeout(Duration::from_secs(30)).to_string().contains("after 30s:"));
    }
}
