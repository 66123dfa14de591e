use pipeview::{DEFAULT_CHUNK_SIZE, HTTP_CONNECT_TIMEOUT, HTTP_READ_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    /// Connect timeout for HTTP requests in milliseconds.
    pub connect_timeout: u64,
    /// Read timeout for HTTP response bodies in milliseconds.
    pub read_timeout: u64,
    pub chunk_size: usize,
    pub mode: ProgressMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connect_timeout: HTTP_CONNECT_TIMEOUT.as_millis() as u64,
            read_timeout: HTTP_READ_TIMEOUT.as_millis() as u64,
            chunk_size: DEFAULT_CHUNK_SIZE,
            mode: ProgressMode::default(),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ProgressMode {
    /// Report every chunk as a running byte count.
    Relay,
    /// Report percentages, if the length is known.
    Throttled,
    /// No progress output.
    Quiet,
}

impl ProgressMode {
    pub(crate) const VARIANTS: &'static [&'static str] = &["relay", "throttled", "quiet"];
}

impl Default for ProgressMode {
    fn default() -> Self {
        Self::Throttled
    }
}

impl FromStr for ProgressMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relay" => Ok(Self::Relay),
            "throttled" => Ok(Self::Throttled),
            "quiet" => Ok(Self::Quiet),
            other => Err(format!("unknown progress mode: {}", other)),
        }
    }
}

impl Display for ProgressMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressMode::Relay => write!(f, "relay"),
            ProgressMode::Throttled => write!(f, "throttled"),
            ProgressMode::Quiet => write!(f, "quiet"),
        }
    }
}
