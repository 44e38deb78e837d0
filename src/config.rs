//! Backend selection.
//!
//! The default variant is fixed at build time by cargo features (`backend-global`
//! switches it from the system heap to the global allocator) and can be
//! overridden per process with the `RAWMEM_BACKEND` environment variable. The
//! choice is read once, when [`Accessor::get`](crate::Accessor::get) first
//! resolves the accessor.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which backend serves native memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// [`SystemBackend`](crate::backend::SystemBackend).
    #[cfg_attr(not(feature = "backend-global"), default)]
    System,
    /// [`GlobalAllocBackend`](crate::backend::GlobalAllocBackend).
    #[cfg_attr(feature = "backend-global", default)]
    Global,
}

impl BackendKind {
    /// The name used in configuration.
    pub const fn as_str(self) -> &'static str {
        match self {
            BackendKind::System => "system",
            BackendKind::Global => "global",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "system" => Ok(BackendKind::System),
            "global" => Ok(BackendKind::Global),
            _ => Err(ConfigError::UnknownBackend(s.to_owned())),
        }
    }
}

/// Accessor configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessorConfig {
    /// Backend serving native memory.
    pub backend: BackendKind,
}

impl AccessorConfig {
    /// Environment variable overriding [`AccessorConfig::backend`].
    pub const BACKEND_ENV: &'static str = "RAWMEM_BACKEND";

    /// Reads the configuration from the environment.
    ///
    /// Unset or unrecognised values fall back to the build default; the latter
    /// are logged.
    pub fn from_env() -> Self {
        match std::env::var(Self::BACKEND_ENV) {
            Ok(value) => Self::from_backend_name(&value).unwrap_or_else(|err| {
                tracing::warn!(%err, "ignoring {}", Self::BACKEND_ENV);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Parses a configuration document such as `{"backend": "global"}`.
    ///
    /// # Errors
    /// Returns [`ConfigError::Json`] for malformed JSON or unknown backend names.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds a configuration from a backend name.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnknownBackend`] for unrecognised names.
    pub fn from_backend_name(name: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            backend: name.parse()?,
        })
    }
}
