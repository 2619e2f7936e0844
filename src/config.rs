// Runtime settings resolved from the environment.
//
// Credentials come only from environment variables (optionally seeded from a
// `.env` file by dotenvy at startup). They are never written to disk.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

pub(crate) const DEFAULT_ADVISOR_MODEL: &str = "claude-sonnet-4-20250514";
pub(crate) const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_BIND: &str = "127.0.0.1:3000";
const MEMORY_DB: &str = ":memory:";

/// An API key. Prints as `Secret(***)` so it can't leak through `{:?}`.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct Secret(String);

impl Secret {
    /// None for blank values.
    pub(crate) fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// How the advisor reaches a language model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AdvisorMode {
    /// Call the Anthropic Messages API with a locally held key.
    Direct {
        api_key: Option<Secret>,
        model: String,
    },
    /// POST prompts to a relay that holds the provider key.
    Relay { url: String },
}

impl std::fmt::Display for AdvisorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdvisorMode::Direct { model, .. } => write!(f, "direct ({model})"),
            AdvisorMode::Relay { url } => write!(f, "relay ({url})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DbLocation {
    File(PathBuf),
    Volatile,
}

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(crate) advisor: AdvisorMode,
    pub(crate) gemini_key: Option<Secret>,
    pub(crate) gemini_model: String,
    /// Relay bind address as configured; parsed by [`Settings::bind_addr`].
    pub(crate) bind: String,
    pub(crate) db: DbLocation,
    /// Directory for the database and the TUI log file.
    pub(crate) data_dir: Option<PathBuf>,
    pub(crate) log_filter: String,
    pub(crate) log_json: bool,
}

impl Settings {
    pub(crate) fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings through `lookup`; blank values count as unset.
    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let advisor = match get("SPENDLENS_ADVISOR_URL") {
            Some(url) => AdvisorMode::Relay {
                url: url.trim().to_string(),
            },
            None => AdvisorMode::Direct {
                api_key: get("SPENDLENS_ANTHROPIC_KEY")
                    .or_else(|| get("ANTHROPIC_API_KEY"))
                    .and_then(Secret::new),
                model: get("SPENDLENS_ADVISOR_MODEL")
                    .unwrap_or_else(|| DEFAULT_ADVISOR_MODEL.to_string()),
            },
        };

        let bind = get("SPENDLENS_BIND")
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| DEFAULT_BIND.to_string());

        let data_dir = directories::ProjectDirs::from("com", "spendlens", "SpendLens")
            .map(|dirs| dirs.data_dir().to_path_buf());

        let db = match get("SPENDLENS_DB") {
            Some(path) if path.trim() == MEMORY_DB => DbLocation::Volatile,
            Some(path) => DbLocation::File(PathBuf::from(path.trim())),
            None => match &data_dir {
                Some(dir) => DbLocation::File(dir.join("spendlens.db")),
                None => DbLocation::Volatile,
            },
        };

        Ok(Self {
            advisor,
            gemini_key: get("SPENDLENS_GEMINI_KEY")
                .or_else(|| get("GEMINI_API_KEY"))
                .and_then(Secret::new),
            gemini_model: get("SPENDLENS_GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            bind,
            db,
            data_dir,
            log_filter: get("SPENDLENS_LOG").unwrap_or_else(|| "info".to_string()),
            log_json: get("SPENDLENS_LOG_JSON").is_some_and(|v| is_truthy(&v)),
        })
    }

    /// Relay bind address, parsed on demand by `serve`.
    pub(crate) fn bind_addr(&self) -> Result<SocketAddr> {
        self.bind
            .parse()
            .with_context(|| format!("Invalid SPENDLENS_BIND address: {}", self.bind))
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
