//! Client configuration.
//!
//! The bearer token is read once, when the default transport is built. The
//! organization identifier is resolved on every call through
//! `OrganizationSource`, so a changed environment takes effect without
//! rebuilding the client.

use std::time::Duration;

use thiserror::Error;

/// Production API endpoint.
pub const API_URL: &str = "https://api.calendly.com";

pub const API_KEY_VAR: &str = "CALENDLY_API_KEY";
pub const BASE_URL_VAR: &str = "CALENDLY_BASE_URL";
pub const TIMEOUT_VAR: &str = "CALENDLY_TIMEOUT_SECS";
pub const ORGANIZATION_VAR: &str = "ORGANIZATION_ID";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {value}")]
    InvalidVar { name: &'static str, value: String },
}

/// Where the organization scope comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrganizationSource {
    /// Read the named environment variable on each call.
    Env(String),
    /// Always use this organization.
    Fixed(String),
}

impl OrganizationSource {
    /// Current organization, or `None` if the variable is unset.
    pub fn resolve(&self) -> Option<String> {
        match self {
            OrganizationSource::Env(name) => std::env::var(name).ok(),
            OrganizationSource::Fixed(id) => Some(id.clone()),
        }
    }
}

impl Default for OrganizationSource {
    fn default() -> Self {
        OrganizationSource::Env(ORGANIZATION_VAR.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CalendlyConfig {
    pub api_key: String,
    pub base_url: String,
    pub organization: OrganizationSource,
    /// Whole-request timeout for the default transport. `None` leaves the
    /// transport's own default in place.
    pub timeout: Option<Duration>,
}

impl CalendlyConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: API_URL.to_string(),
            organization: OrganizationSource::default(),
            timeout: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_organization(mut self, organization: OrganizationSource) -> Self {
        self.organization = organization;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Load from the process environment, after applying a `.env` file if
    /// one is present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary key-value lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR).ok_or(ConfigError::MissingVar(API_KEY_VAR))?;
        let mut config = Self::new(api_key);

        if let Some(base_url) = lookup(BASE_URL_VAR) {
            config.base_url = base_url;
        }

        if let Some(raw) = lookup(TIMEOUT_VAR) {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidVar {
                name: TIMEOUT_VAR,
                value: raw.clone(),
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }
}
