//! Backend connection settings.
//!
//! Two settings are mandatory and read once at start-up: the backend URL
//! (`LACTEO_DATABASE_URL`) and the backend access key (`LACTEO_ACCESS_KEY`).
//! A missing or empty value is a fatal configuration error. The backend is
//! SQLite, e.g. `sqlite://lacteo.db?mode=rwc`. The URL may carry an
//! `{access_key}` placeholder, e.g. `sqlite://datos/{access_key}/lacteo.db`,
//! which is filled in only when the connection string is built.

use crate::errors::{Error, Result};
use std::fmt;

/// Environment variable holding the backend URL
pub const DATABASE_URL_VAR: &str = "LACTEO_DATABASE_URL";
/// Environment variable holding the backend access key
pub const ACCESS_KEY_VAR: &str = "LACTEO_ACCESS_KEY";

const ACCESS_KEY_PLACEHOLDER: &str = "{access_key}";

/// Connection settings for the database backend.
#[derive(Clone, PartialEq, Eq)]
pub struct BackendConfig {
    url: String,
    access_key: String,
}

impl BackendConfig {
    /// Builds the configuration from explicit values, rejecting empty ones.
    pub fn new(url: impl Into<String>, access_key: impl Into<String>) -> Result<Self> {
        let url = url.into();
        let access_key = access_key.into();
        if url.trim().is_empty() {
            return Err(Error::MissingEnvVar {
                name: DATABASE_URL_VAR.to_string(),
            });
        }
        if access_key.trim().is_empty() {
            return Err(Error::MissingEnvVar {
                name: ACCESS_KEY_VAR.to_string(),
            });
        }
        Ok(Self {
            url: url.trim().to_string(),
            access_key: access_key.trim().to_string(),
        })
    }

    /// Reads both settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads both settings through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(DATABASE_URL_VAR).ok_or_else(|| Error::MissingEnvVar {
            name: DATABASE_URL_VAR.to_string(),
        })?;
        let access_key = lookup(ACCESS_KEY_VAR).ok_or_else(|| Error::MissingEnvVar {
            name: ACCESS_KEY_VAR.to_string(),
        })?;
        Self::new(url, access_key)
    }

    /// URL as configured, placeholder included.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Connection string with the access key substituted in.
    #[must_use]
    pub fn connection_url(&self) -> String {
        self.url.replace(ACCESS_KEY_PLACEHOLDER, &self.access_key)
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url)
            .field("access_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_from_lookup_reads_both_settings() -> Result<()> {
        let config = BackendConfig::from_lookup(lookup_from(&[
            (DATABASE_URL_VAR, "sqlite::memory:"),
            (ACCESS_KEY_VAR, "secret"),
        ]))?;
        assert_eq!(config.url(), "sqlite::memory:");
        assert_eq!(config.connection_url(), "sqlite::memory:");
        Ok(())
    }

    #[test]
    fn test_missing_url_is_fatal() {
        let result = BackendConfig::from_lookup(lookup_from(&[(ACCESS_KEY_VAR, "secret")]));
        assert!(matches!(
            result,
            Err(Error::MissingEnvVar { ref name }) if name == DATABASE_URL_VAR
        ));
    }

    #[test]
    fn test_missing_access_key_is_fatal() {
        let result =
            BackendConfig::from_lookup(lookup_from(&[(DATABASE_URL_VAR, "sqlite::memory:")]));
        assert!(matches!(
            result,
            Err(Error::MissingEnvVar { ref name }) if name == ACCESS_KEY_VAR
        ));
    }

    #[test]
    fn test_blank_access_key_is_fatal() {
        let result = BackendConfig::new("sqlite::memory:", "   ");
        assert!(matches!(result, Err(Error::MissingEnvVar { .. })));
    }

    #[test]
    fn test_access_key_placeholder_is_substituted() -> Result<()> {
        let config = BackendConfig::new("sqlite://datos/{access_key}/lacteo.db?mode=rwc", "s3cr3t")?;
        assert_eq!(
            config.connection_url(),
            "sqlite://datos/s3cr3t/lacteo.db?mode=rwc"
        );
        assert_eq!(config.url(), "sqlite://datos/{access_key}/lacteo.db?mode=rwc");
        Ok(())
    }

    #[test]
    fn test_debug_redacts_access_key() -> Result<()> {
        let config = BackendConfig::new("sqlite::memory:", "s3cr3t")?;
        let debug = format!("{config:?}");
        assert!(!debug.contains("s3cr3t"));
        assert!(debug.contains("<redacted>"));
        Ok(())
    }
}
