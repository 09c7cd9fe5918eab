//! Service configuration.
//!
//! Defaults suit local development. Override through environment variables
//! or explicit construction for tests.
use super::content::ContractTerms;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Directory of the sled database.
    pub database_path: PathBuf,
    /// Jurisdiction whose laws govern every contract.
    pub governing_law: String,
    /// Platform named in the acceptance clause.
    pub platform_name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        let terms = ContractTerms::default();
        Self {
            database_path: PathBuf::from("trace.db"),
            governing_law: terms.governing_law,
            platform_name: terms.platform_name,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `TRACE_DATABASE_PATH` (default: `trace.db`)
    /// - `TRACE_GOVERNING_LAW` (default: `Nigeria`)
    /// - `TRACE_PLATFORM_NAME` (default: `Farmily TRACE`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// As [`ServiceConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_path = match lookup("TRACE_DATABASE_PATH") {
            Some(raw) => PathBuf::from(non_blank("TRACE_DATABASE_PATH", raw)?),
            None => defaults.database_path,
        };
        let governing_law = match lookup("TRACE_GOVERNING_LAW") {
            Some(raw) => non_blank("TRACE_GOVERNING_LAW", raw)?,
            None => defaults.governing_law,
        };
        let platform_name = match lookup("TRACE_PLATFORM_NAME") {
            Some(raw) => non_blank("TRACE_PLATFORM_NAME", raw)?,
            None => defaults.platform_name,
        };

        Ok(Self {
            database_path,
            governing_law,
            platform_name,
        })
    }

    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }

    pub fn terms(&self) -> ContractTerms {
        ContractTerms {
            governing_law: self.governing_law.clone(),
            platform_name: self.platform_name.clone(),
        }
    }
}

fn non_blank(var: &'static str, raw: String) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Blank(var));
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is set but blank")]
    Blank(&'static str),
}
