//! Compiler configuration.
//!
//! Loaded from TOML (usually a `[filter]` table embedded by the host service)
//! or built in code; every key is optional.

use serde::Deserialize;
use thiserror::Error as ThisError;

///
/// CompilerConfig
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Normalize both sides of every textual comparison to upper case.
    pub ensure_ignore_case: bool,
    /// Target database flavour; decides how LIKE metacharacters are escaped.
    pub dialect: Dialect,
}

impl CompilerConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ensure_ignore_case: false,
            dialect: Dialect::Standard,
        }
    }

    #[must_use]
    pub const fn ignore_case(mut self, ensure_ignore_case: bool) -> Self {
        self.ensure_ignore_case = ensure_ignore_case;
        self
    }

    #[must_use]
    pub const fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|err| ConfigError::Parse {
            message: err.to_string(),
        })
    }
}

///
/// Dialect
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// `%` and `_` are escaped with the escape character.
    #[default]
    Standard,
    /// `%` and `_` are escaped as single-character bracket classes.
    SqlServer,
}

///
/// ConfigError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConfigError {
    #[error("invalid filter configuration: {message}")]
    Parse { message: String },
}

///
/// TESTS
///
