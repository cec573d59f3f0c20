//! Resolver configuration.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Type argument used for tables and forms that do not declare one.
pub const DEFAULT_TYPE_PARAMETER: &str = "org.jboss.hal.dmr.ModelNode";

/// Pattern a column value has to match to count as a template expression.
pub const DEFAULT_EXPRESSION_PATTERN: &str = r"\$\{[^{}]+\}";

pub(crate) static DEFAULT_EXPRESSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(DEFAULT_EXPRESSION_PATTERN).unwrap());

/// Errors in a resolver configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid expression pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("The default type parameter must not be empty")]
    EmptyTypeParameter,
}

/// Settings for a resolve pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ResolverConfig {
    /// Fully qualified type argument for declarations without one.
    pub default_type_parameter: String,
    /// Regular expression recognising template expressions in column values.
    pub expression_pattern: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_type_parameter: DEFAULT_TYPE_PARAMETER.to_string(),
            expression_pattern: DEFAULT_EXPRESSION_PATTERN.to_string(),
        }
    }
}

impl ResolverConfig {
    /// Parse and validate a JSON configuration. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ResolverConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_type_parameter.trim().is_empty() {
            return Err(ConfigError::EmptyTypeParameter);
        }
        self.expression().map(|_| ())
    }

    pub(crate) fn expression(&self) -> Result<Regex, ConfigError> {
        if self.expression_pattern == DEFAULT_EXPRESSION_PATTERN {
            return Ok(DEFAULT_EXPRESSION.clone());
        }
        Regex::new(&self.expression_pattern).map_err(|source| ConfigError::InvalidPattern {
            pattern: self.expression_pattern.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_expression_pattern() {
        let regex = ResolverConfig::default().expression().unwrap();
        assert!(regex.is_match("${foo}"));
        assert!(regex.is_match("${row.name} (${row.type})"));
        assert!(!regex.is_match("foo"));
        assert!(!regex.is_match("${}"));
    }

    #[test]
    fn test_from_json_keeps_defaults() {
        let json = r#"{"default-type-parameter": "org.example.Bean"}"#;
        let config = ResolverConfig::from_json(json).unwrap();
        assert_eq!(config.default_type_parameter, "org.example.Bean");
        assert_eq!(config.expression_pattern, DEFAULT_EXPRESSION_PATTERN);
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = ResolverConfig::from_json(r#"{"expression-pattern": "(unclosed"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }

    #[test]
    fn test_empty_type_parameter_is_rejected() {
        let err = ResolverConfig::from_json(r#"{"default-type-parameter": " "}"#).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyTypeParameter));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(ResolverConfig::from_json("{"), Err(ConfigError::Json(_))));
    }
}
