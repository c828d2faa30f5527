//! Configuration loading and management

use crate::core::error::ConfigError;
use crate::core::validation::validators::{CardRules, MAX_EXPIRY_YEARS_AHEAD};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on, e.g. `127.0.0.1:8080`
    pub bind: String,

    /// Origins allowed by CORS; empty allows no cross-origin requests
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            cors_allowed_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> std::result::Result<SocketAddr, ConfigError> {
        self.bind
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddress {
                value: self.bind.clone(),
            })
    }
}

/// Complete configuration of the clinic server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicConfig {
    pub server: ServerConfig,

    /// Limits used by the card validators
    pub payment: CardRules,
}

impl ClinicConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Reject limits the validators cannot work with
    ///
    /// The expiry horizon is capped at [`MAX_EXPIRY_YEARS_AHEAD`] years.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let rules = &self.payment;

        for (field, value) in [
            ("payment.min_card_digits", rules.min_card_digits),
            ("payment.min_name_length", rules.min_name_length),
            ("payment.min_cvv_digits", rules.min_cvv_digits),
        ] {
            if value == 0 {
                return Err(ConfigError::MustBePositive {
                    field: field.to_string(),
                });
            }
        }

        for (field, min, max) in [
            ("payment.card_digits", rules.min_card_digits, rules.max_card_digits),
            ("payment.cvv_digits", rules.min_cvv_digits, rules.max_cvv_digits),
        ] {
            if min > max {
                return Err(ConfigError::InvalidRange {
                    field: field.to_string(),
                    min,
                    max,
                });
            }
        }

        if rules.max_expiry_years_ahead > MAX_EXPIRY_YEARS_AHEAD {
            return Err(ConfigError::TooLarge {
                field: "payment.max_expiry_years_ahead".to_string(),
                max: u64::from(MAX_EXPIRY_YEARS_AHEAD),
            });
        }

        self.server.bind_addr()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClinicConfig::default_config();

        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.payment.max_card_digits, 19);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_serialization() {
        let config = ClinicConfig::default_config();
        let yaml = serde_yaml::to_string(&config).unwrap();

        // Should be able to parse it back
        let parsed = ClinicConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = ClinicConfig::from_yaml_str("payment:\n  max_cvv_digits: 3\n").unwrap();
        assert_eq!(config.payment.max_cvv_digits, 3);
        assert_eq!(config.payment.min_cvv_digits, 3);
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = ClinicConfig::from_yaml_str("payment:\n  min_card_digits: 20\n").unwrap_err();
        assert!(err.to_string().contains("payment.card_digits"));
    }

    #[test]
    fn test_expiry_horizon_capped() {
        let mut config = ClinicConfig::default_config();
        config.payment.max_expiry_years_ahead = 100;
        assert!(config.validate().is_ok());

        config.payment.max_expiry_years_ahead = 101;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooLarge { max: 100, .. })
        ));
    }

    #[test]
    fn test_bad_bind_address_rejected() {
        let mut config = ClinicConfig::default_config();
        config.server.bind = "localhost".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBindAddress { .. })
        ));
    }
}
