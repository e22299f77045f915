use std::{env, str::FromStr};
use thiserror::Error;

const DEFAULT_INDEX: &str = "products";
const DEFAULT_TEMPERATURE: f32 = 0.5;
const DEFAULT_MAX_TOKENS: u16 = 4096;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("${key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub elastic: ElasticConfig,
    pub azure: AzureSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElasticConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub index: String,
}

/// Chat deployment settings. Numeric values stay raw until the chat client is
/// built, so a bad value only affects commands that talk to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureSettings {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub deployment: Option<String>,
    pub api_version: Option<String>,
    pub temperature: Option<String>,
    pub max_tokens: Option<String>,
}

impl AzureSettings {
    /// # Errors
    ///
    /// Fails if `$AZURE_OPENAI_TEMPERATURE` is not a number.
    pub fn temperature(&self) -> Result<f32, ConfigError> {
        parse_or(
            "AZURE_OPENAI_TEMPERATURE",
            self.temperature.as_deref(),
            DEFAULT_TEMPERATURE,
        )
    }

    /// # Errors
    ///
    /// Fails if `$AZURE_OPENAI_MAX_TOKENS` is not a valid token count.
    pub fn max_tokens(&self) -> Result<u16, ConfigError> {
        parse_or(
            "AZURE_OPENAI_MAX_TOKENS",
            self.max_tokens.as_deref(),
            DEFAULT_MAX_TOKENS,
        )
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            elastic: ElasticConfig {
                endpoint: get("ELASTIC_CLOUD_ENDPOINT"),
                api_key: get("ELASTIC_API_KEY"),
                index: get("ELASTIC_INDEX").unwrap_or_else(|| DEFAULT_INDEX.to_string()),
            },
            azure: AzureSettings {
                endpoint: get("AZURE_OPENAI_ENDPOINT"),
                api_key: get("AZURE_OPENAI_API_KEY"),
                deployment: get("AZURE_OPENAI_GPT4O_DEPLOYMENT_NAME"),
                api_version: get("AZURE_OPENAI_API_VERSION"),
                temperature: get("AZURE_OPENAI_TEMPERATURE"),
                max_tokens: get("AZURE_OPENAI_MAX_TOKENS"),
            },
        }
    }
}

fn parse_or<T: FromStr>(
    key: &'static str,
    value: Option<&str>,
    default: T,
) -> Result<T, ConfigError> {
    value.map_or(Ok(default), |value| {
        value.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            value: value.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect::<HashMap<_, _>>();

        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]);

        assert_eq!(config.elastic.endpoint, None);
        assert_eq!(config.elastic.index, "products");
        assert_eq!(config.azure.max_tokens(), Ok(4096));
        assert!((config.azure.temperature().unwrap() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config_from(&[("ELASTIC_API_KEY", "  ")]);

        assert_eq!(config.elastic.api_key, None);
    }

    #[test]
    fn reads_all_settings() {
        let config = config_from(&[
            ("ELASTIC_CLOUD_ENDPOINT", "https://es.example.com"),
            ("ELASTIC_API_KEY", "key"),
            ("ELASTIC_INDEX", "catalog"),
            ("AZURE_OPENAI_GPT4O_DEPLOYMENT_NAME", "gpt-4o"),
            ("AZURE_OPENAI_API_VERSION", "2024-02-01"),
            ("AZURE_OPENAI_MAX_TOKENS", "1024"),
        ]);

        assert_eq!(
            config.elastic.endpoint.as_deref(),
            Some("https://es.example.com")
        );
        assert_eq!(config.elastic.index, "catalog");
        assert_eq!(config.azure.deployment.as_deref(), Some("gpt-4o"));
        assert_eq!(config.azure.api_version.as_deref(), Some("2024-02-01"));
        assert_eq!(config.azure.max_tokens(), Ok(1024));
    }

    #[test]
    fn unparseable_numbers_fail_on_use() {
        let config = config_from(&[("AZURE_OPENAI_TEMPERATURE", "warm")]);

        assert_eq!(
            config.azure.temperature(),
            Err(ConfigError::Invalid {
                key: "AZURE_OPENAI_TEMPERATURE",
                value: "warm".to_string()
            })
        );
    }

    #[test]
    fn bad_chat_settings_keep_search_settings() {
        let config = config_from(&[
            ("ELASTIC_CLOUD_ENDPOINT", "https://es.example.com"),
            ("ELASTIC_API_KEY", "key"),
            ("AZURE_OPENAI_TEMPERATURE", "warm"),
            ("AZURE_OPENAI_MAX_TOKENS", "lots"),
        ]);

        assert_eq!(
            config.elastic,
            ElasticConfig {
                endpoint: Some("https://es.example.com".to_string()),
                api_key: Some("key".to_string()),
                index: "products".to_string(),
            }
        );
        assert!(config.azure.max_tokens().is_err());
    }
}
