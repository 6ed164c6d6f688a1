//! Configuration loading and representation.

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

use labinv_observability::LogFormat;

/// Environment variable naming the inventory document.
pub const ENV_DATA_FILE: &str = "LABINV_DATA_FILE";
/// Environment variable with the public base URL used in deep links.
pub const ENV_APP_URL: &str = "LABINV_APP_URL";
/// Environment variable selecting `text` or `json` log output.
pub const ENV_LOG_FORMAT: &str = "LABINV_LOG_FORMAT";

pub const DEFAULT_DATA_FILE: &str = "inventory_data.json";
pub const DEFAULT_APP_URL: &str = "http://localhost:8501/";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_file: PathBuf,
    pub app_url: String,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            app_url: DEFAULT_APP_URL.to_string(),
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; unset or blank keys use defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = get(ENV_DATA_FILE) {
            config.data_file = PathBuf::from(path);
        }
        if let Some(url) = get(ENV_APP_URL) {
            config.app_url = parse_app_url(ENV_APP_URL, url)?;
        }
        if let Some(format) = get(ENV_LOG_FORMAT) {
            config.log_format = format.parse().map_err(|e: labinv_observability::UnknownLogFormat| {
                ConfigError::InvalidValue {
                    key: ENV_LOG_FORMAT,
                    value: format.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        Ok(config)
    }
}

/// Accept only absolute http(s) URLs with a host, so deep links are
/// scannable from a phone. Returns the normalized URL.
pub fn parse_app_url(key: &'static str, url: String) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        key,
        value: url.clone(),
        reason,
    };

    let parsed = Url::parse(url.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!(
            "scheme {:?} is not http or https",
            parsed.scheme()
        )));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("URL has no host".to_string()));
    }
    Ok(parsed.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.data_file, PathBuf::from("inventory_data.json"));
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_DATA_FILE, "/var/lib/labinv/inventory.json"),
            (ENV_APP_URL, "https://inventory.lab.example/"),
            (ENV_LOG_FORMAT, "json"),
        ]))
        .unwrap();

        assert_eq!(config.data_file, PathBuf::from("/var/lib/labinv/inventory.json"));
        assert_eq!(config.app_url, "https://inventory.lab.example/");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn blank_values_are_treated_as_unset() {
        let config = AppConfig::from_lookup(lookup(&[(ENV_DATA_FILE, "  ")])).unwrap();
        assert_eq!(config.data_file, PathBuf::from(DEFAULT_DATA_FILE));
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = AppConfig::from_lookup(lookup(&[(ENV_LOG_FORMAT, "xml")])).unwrap_err();
        assert!(err.to_string().contains(ENV_LOG_FORMAT));

        let err = AppConfig::from_lookup(lookup(&[(ENV_APP_URL, "lab.example")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: ENV_APP_URL, .. }));
    }

    #[test]
    fn app_url_must_be_absolute_http() {
        for bad in ["ftp://lab.example/", "mailto:lab@example.org", "http://", "not a url"] {
            assert!(parse_app_url(ENV_APP_URL, bad.to_string()).is_err(), "{bad}");
        }
        assert_eq!(
            parse_app_url(ENV_APP_URL, " https://lab.example:8501 ".to_string()).unwrap(),
            "https://lab.example:8501/"
        );
    }
}
