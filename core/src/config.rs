//! Client configuration (strict parsing).

use std::time::Duration;

use serde::Deserialize;

use crate::error::{ClientError, Result};
use crate::target::Target;

pub const ADDRESS_ENV: &str = "METRICS_ADDRESS";
pub const TIMEOUT_ENV: &str = "METRICS_TIMEOUT_SECS";

/// Where the client sends requests and how long each may take.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Full service address. `None` selects the default target.
    #[serde(default)]
    pub address: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClientConfig {
    pub fn with_address(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            ..Self::default()
        }
    }

    /// Read `METRICS_ADDRESS` and `METRICS_TIMEOUT_SECS`; unset variables
    /// keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Self::default();
        if let Some(address) = lookup(ADDRESS_ENV).filter(|a| !a.trim().is_empty()) {
            cfg.address = Some(address);
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            cfg.timeout_secs = raw
                .trim()
                .parse()
                .map_err(|e| ClientError::Config(format!("{TIMEOUT_ENV}={raw}: {e}")))?;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a JSON config document such as
    /// `{"address": "http://10.0.0.1:3030", "timeout_secs": 5}`.
    pub fn load_from_str(s: &str) -> Result<Self> {
        let cfg: ClientConfig = serde_json::from_str(s)
            .map_err(|e| ClientError::Config(format!("invalid json: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(ClientError::Config("timeout_secs must be > 0".into()));
        }
        self.target()?;
        Ok(())
    }

    pub fn target(&self) -> Result<Target> {
        match &self.address {
            Some(address) => Target::parse(address),
            None => Ok(Target::default()),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_local_service_with_ten_second_timeout() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.target().unwrap(), Target::default());
        assert_eq!(cfg.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn env_overrides_address_and_timeout() {
        let cfg = ClientConfig::from_lookup(lookup(&[
            (ADDRESS_ENV, "https://metrics.example.com"),
            (TIMEOUT_ENV, "3"),
        ]))
        .unwrap();
        assert_eq!(cfg.address.as_deref(), Some("https://metrics.example.com"));
        assert_eq!(cfg.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn empty_env_address_keeps_default() {
        let cfg = ClientConfig::from_lookup(lookup(&[(ADDRESS_ENV, "  ")])).unwrap();
        assert_eq!(cfg, ClientConfig::default());
    }

    #[test]
    fn bad_env_timeout_is_a_config_error() {
        let err = ClientConfig::from_lookup(lookup(&[(TIMEOUT_ENV, "soon")])).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn load_from_str_applies_defaults() {
        let cfg = ClientConfig::load_from_str(r#"{"address": "http://10.0.0.1:3030"}"#).unwrap();
        assert_eq!(cfg.timeout_secs, 10);
        assert_eq!(cfg.target().unwrap().as_url().port(), Some(3030));
    }

    #[test]
    fn load_from_str_rejects_unknown_fields() {
        let err = ClientConfig::load_from_str(r#"{"adress": "http://x"}"#).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = ClientConfig::load_from_str(r#"{"timeout_secs": 0}"#).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn unparseable_address_is_rejected() {
        let err = ClientConfig::with_address("nope").validate().unwrap_err();
        assert!(matches!(err, ClientError::InvalidAddress(_)));
    }
}
