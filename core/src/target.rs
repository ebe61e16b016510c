//! Base address of the metrics service and per-request URL resolution.

use std::fmt;

use url::Url;

use crate::error::{ClientError, Result};

/// Address used when no explicit target is configured.
pub const DEFAULT_ADDRESS: &str = "http://127.0.0.1:3030";

/// Base network address a client sends requests against.
///
/// Only the scheme and authority of the base are used; `resolve` replaces
/// the path and drops any query or fragment. The base itself is never
/// modified, so one `Target` serves any number of requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    base: Url,
}

impl Target {
    /// Build a target from its parts, e.g. `("http", "127.0.0.1", 3030)`.
    pub fn new(scheme: &str, host: &str, port: u16) -> Result<Self> {
        Self::parse(&format!("{scheme}://{host}:{port}"))
    }

    /// Parse a full address such as `https://metrics.example.com/ignored`.
    pub fn parse(address: &str) -> Result<Self> {
        let base = Url::parse(address)
            .map_err(|e| ClientError::InvalidAddress(format!("{address}: {e}")))?;
        if base.cannot_be_a_base() || base.host().is_none() {
            return Err(ClientError::InvalidAddress(format!(
                "{address}: address has no host"
            )));
        }
        Ok(Self { base })
    }

    /// Absolute URL for `path` on this target. A leading `/` is optional.
    pub fn resolve(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        url.set_path(path.trim_start_matches('/'));
        url.set_query(None);
        url.set_fragment(None);
        url
    }

    pub fn as_url(&self) -> &Url {
        &self.base
    }
}

impl Default for Target {
    fn default() -> Self {
        Self {
            base: Url::parse(DEFAULT_ADDRESS).expect("DEFAULT_ADDRESS is a valid URL"),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_target_is_local_service() {
        let url = Target::default().resolve("metrics/v1/");
        assert_eq!(url.as_str(), "http://127.0.0.1:3030/metrics/v1/");
    }

    #[test]
    fn structured_target_matches_parsed_target() {
        let built = Target::new("http", "127.0.0.1", 3030).unwrap();
        assert_eq!(built, Target::default());
    }

    #[test]
    fn resolve_discards_base_path_query_and_fragment() {
        let target = Target::parse("https://metrics.example.com:8443/old/path?x=1#frag").unwrap();
        let url = target.resolve("metrics/v2/abc");
        assert_eq!(url.as_str(), "https://metrics.example.com:8443/metrics/v2/abc");
    }

    #[test]
    fn resolve_keeps_authority_for_every_path() {
        let target = Target::parse("http://10.0.0.5:9000/base/").unwrap();
        for path in ["metrics/v1/", "metrics/v1/admin", "metrics/v1/admin/xyz", "/metrics/v1/abc"] {
            let url = target.resolve(path);
            assert_eq!(url.host_str(), Some("10.0.0.5"));
            assert_eq!(url.port(), Some(9000));
            assert_eq!(url.path(), format!("/{}", path.trim_start_matches('/')));
        }
    }

    #[test]
    fn resolve_does_not_mutate_the_base() {
        let target = Target::parse("http://localhost:3030/keep").unwrap();
        let _ = target.resolve("metrics/v1/a");
        let _ = target.resolve("metrics/v1/b");
        assert_eq!(target.as_url().path(), "/keep");
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = Target::parse("not a url").unwrap_err();
        assert!(matches!(err, ClientError::InvalidAddress(_)));
    }

    #[test]
    fn parse_rejects_addresses_without_host() {
        let err = Target::parse("mailto:ops@example.com").unwrap_err();
        assert!(matches!(err, ClientError::InvalidAddress(_)));
    }
}
