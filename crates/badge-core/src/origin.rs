//! # Canonical Issuer Origin
//!
//! [`IssuerOrigin`] is the single source of truth for "this issuer's canonical
//! URL" in a deployment. The issuer profile `id`, the Multikey document
//! `controller`, proof `verificationMethod` values, and token `iss`/`kid`
//! claims are all derived from one value of this type.
//!
//! Two construction paths exist:
//!
//! - [`IssuerOrigin::parse()`] from an explicit base URL (`ISSUER_BASE_URL`).
//!   Preferred in production.
//! - [`IssuerOrigin::from_host()`] from a request `Host` header. The scheme is
//!   chosen by a heuristic: hosts that look local are served over `http`,
//!   everything else over `https`. Deployments behind unusual hostnames
//!   should set an explicit base URL instead.

use url::Url;

use crate::error::ValidationError;

/// Path of the issuer profile endpoint, relative to the origin.
pub const ISSUER_PROFILE_PATH: &str = "/api/badge/issuer";

/// Path of the published key-set document.
pub const JWKS_PATH: &str = "/.well-known/jwks.json";

/// Scheme plus authority of the issuing deployment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IssuerOrigin {
    scheme: &'static str,
    authority: String,
}

impl IssuerOrigin {
    /// Build an origin from a `Host` header value (`host` or `host:port`).
    pub fn from_host(host: &str) -> Result<Self, ValidationError> {
        let authority = host.trim().to_ascii_lowercase();
        if authority.is_empty()
            || authority
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '/' | '@' | '?' | '#' | '\\'))
        {
            return Err(ValidationError::InvalidOrigin(format!(
                "not a usable host: {host:?}"
            )));
        }
        let scheme = if is_local_host(&authority) { "http" } else { "https" };
        let url = Url::parse(&format!("{scheme}://{authority}/"))
            .map_err(|e| ValidationError::InvalidOrigin(format!("{host:?}: {e}")))?;
        let authority = normalized_authority(&url).ok_or_else(|| {
            ValidationError::InvalidOrigin(format!("not a usable host: {host:?}"))
        })?;
        Ok(Self { scheme, authority })
    }

    /// Build an origin from an explicit base URL such as `https://badges.example.dev`.
    ///
    /// The URL must be `http` or `https`, carry a host, and have no path,
    /// query, or fragment.
    pub fn parse(base_url: &str) -> Result<Self, ValidationError> {
        let url = Url::parse(base_url.trim())
            .map_err(|e| ValidationError::InvalidOrigin(format!("{base_url:?}: {e}")))?;
        let scheme = match url.scheme() {
            "http" => "http",
            "https" => "https",
            other => {
                return Err(ValidationError::InvalidOrigin(format!(
                    "unsupported scheme {other:?} in {base_url:?}"
                )))
            }
        };
        let authority = normalized_authority(&url).ok_or_else(|| {
            ValidationError::InvalidOrigin(format!("missing host in {base_url:?}"))
        })?;
        if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
            return Err(ValidationError::InvalidOrigin(format!(
                "base URL must not carry a path, query, or fragment: {base_url:?}"
            )));
        }
        Ok(Self { scheme, authority })
    }

    /// `http` or `https`.
    pub fn scheme(&self) -> &str {
        self.scheme
    }

    /// Host with optional port, lower-cased.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Host without port. Badge records and conferences are keyed by this.
    pub fn domain(&self) -> &str {
        if self.authority.starts_with('[') {
            return match self.authority.find(']') {
                Some(end) => &self.authority[..=end],
                None => &self.authority,
            };
        }
        self.authority
            .rsplit_once(':')
            .map_or(self.authority.as_str(), |(host, _)| host)
    }

    /// `scheme://authority`, no trailing slash.
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.authority)
    }

    /// The issuer profile URL. Also the only valid Multikey controller.
    pub fn issuer_profile_url(&self) -> String {
        format!("{}{ISSUER_PROFILE_PATH}", self.base_url())
    }

    /// URL of the per-key Multikey document for `key_id`.
    pub fn key_url(&self, key_id: &str) -> String {
        format!("{}/keys/{key_id}", self.issuer_profile_url())
    }

    /// URL of the key-set document.
    pub fn jwks_url(&self) -> String {
        format!("{}{JWKS_PATH}", self.base_url())
    }

    /// URL of a stored credential.
    pub fn badge_json_url(&self, badge_id: &impl std::fmt::Display) -> String {
        format!("{}/api/badge/{badge_id}/json", self.base_url())
    }

    /// URL of the verification endpoint for a badge.
    pub fn badge_verify_url(&self, badge_id: &impl std::fmt::Display) -> String {
        format!("{}/api/badge/{badge_id}/verify", self.base_url())
    }

    /// URL of the baked badge image.
    pub fn badge_image_url(&self, badge_id: &impl std::fmt::Display) -> String {
        format!("{}/api/badge/{badge_id}/image", self.base_url())
    }

    /// URL serving the baked badge as an attachment.
    pub fn badge_download_url(&self, badge_id: &impl std::fmt::Display) -> String {
        format!("{}/api/badge/{badge_id}/download", self.base_url())
    }
}

impl std::fmt::Display for IssuerOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority)
    }
}

/// Host plus non-default port, as `url` serializes them.
fn normalized_authority(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// Substring heuristic for development hosts.
fn is_local_host(authority: &str) -> bool {
    authority.contains("localhost")
        || authority.contains("127.0.0.1")
        || authority.starts_with("0.0.0.0")
        || authority.starts_with("[::1]")
        || authority
            .split(':')
            .next()
            .is_some_and(|h| h.ends_with(".local"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_host_uses_https() {
        let origin = IssuerOrigin::from_host("badges.example.dev").unwrap();
        assert_eq!(origin.base_url(), "https://badges.example.dev");
        assert_eq!(
            origin.issuer_profile_url(),
            "https://badges.example.dev/api/badge/issuer"
        );
    }

    #[test]
    fn local_hosts_use_http() {
        for host in ["localhost:3000", "127.0.0.1:8080", "[::1]:8080", "laptop.local"] {
            let origin = IssuerOrigin::from_host(host).unwrap();
            assert_eq!(origin.scheme(), "http", "host {host}");
        }
    }

    #[test]
    fn host_is_lower_cased() {
        let origin = IssuerOrigin::from_host("Badges.Example.DEV").unwrap();
        assert_eq!(origin.authority(), "badges.example.dev");
    }

    #[test]
    fn from_host_rejects_paths_and_empty() {
        assert!(IssuerOrigin::from_host("").is_err());
        assert!(IssuerOrigin::from_host("example.dev/api").is_err());
        assert!(IssuerOrigin::from_host("user@example.dev").is_err());
    }

    #[test]
    fn explicit_base_url_overrides_heuristic() {
        let origin = IssuerOrigin::parse("https://localhost:8443").unwrap();
        assert_eq!(origin.scheme(), "https");
        assert_eq!(origin.authority(), "localhost:8443");
        assert_eq!(origin.domain(), "localhost");
    }

    #[test]
    fn parse_accepts_trailing_slash() {
        let origin = IssuerOrigin::parse("https://example.dev/").unwrap();
        assert_eq!(origin.base_url(), "https://example.dev");
    }

    #[test]
    fn parse_rejects_path_and_scheme() {
        assert!(IssuerOrigin::parse("https://example.dev/api/badge/issuer").is_err());
        assert!(IssuerOrigin::parse("ftp://example.dev").is_err());
        assert!(IssuerOrigin::parse("example.dev").is_err());
        assert!(IssuerOrigin::parse("https://example.dev/?x=1").is_err());
    }

    #[test]
    fn derived_urls_share_one_origin() {
        let origin = IssuerOrigin::from_host("localhost:3000").unwrap();
        let profile = origin.issuer_profile_url();
        assert!(origin.key_url("key-1b2d3c4d").starts_with(&profile));
        assert_eq!(
            origin.key_url("key-1b2d3c4d"),
            "http://localhost:3000/api/badge/issuer/keys/key-1b2d3c4d"
        );
        assert_eq!(origin.jwks_url(), "http://localhost:3000/.well-known/jwks.json");
        assert_eq!(
            origin.badge_json_url(&"abc"),
            "http://localhost:3000/api/badge/abc/json"
        );
    }

    #[test]
    fn default_ports_are_dropped() {
        assert_eq!(IssuerOrigin::from_host("example.dev:443").unwrap().authority(), "example.dev");
        assert_eq!(IssuerOrigin::from_host("localhost:80").unwrap().authority(), "localhost");
        assert_eq!(IssuerOrigin::from_host("example.dev:80").unwrap().authority(), "example.dev:80");
    }

    #[test]
    fn domain_strips_port() {
        assert_eq!(IssuerOrigin::from_host("example.dev:8443").unwrap().domain(), "example.dev");
        assert_eq!(IssuerOrigin::from_host("example.dev").unwrap().domain(), "example.dev");
        assert_eq!(IssuerOrigin::from_host("[::1]:8080").unwrap().domain(), "[::1]");
    }
}
