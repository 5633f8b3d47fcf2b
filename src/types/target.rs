//! Scan target parsing and resolution.
//!
//! A target is a single host: an IPv4/IPv6 literal or a hostname that is
//! resolved through DNS exactly once per scan. Subnet expansion is the
//! ping sweep's job, not the scan engine's.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// A scan target that has been resolved to an IP address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanTarget {
    /// The original input (hostname or IP string).
    pub original: String,
    /// The resolved IP address.
    pub ip: IpAddr,
}

impl ScanTarget {
    /// Create a new scan target.
    pub fn new(original: impl Into<String>, ip: IpAddr) -> Self {
        Self {
            original: original.into(),
            ip,
        }
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.original == self.ip.to_string() {
            write!(f, "{}", self.ip)
        } else {
            write!(f, "{} ({})", self.original, self.ip)
        }
    }
}

/// Error type for target parsing and resolution.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TargetError {
    #[error("invalid target format: {0}")]
    InvalidFormat(String),
    #[error("failed to resolve hostname '{0}': {1}")]
    DnsResolutionFailed(String, String),
    #[error("no IP addresses found for hostname '{0}'")]
    NoAddressesFound(String),
}

/// A parsed but not yet resolved target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    /// An IP address literal.
    Ip(IpAddr),
    /// A hostname to be resolved.
    Hostname(String),
}

impl TargetSpec {
    /// Parse a target from a string.
    pub fn parse(s: &str) -> Result<Self, TargetError> {
        let s = s.trim();

        // Try parsing as IP address first
        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(Self::Ip(ip));
        }

        if is_valid_hostname(s) {
            return Ok(Self::Hostname(s.to_string()));
        }

        Err(TargetError::InvalidFormat(s.to_string()))
    }

    /// Resolve this target to an address.
    ///
    /// Hostnames go through DNS; when a name maps to several addresses the
    /// first one wins and the rest are discarded.
    pub async fn resolve(&self) -> Result<ScanTarget, TargetError> {
        match self {
            Self::Ip(ip) => Ok(ScanTarget::new(ip.to_string(), *ip)),

            Self::Hostname(hostname) => {
                let resolver =
                    TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());

                let response = resolver.lookup_ip(hostname.as_str()).await.map_err(|e| {
                    TargetError::DnsResolutionFailed(hostname.clone(), e.to_string())
                })?;

                let ip = response
                    .iter()
                    .next()
                    .ok_or_else(|| TargetError::NoAddressesFound(hostname.clone()))?;

                Ok(ScanTarget::new(hostname.clone(), ip))
            }
        }
    }
}

impl FromStr for TargetSpec {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ip(ip) => write!(f, "{}", ip),
            Self::Hostname(hostname) => write!(f, "{}", hostname),
        }
    }
}

/// Check if a string is syntactically a resolvable hostname.
fn is_valid_hostname(s: &str) -> bool {
    if s.is_empty() || s.len() > 253 {
        return false;
    }

    // Labels are 1-63 characters of alphanumerics and inner hyphens
    s.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_alphanumeric() || c == '-')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ipv4() {
        let spec = TargetSpec::parse("192.168.1.1").unwrap();
        assert!(matches!(spec, TargetSpec::Ip(IpAddr::V4(_))));
    }

    #[test]
    fn test_parse_ipv6() {
        let spec = TargetSpec::parse("::1").unwrap();
        assert!(matches!(spec, TargetSpec::Ip(IpAddr::V6(_))));
    }

    #[test]
    fn test_parse_hostname() {
        let spec = TargetSpec::parse("example.com").unwrap();
        assert!(matches!(spec, TargetSpec::Hostname(_)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(TargetSpec::parse("").is_err());
        assert!(TargetSpec::parse("not a host!!").is_err());
        assert!(TargetSpec::parse("under_score.example").is_err());
    }

    #[test]
    fn test_valid_hostname() {
        assert!(is_valid_hostname("example.com"));
        assert!(is_valid_hostname("sub.example.com"));
        assert!(is_valid_hostname("my-server"));
        assert!(!is_valid_hostname(""));
        assert!(!is_valid_hostname("-invalid.com"));
        assert!(!is_valid_hostname("double..dot"));
    }

    #[tokio::test]
    async fn test_ip_literal_resolves_to_itself() {
        let spec = TargetSpec::parse("127.0.0.1").unwrap();
        let target = spec.resolve().await.unwrap();
        assert_eq!(target.ip, IpAddr::V4(std::net::Ipv4Addr::LOCALHOST));
        assert_eq!(target.original, "127.0.0.1");
    }
}
